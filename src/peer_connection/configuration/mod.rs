//! Validation and mutation rules for the connection's policy record.

pub(crate) mod bundle_policy;
pub(crate) mod ice_server;
pub(crate) mod ice_transport_policy;
pub(crate) mod offer_answer_options;
pub(crate) mod rtcp_mux_policy;

use std::time::SystemTime;

use crate::error::{Error, Result};
use crate::peer_connection::certificate::RTCCertificate;

pub use bundle_policy::RTCBundlePolicy;
pub use ice_server::{RTCIceScheme, RTCIceServer, RTCIceServerUrl};
pub use ice_transport_policy::RTCIceTransportPolicy;
pub use offer_answer_options::{RTCAnswerOptions, RTCOfferOptions};
pub use rtcp_mux_policy::RTCRtcpMuxPolicy;

/// A Configuration defines how peer-to-peer communication via PeerConnection
/// is established or re-established.
///
/// The connection holds an immutable snapshot; set_configuration replaces it
/// atomically, and fields left at their Unspecified/empty defaults are
/// treated as "not supplied".
///
/// ## Specifications
///
/// * [W3C](https://w3c.github.io/webrtc-pc/#rtcconfiguration-dictionary)
#[derive(Default, Debug, Clone)]
pub struct RTCConfiguration {
    /// Servers available to the ICE agent, such as STUN and TURN servers.
    pub ice_servers: Vec<RTCIceServer>,

    /// Which candidates the ICE agent is allowed to use.
    pub ice_transport_policy: RTCIceTransportPolicy,

    /// Which media-bundling policy to use when gathering ICE candidates.
    pub bundle_policy: RTCBundlePolicy,

    /// Which rtcp-mux policy to use when gathering ICE candidates.
    pub rtcp_mux_policy: RTCRtcpMuxPolicy,

    /// The target peer identity. Once set it can never be changed.
    pub peer_identity: String,

    /// Certificates the connection authenticates with. When empty, one
    /// ECDSA P-256 certificate is generated at construction.
    pub certificates: Vec<RTCCertificate>,

    /// The size of the prefetched ICE candidate pool.
    pub ice_candidate_pool_size: u8,
}

impl RTCConfiguration {
    /// get_ice_servers returns a sanitized copy of the server list. RFC 7064
    /// forbids queries on "stun(s):" URLs, but some providers hand them out
    /// anyway; the query is dropped rather than failing validation.
    pub(crate) fn get_ice_servers(&self) -> Vec<RTCIceServer> {
        let mut ice_servers = self.ice_servers.clone();

        for ice_server in &mut ice_servers {
            for raw_url in &mut ice_server.urls {
                if let Some((base, _query)) = raw_url.split_once('?') {
                    if base.starts_with("stun") {
                        *raw_url = base.to_owned();
                    }
                }
            }
        }

        ice_servers
    }

    /// init applies defaults to unspecified policies, validates every ICE
    /// server, checks certificate expiry, and generates a certificate when
    /// none was supplied.
    ///
    /// <https://www.w3.org/TR/webrtc/#constructor> (steps #3 and #5-#6)
    pub(crate) fn init(&mut self) -> Result<()> {
        if self.ice_transport_policy == RTCIceTransportPolicy::Unspecified {
            self.ice_transport_policy = RTCIceTransportPolicy::All;
        }
        if self.bundle_policy == RTCBundlePolicy::Unspecified {
            self.bundle_policy = RTCBundlePolicy::Balanced;
        }
        if self.rtcp_mux_policy == RTCRtcpMuxPolicy::Unspecified {
            self.rtcp_mux_policy = RTCRtcpMuxPolicy::Require;
        }

        for server in self.get_ice_servers() {
            server.validate()?;
        }

        if self.certificates.is_empty() {
            self.certificates = vec![RTCCertificate::generate()?];
        } else {
            let now = SystemTime::now();
            if self.certificates.iter().any(|cert| cert.expires <= now) {
                return Err(Error::ErrCertificateExpired);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_get_ice_servers_strips_stun_queries() {
        let cfg = RTCConfiguration {
            ice_servers: vec![RTCIceServer {
                urls: vec![
                    "stun:stun.example.net:3478".to_owned(),
                    // nonconforming but common in the wild
                    "stun:stun.example.net:3478?transport=udp".to_owned(),
                    "turn:turn.example.net:3478?transport=udp".to_owned(),
                ],
                username: "user".to_owned(),
                credential: "pass".to_owned(),
            }],
            ..Default::default()
        };

        let sanitized = cfg.get_ice_servers();
        assert_eq!(sanitized[0].urls[0], "stun:stun.example.net:3478");
        assert_eq!(sanitized[0].urls[1], "stun:stun.example.net:3478");
        // turn URLs may legitimately carry a transport query
        assert_eq!(
            sanitized[0].urls[2],
            "turn:turn.example.net:3478?transport=udp"
        );
    }

    #[test]
    fn test_init_applies_policy_defaults_and_certificate() {
        let mut cfg = RTCConfiguration::default();
        cfg.init().unwrap();

        assert_eq!(cfg.ice_transport_policy, RTCIceTransportPolicy::All);
        assert_eq!(cfg.bundle_policy, RTCBundlePolicy::Balanced);
        assert_eq!(cfg.rtcp_mux_policy, RTCRtcpMuxPolicy::Require);
        assert_eq!(cfg.certificates.len(), 1);
        assert!(cfg.certificates[0].expires() > SystemTime::now());
    }

    #[test]
    fn test_init_rejects_invalid_ice_server() {
        let mut cfg = RTCConfiguration {
            ice_servers: vec![RTCIceServer {
                urls: vec!["webrtc:rocks".to_owned()],
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(cfg.init().is_err());
    }
}
