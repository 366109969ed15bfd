use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The URL scheme of an ICE server.
///
/// See [RFC 7064](https://tools.ietf.org/html/rfc7064) and
/// [RFC 7065](https://tools.ietf.org/html/rfc7065).
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RTCIceScheme {
    #[default]
    Unspecified = 0,
    Stun,
    Stuns,
    Turn,
    Turns,
}

const ICE_SCHEME_NAMES: &[(RTCIceScheme, &str)] = &[
    (RTCIceScheme::Stun, "stun"),
    (RTCIceScheme::Stuns, "stuns"),
    (RTCIceScheme::Turn, "turn"),
    (RTCIceScheme::Turns, "turns"),
];

impl From<&str> for RTCIceScheme {
    fn from(raw: &str) -> Self {
        crate::enum_from_name(ICE_SCHEME_NAMES, raw, RTCIceScheme::Unspecified)
    }
}

impl fmt::Display for RTCIceScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(crate::enum_name(ICE_SCHEME_NAMES, *self))
    }
}

impl RTCIceScheme {
    fn default_port(&self) -> u16 {
        match self {
            RTCIceScheme::Stuns | RTCIceScheme::Turns => 5349,
            _ => 3478,
        }
    }

    fn is_turn(&self) -> bool {
        matches!(self, RTCIceScheme::Turn | RTCIceScheme::Turns)
    }
}

/// One parsed ICE server URL, ready to hand to the network manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RTCIceServerUrl {
    pub scheme: RTCIceScheme,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub credential: String,
}

impl fmt::Display for RTCIceServerUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.scheme, self.host, self.port)
    }
}

impl RTCIceServerUrl {
    /// Parses a `scheme:host[:port][?query]` ICE URL. The query, if any, is
    /// stripped: "stun(s):" URLs must not carry one (RFC 7064) but some
    /// providers emit them anyway.
    pub fn parse(raw: &str) -> Result<RTCIceServerUrl> {
        let (scheme_str, rest) = raw.split_once(':').ok_or(Error::ErrSchemeType)?;
        let scheme = RTCIceScheme::from(scheme_str);
        if scheme == RTCIceScheme::Unspecified {
            return Err(Error::ErrSchemeType);
        }

        let rest = match rest.split_once('?') {
            Some((before, _query)) => before,
            None => rest,
        };

        let (host, port) = match rest.rsplit_once(':') {
            Some((host, port_str)) => {
                let port: u16 = port_str.parse().map_err(|_| Error::ErrInvalidPortNumber)?;
                (host, port)
            }
            None => (rest, scheme.default_port()),
        };

        if host.is_empty() {
            return Err(Error::ErrHost);
        }
        url::Host::parse(host).map_err(|_| Error::ErrHost)?;

        Ok(RTCIceServerUrl {
            scheme,
            host: host.to_owned(),
            port,
            username: String::new(),
            credential: String::new(),
        })
    }
}

/// Describes a single STUN or TURN server that can be used by the ICE agent
/// to establish a connection with a peer.
///
/// ## Specifications
///
/// * [W3C](https://w3c.github.io/webrtc-pc/#dom-rtciceserver)
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct RTCIceServer {
    pub urls: Vec<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub credential: String,
}

impl RTCIceServer {
    /// Parses and validates every URL of this server. TURN URLs require
    /// credentials.
    pub(crate) fn urls(&self) -> Result<Vec<RTCIceServerUrl>> {
        let mut urls = Vec::with_capacity(self.urls.len());

        for raw in &self.urls {
            let mut url = RTCIceServerUrl::parse(raw)?;

            if url.scheme.is_turn() {
                if self.username.is_empty() || self.credential.is_empty() {
                    return Err(Error::ErrNoTurnCredentials);
                }
                url.username = self.username.clone();
                url.credential = self.credential.clone();
            }

            urls.push(url);
        }

        Ok(urls)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.urls.is_empty() {
            return Err(Error::ErrHost);
        }
        self.urls().map(|_| ())
    }
}
