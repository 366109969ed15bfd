//! Contracts binding the peer connection to its network-manager
//! collaborator.
//!
//! The ICE agent, DTLS handshake, SRTP keying and SCTP association live
//! behind these traits; this crate only drives them. A conforming network
//! manager runs its I/O in its own concurrency context and reports inward
//! through the [`NetworkObserver`] it is handed at construction.

pub(crate) mod ice_candidate;
pub(crate) mod sctp_transport;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::peer_connection::configuration::ice_server::RTCIceServerUrl;
use crate::peer_connection::state::RTCIceConnectionState;
use crate::rtp_transceiver::{PayloadType, SSRC};

pub use ice_candidate::{RTCIceCandidate, RTCIceCandidateType, RTCIceProtocol};
pub use sctp_transport::{RTCSctpTransport, RTCSctpTransportState};

/// Events the network manager reports about SCTP data channels.
#[derive(Debug, Clone)]
pub enum DataChannelEvent {
    /// The remote peer announced a new channel via DCEP.
    Created {
        stream_id: u16,
        label: String,
        protocol: String,
    },
    /// A payload arrived on an open channel.
    Message { stream_id: u16, payload: Bytes },
    /// The SCTP association finished establishing; locally created channels
    /// can announce themselves now.
    TransportOpen,
}

/// The inward callback surface a peer connection wires into its network
/// manager at construction.
pub trait NetworkObserver: Send + Sync {
    /// Called on the first inbound RTP packet of a previously unseen SSRC.
    /// Returns the sender half of a bounded packet buffer the manager feeds
    /// from then on.
    fn create_track_channel(
        &self,
        payload_type: PayloadType,
        ssrc: SSRC,
    ) -> mpsc::Sender<rtp::packet::Packet>;

    /// Called once per DCEP event.
    fn handle_data_channel_event(&self, event: DataChannelEvent);

    /// Called once per ICE connection state change.
    fn handle_ice_state_change(&self, state: RTCIceConnectionState);
}

/// Downward contract of the transport stack.
#[async_trait]
pub trait NetworkManager: Send + Sync {
    /// Registers a validated ICE server URL with the agent.
    fn add_url(&self, url: &RTCIceServerUrl) -> Result<()>;

    /// Colon-separated SHA-256 fingerprint of the DTLS certificate in use.
    fn dtls_fingerprint(&self) -> String;

    /// Starts ICE connectivity checks and the DTLS/SCTP handshakes.
    /// `we_offer` is false exactly when the applied remote description was
    /// an offer. Resolves once the remote credentials have been propagated
    /// to the agent.
    async fn start(&self, we_offer: bool, remote_ufrag: String, remote_pwd: String) -> Result<()>;

    /// Hands one RTP packet to the SRTP path. Packets sent before a peer is
    /// connected are dropped downstream.
    fn send_rtp(&self, packet: rtp::packet::Packet) -> Result<()>;

    /// Hands serialized RTCP to the SRTCP path. Packets sent before a peer
    /// is connected are dropped downstream.
    fn send_rtcp(&self, raw: Bytes) -> Result<()>;

    /// Cancels all ICE/DTLS/SCTP activity.
    async fn close(&self) -> Result<()>;

    fn ice_agent(&self) -> Arc<dyn IceAgent>;

    fn sctp_association(&self) -> Arc<dyn SctpAssociation>;
}

/// The slice of the ICE agent the peer connection consumes.
pub trait IceAgent: Send + Sync {
    fn local_ufrag(&self) -> String;

    fn local_pwd(&self) -> String;

    /// Snapshot of the locally gathered candidates.
    fn local_candidates(&self) -> Vec<RTCIceCandidate>;

    fn add_remote_candidate(&self, candidate: RTCIceCandidate) -> Result<()>;
}

/// The slice of the SCTP association the data-channel registry consumes.
pub trait SctpAssociation: Send + Sync {
    /// Sends one DCEP or application message on a stream.
    fn send(&self, stream_id: u16, payload: Bytes) -> Result<()>;

    /// The stream-identifier limit negotiated for this association.
    fn max_channels(&self) -> u16;
}

/// Builds the network manager for a new peer connection, wiring the three
/// inward callbacks.
pub trait NetworkManagerFactory: Send + Sync {
    fn create(&self, observer: Arc<dyn NetworkObserver>) -> Result<Arc<dyn NetworkManager>>;
}
