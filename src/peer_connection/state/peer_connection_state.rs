use std::fmt;

/// The aggregate state of the connection's transports.
///
/// ## Specifications
///
/// * [W3C](https://w3c.github.io/webrtc-pc/#dom-rtcpeerconnectionstate)
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RTCPeerConnectionState {
    Unspecified = 0,

    /// No transport has left its initial state.
    #[default]
    New,

    /// Some transport is mid-handshake and none has failed.
    Connecting,

    /// Every transport is usable and at least one is actively connected.
    Connected,

    /// A transport lost connectivity without failing outright.
    Disconnected,

    /// A transport failed for good.
    Failed,

    /// The connection's closed flag is set.
    Closed,
}

const PEER_CONNECTION_STATE_NAMES: &[(RTCPeerConnectionState, &str)] = &[
    (RTCPeerConnectionState::New, "new"),
    (RTCPeerConnectionState::Connecting, "connecting"),
    (RTCPeerConnectionState::Connected, "connected"),
    (RTCPeerConnectionState::Disconnected, "disconnected"),
    (RTCPeerConnectionState::Failed, "failed"),
    (RTCPeerConnectionState::Closed, "closed"),
];

impl From<&str> for RTCPeerConnectionState {
    fn from(raw: &str) -> Self {
        crate::enum_from_name(
            PEER_CONNECTION_STATE_NAMES,
            raw,
            RTCPeerConnectionState::Unspecified,
        )
    }
}

impl fmt::Display for RTCPeerConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(crate::enum_name(PEER_CONNECTION_STATE_NAMES, *self))
    }
}
