use std::fmt;

/// The ICE agent's view of connectivity, as reported inward by the network
/// manager.
///
/// ## Specifications
///
/// * [W3C](https://w3c.github.io/webrtc-pc/#dom-rtciceconnectionstate)
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RTCIceConnectionState {
    Unspecified = 0,

    /// Gathering addresses, or idle waiting for remote candidates.
    #[default]
    New,

    /// Candidate pairs are being probed against each other.
    Checking,

    /// A working pair exists; better pairs may still be found.
    Connected,

    /// Checking finished with a working pair for every component.
    Completed,

    /// Connectivity was lost on this transport.
    Disconnected,

    /// The agent gave up on this transport.
    Failed,

    /// The agent was shut down.
    Closed,
}

const ICE_CONNECTION_STATE_NAMES: &[(RTCIceConnectionState, &str)] = &[
    (RTCIceConnectionState::New, "new"),
    (RTCIceConnectionState::Checking, "checking"),
    (RTCIceConnectionState::Connected, "connected"),
    (RTCIceConnectionState::Completed, "completed"),
    (RTCIceConnectionState::Disconnected, "disconnected"),
    (RTCIceConnectionState::Failed, "failed"),
    (RTCIceConnectionState::Closed, "closed"),
];

impl From<&str> for RTCIceConnectionState {
    fn from(raw: &str) -> Self {
        crate::enum_from_name(
            ICE_CONNECTION_STATE_NAMES,
            raw,
            RTCIceConnectionState::Unspecified,
        )
    }
}

impl fmt::Display for RTCIceConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(crate::enum_name(ICE_CONNECTION_STATE_NAMES, *self))
    }
}
