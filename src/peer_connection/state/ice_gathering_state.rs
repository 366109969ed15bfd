use std::fmt;

/// Progress of local candidate gathering.
///
/// ## Specifications
///
/// * [W3C](https://w3c.github.io/webrtc-pc/#dom-rtcicegatheringstate)
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RTCIceGatheringState {
    Unspecified = 0,

    /// No transport has started gathering yet.
    #[default]
    New,

    /// At least one transport is collecting candidates.
    Gathering,

    /// Every transport finished gathering.
    Complete,
}

const ICE_GATHERING_STATE_NAMES: &[(RTCIceGatheringState, &str)] = &[
    (RTCIceGatheringState::New, "new"),
    (RTCIceGatheringState::Gathering, "gathering"),
    (RTCIceGatheringState::Complete, "complete"),
];

impl From<&str> for RTCIceGatheringState {
    fn from(raw: &str) -> Self {
        crate::enum_from_name(
            ICE_GATHERING_STATE_NAMES,
            raw,
            RTCIceGatheringState::Unspecified,
        )
    }
}

impl fmt::Display for RTCIceGatheringState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(crate::enum_name(ICE_GATHERING_STATE_NAMES, *self))
    }
}
