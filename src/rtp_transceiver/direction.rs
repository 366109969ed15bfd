use std::fmt;

/// The direction of media flow through a transceiver, from the local peer's
/// point of view.
///
/// ## Specifications
///
/// * [W3C](https://w3c.github.io/webrtc-pc/#dom-rtcrtptransceiverdirection)
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RTCRtpTransceiverDirection {
    #[default]
    Unspecified = 0,

    /// Media flows both ways.
    Sendrecv,

    /// Media flows out only.
    Sendonly,

    /// Media flows in only.
    Recvonly,

    /// No media flows.
    Inactive,
}

const DIRECTION_NAMES: &[(RTCRtpTransceiverDirection, &str)] = &[
    (RTCRtpTransceiverDirection::Sendrecv, "sendrecv"),
    (RTCRtpTransceiverDirection::Sendonly, "sendonly"),
    (RTCRtpTransceiverDirection::Recvonly, "recvonly"),
    (RTCRtpTransceiverDirection::Inactive, "inactive"),
];

impl From<&str> for RTCRtpTransceiverDirection {
    fn from(raw: &str) -> Self {
        crate::enum_from_name(DIRECTION_NAMES, raw, RTCRtpTransceiverDirection::Unspecified)
    }
}

impl fmt::Display for RTCRtpTransceiverDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(crate::enum_name(DIRECTION_NAMES, *self))
    }
}

impl RTCRtpTransceiverDirection {
    /// Whether media flows from the local peer to the remote peer.
    pub fn has_send(&self) -> bool {
        matches!(
            self,
            RTCRtpTransceiverDirection::Sendrecv | RTCRtpTransceiverDirection::Sendonly
        )
    }

    /// Whether media flows from the remote peer to the local peer.
    pub fn has_recv(&self) -> bool {
        matches!(
            self,
            RTCRtpTransceiverDirection::Sendrecv | RTCRtpTransceiverDirection::Recvonly
        )
    }
}
