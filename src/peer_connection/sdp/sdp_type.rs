use std::fmt;

use serde::{Deserialize, Serialize};

/// Describes the role of a session description in the offer/answer
/// exchange.
///
/// ## Specifications
///
/// * [W3C](https://w3c.github.io/webrtc-pc/#dom-rtcsdptype)
#[derive(Default, Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub enum RTCSdpType {
    #[default]
    Unspecified = 0,

    /// The initial proposal of an exchange.
    #[serde(rename = "offer")]
    Offer,

    /// A provisional answer; it may still be replaced before the exchange
    /// settles.
    #[serde(rename = "pranswer")]
    Pranswer,

    /// The definitive response closing the exchange.
    #[serde(rename = "answer")]
    Answer,

    /// Abandons the in-progress exchange and returns to the last stable
    /// state.
    #[serde(rename = "rollback")]
    Rollback,
}

const SDP_TYPE_NAMES: &[(RTCSdpType, &str)] = &[
    (RTCSdpType::Offer, "offer"),
    (RTCSdpType::Pranswer, "pranswer"),
    (RTCSdpType::Answer, "answer"),
    (RTCSdpType::Rollback, "rollback"),
];

impl From<&str> for RTCSdpType {
    fn from(raw: &str) -> Self {
        crate::enum_from_name(SDP_TYPE_NAMES, raw, RTCSdpType::Unspecified)
    }
}

impl fmt::Display for RTCSdpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(crate::enum_name(SDP_TYPE_NAMES, *self))
    }
}
