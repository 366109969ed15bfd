use std::fmt;

use serde::{Deserialize, Serialize};

/// The priority of a data channel's traffic relative to other channels.
///
/// ## Specifications
///
/// * [W3C](https://w3c.github.io/webrtc-pc/#dom-rtcprioritytype)
#[derive(Default, Debug, PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Serialize, Deserialize)]
pub enum RTCPriorityType {
    #[default]
    Unspecified = 0,

    #[serde(rename = "very-low")]
    VeryLow,

    #[serde(rename = "low")]
    Low,

    #[serde(rename = "medium")]
    Medium,

    #[serde(rename = "high")]
    High,
}

const PRIORITY_TYPE_NAMES: &[(RTCPriorityType, &str)] = &[
    (RTCPriorityType::VeryLow, "very-low"),
    (RTCPriorityType::Low, "low"),
    (RTCPriorityType::Medium, "medium"),
    (RTCPriorityType::High, "high"),
];

impl From<&str> for RTCPriorityType {
    fn from(raw: &str) -> Self {
        crate::enum_from_name(PRIORITY_TYPE_NAMES, raw, RTCPriorityType::Unspecified)
    }
}

impl fmt::Display for RTCPriorityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(crate::enum_name(PRIORITY_TYPE_NAMES, *self))
    }
}

/// Configuration for a data channel created with create_data_channel.
///
/// Every field left unset takes its W3C default during option
/// normalization: ordered delivery, empty protocol, not negotiated, low
/// priority.
///
/// ## Specifications
///
/// * [W3C](https://www.w3.org/TR/webrtc/#dom-rtcdatachannelinit)
#[derive(Default, Debug, Clone)]
pub struct RTCDataChannelInit {
    /// When false, data is allowed to be delivered out of order.
    pub ordered: Option<bool>,

    /// Limits the time (in milliseconds) during which the channel will
    /// transmit or retransmit data if not acknowledged. Mutually exclusive
    /// with max_retransmits.
    pub max_packet_life_time: Option<u16>,

    /// Limits the number of times the channel will retransmit data if not
    /// successfully delivered. Mutually exclusive with max_packet_life_time.
    pub max_retransmits: Option<u16>,

    /// The name of the sub-protocol used with this channel.
    pub protocol: Option<String>,

    /// Whether this channel is negotiated out-of-band by the application.
    /// When true, the application must also supply `id`.
    pub negotiated: Option<bool>,

    /// The stream identifier of an out-of-band negotiated channel.
    pub id: Option<u16>,

    pub priority: Option<RTCPriorityType>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_priority_type_names_round_trip() {
        for (priority, name) in PRIORITY_TYPE_NAMES {
            assert_eq!(priority.to_string(), *name);
            assert_eq!(RTCPriorityType::from(*name), *priority);
        }
        assert_eq!(
            RTCPriorityType::from("urgent"),
            RTCPriorityType::Unspecified
        );
    }

    #[test]
    fn test_priority_ordering() {
        assert!(RTCPriorityType::VeryLow < RTCPriorityType::Low);
        assert!(RTCPriorityType::Medium < RTCPriorityType::High);
    }
}
