use std::fmt;

use serde::{Deserialize, Serialize};

/// Defines the ICE candidate policy surfaced to the ICE agent.
///
/// ## Specifications
///
/// * [W3C](https://w3c.github.io/webrtc-pc/#dom-rtcicetransportpolicy)
#[derive(Default, Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub enum RTCIceTransportPolicy {
    #[default]
    Unspecified = 0,

    /// Any type of candidate is used.
    #[serde(rename = "all")]
    All,

    /// Only TURN relay candidates are used, keeping local addresses
    /// private.
    #[serde(rename = "relay")]
    Relay,
}

const ICE_TRANSPORT_POLICY_NAMES: &[(RTCIceTransportPolicy, &str)] = &[
    (RTCIceTransportPolicy::All, "all"),
    (RTCIceTransportPolicy::Relay, "relay"),
];

impl From<&str> for RTCIceTransportPolicy {
    fn from(raw: &str) -> Self {
        crate::enum_from_name(
            ICE_TRANSPORT_POLICY_NAMES,
            raw,
            RTCIceTransportPolicy::Unspecified,
        )
    }
}

impl fmt::Display for RTCIceTransportPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(crate::enum_name(ICE_TRANSPORT_POLICY_NAMES, *self))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_ice_transport_policy_names_round_trip() {
        for (policy, name) in ICE_TRANSPORT_POLICY_NAMES {
            assert_eq!(policy.to_string(), *name);
            assert_eq!(RTCIceTransportPolicy::from(*name), *policy);
        }
        assert_eq!(
            RTCIceTransportPolicy::from("host-only"),
            RTCIceTransportPolicy::Unspecified
        );
    }
}
