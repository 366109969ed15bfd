use std::fmt;

use serde::{Deserialize, Serialize};

/// The RTCP multiplexing policy. Only "require" is supported: RTP and RTCP
/// always share a transport (RFC 5761), so no RTCP-specific candidates are
/// gathered.
///
/// ## Specifications
///
/// * [W3C](https://w3c.github.io/webrtc-pc/#rtcrtcpmuxpolicy-enum)
#[derive(Default, Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub enum RTCRtcpMuxPolicy {
    #[default]
    Unspecified = 0,

    #[serde(rename = "require")]
    Require,
}

const RTCP_MUX_POLICY_NAMES: &[(RTCRtcpMuxPolicy, &str)] =
    &[(RTCRtcpMuxPolicy::Require, "require")];

impl From<&str> for RTCRtcpMuxPolicy {
    fn from(raw: &str) -> Self {
        crate::enum_from_name(RTCP_MUX_POLICY_NAMES, raw, RTCRtcpMuxPolicy::Unspecified)
    }
}

impl fmt::Display for RTCRtcpMuxPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(crate::enum_name(RTCP_MUX_POLICY_NAMES, *self))
    }
}
