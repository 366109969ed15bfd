use std::fmt;

use serde::{Deserialize, Serialize};

/// Affects which media tracks are negotiated if the remote endpoint is not
/// bundle-aware, and what ICE candidates are gathered.
///
/// ## Specifications
///
/// * [W3C](https://w3c.github.io/webrtc-pc/#rtcbundlepolicy-enum)
#[derive(Default, Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub enum RTCBundlePolicy {
    #[default]
    Unspecified = 0,

    /// One candidate set per media type in use; against a non-bundle-aware
    /// peer, one audio and one video track are negotiated on separate
    /// transports.
    #[serde(rename = "balanced")]
    Balanced,

    /// One candidate set per track; against a non-bundle-aware peer, every
    /// track gets its own transport.
    #[serde(rename = "max-compat")]
    MaxCompat,

    /// A single candidate set; against a non-bundle-aware peer, only one
    /// track is negotiated.
    #[serde(rename = "max-bundle")]
    MaxBundle,
}

const BUNDLE_POLICY_NAMES: &[(RTCBundlePolicy, &str)] = &[
    (RTCBundlePolicy::Balanced, "balanced"),
    (RTCBundlePolicy::MaxCompat, "max-compat"),
    (RTCBundlePolicy::MaxBundle, "max-bundle"),
];

impl From<&str> for RTCBundlePolicy {
    fn from(raw: &str) -> Self {
        crate::enum_from_name(BUNDLE_POLICY_NAMES, raw, RTCBundlePolicy::Unspecified)
    }
}

impl fmt::Display for RTCBundlePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(crate::enum_name(BUNDLE_POLICY_NAMES, *self))
    }
}
