use std::fmt::Display;
use std::io::Cursor;

use crate::sdp::description::session::SessionDescription;
use serde::{Deserialize, Serialize};

use super::sdp_type::RTCSdpType;
use crate::error::Result;

/// Used to expose local and remote session descriptions.
///
/// The wire form (`sdp`) and the parsed structural view (`parsed`) are kept
/// consistent: the constructors parse the wire form before the description is
/// handed out, so a description stored as current or pending always carries a
/// valid parse.
///
/// ## Specifications
///
/// * [W3C](https://w3c.github.io/webrtc-pc/#rtcsessiondescription-class)
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct RTCSessionDescription {
    #[serde(rename = "type")]
    pub sdp_type: RTCSdpType,

    pub sdp: String,

    /// This will never be initialized by callers, internal use only.
    #[serde(skip)]
    pub(crate) parsed: Option<SessionDescription>,
}

impl Display for RTCSessionDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "type: {}, sdp:\n{}",
            self.sdp_type,
            self.sdp.replace("\r\n", "\n")
        )
    }
}

impl RTCSessionDescription {
    /// Tags SDP text with the given type, parsing it up front. Descriptions
    /// with unparseable wire forms are never constructed.
    fn from_sdp_string(sdp: String, sdp_type: RTCSdpType) -> Result<RTCSessionDescription> {
        let mut desc = RTCSessionDescription {
            sdp,
            sdp_type,
            parsed: None,
        };
        desc.parsed = Some(desc.unmarshal()?);
        Ok(desc)
    }

    /// Given SDP representing an offer, wrap it in an RTCSessionDescription
    /// that can be given to an RTCPeerConnection.
    pub fn offer(sdp: String) -> Result<RTCSessionDescription> {
        RTCSessionDescription::from_sdp_string(sdp, RTCSdpType::Offer)
    }

    /// Given SDP representing a provisional answer, wrap it in an
    /// RTCSessionDescription that can be given to an RTCPeerConnection.
    pub fn pranswer(sdp: String) -> Result<RTCSessionDescription> {
        RTCSessionDescription::from_sdp_string(sdp, RTCSdpType::Pranswer)
    }

    /// Given SDP representing an answer, wrap it in an RTCSessionDescription
    /// that can be given to an RTCPeerConnection.
    pub fn answer(sdp: String) -> Result<RTCSessionDescription> {
        RTCSessionDescription::from_sdp_string(sdp, RTCSdpType::Answer)
    }

    /// unmarshal is a helper to deserialize the sdp
    pub fn unmarshal(&self) -> Result<SessionDescription> {
        let mut reader = Cursor::new(self.sdp.as_bytes());
        let parsed = SessionDescription::unmarshal(&mut reader)?;
        Ok(parsed)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const MINIMAL_SDP: &str = "v=0\r\no=- 163657 2 IN IP4 0.0.0.0\r\ns=-\r\nt=0 0\r\n";

    #[test]
    fn test_serde_uses_w3c_field_names() {
        let desc = RTCSessionDescription {
            sdp_type: RTCSdpType::Answer,
            sdp: "v=0".to_owned(),
            parsed: None,
        };
        let json = serde_json::to_string(&desc).expect("serialize");
        assert_eq!(json, r#"{"type":"answer","sdp":"v=0"}"#);

        let back: RTCSessionDescription =
            serde_json::from_str(r#"{"type":"offer","sdp":"v=0"}"#).expect("deserialize");
        assert_eq!(back.sdp_type, RTCSdpType::Offer);
        assert_eq!(back.sdp, "v=0");
        // the parsed view is never populated by the signaling channel
        assert!(back.parsed.is_none());
    }

    #[test]
    fn test_constructors_tag_and_parse() {
        let offer = RTCSessionDescription::offer(MINIMAL_SDP.to_owned()).unwrap();
        assert_eq!(offer.sdp_type, RTCSdpType::Offer);
        assert!(offer.parsed.is_some());

        let pranswer = RTCSessionDescription::pranswer(MINIMAL_SDP.to_owned()).unwrap();
        assert_eq!(pranswer.sdp_type, RTCSdpType::Pranswer);

        let answer = RTCSessionDescription::answer(MINIMAL_SDP.to_owned()).unwrap();
        assert_eq!(answer.sdp_type, RTCSdpType::Answer);
    }

    #[test]
    fn test_constructors_reject_malformed_sdp() {
        assert!(RTCSessionDescription::offer("not a session description".to_owned()).is_err());
        assert!(RTCSessionDescription::answer(String::new()).is_err());
    }
}
