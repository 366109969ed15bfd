use std::fmt;

use rtp::packetizer::Payloader;

/// The kind of media a codec or track carries.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RtpCodecKind {
    #[default]
    Unspecified = 0,
    Audio,
    Video,
}

const CODEC_KIND_NAMES: &[(RtpCodecKind, &str)] = &[
    (RtpCodecKind::Audio, "audio"),
    (RtpCodecKind::Video, "video"),
];

impl From<&str> for RtpCodecKind {
    fn from(raw: &str) -> Self {
        crate::enum_from_name(CODEC_KIND_NAMES, raw, RtpCodecKind::Unspecified)
    }
}

impl fmt::Display for RtpCodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(crate::enum_name(CODEC_KIND_NAMES, *self))
    }
}

/// A codec as registered with the media engine: the rtpmap/fmtp facts written
/// into generated descriptions, plus a payloader constructor for sample-mode
/// tracks.
#[derive(Clone)]
pub struct RTCRtpCodec {
    /// The codec name as it appears in an a=rtpmap line, e.g. "opus".
    pub name: String,
    pub clock_rate: u32,
    /// Audio channel count; 0 when the codec does not carry one.
    pub channels: u16,
    pub sdp_fmtp_line: String,
    pub kind: RtpCodecKind,
    /// Constructor for the payloader used when samples are packetized into
    /// RTP on this codec.
    pub new_payloader: fn() -> Box<dyn Payloader + Send + Sync>,
}

impl fmt::Debug for RTCRtpCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RTCRtpCodec")
            .field("name", &self.name)
            .field("clock_rate", &self.clock_rate)
            .field("channels", &self.channels)
            .field("sdp_fmtp_line", &self.sdp_fmtp_line)
            .field("kind", &self.kind)
            .finish()
    }
}

/// A codec bound to a payload type within a session.
#[derive(Debug, Clone)]
pub struct RTCRtpCodecParameters {
    pub payload_type: crate::rtp_transceiver::PayloadType,
    pub codec: RTCRtpCodec,
}
