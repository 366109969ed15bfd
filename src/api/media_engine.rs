use rtp::codecs::g7xx::G7xxPayloader;
use rtp::codecs::h264::H264Payloader;
use rtp::codecs::opus::OpusPayloader;
use rtp::codecs::vp8::Vp8Payloader;
use rtp::codecs::vp9::Vp9Payloader;
use rtp::packetizer::Payloader;

use crate::error::{Error, Result};
use crate::rtp_transceiver::rtp_codec::{RTCRtpCodec, RTCRtpCodecParameters, RtpCodecKind};
use crate::rtp_transceiver::PayloadType;

pub const DEFAULT_PAYLOAD_TYPE_PCMU: PayloadType = 0;
pub const DEFAULT_PAYLOAD_TYPE_PCMA: PayloadType = 8;
pub const DEFAULT_PAYLOAD_TYPE_G722: PayloadType = 9;
pub const DEFAULT_PAYLOAD_TYPE_OPUS: PayloadType = 111;
pub const DEFAULT_PAYLOAD_TYPE_VP8: PayloadType = 96;
pub const DEFAULT_PAYLOAD_TYPE_VP9: PayloadType = 98;
pub const DEFAULT_PAYLOAD_TYPE_H264: PayloadType = 102;

fn g7xx_payloader() -> Box<dyn Payloader + Send + Sync> {
    Box::<G7xxPayloader>::default()
}

fn opus_payloader() -> Box<dyn Payloader + Send + Sync> {
    Box::<OpusPayloader>::default()
}

fn vp8_payloader() -> Box<dyn Payloader + Send + Sync> {
    Box::<Vp8Payloader>::default()
}

fn vp9_payloader() -> Box<dyn Payloader + Send + Sync> {
    Box::<Vp9Payloader>::default()
}

fn h264_payloader() -> Box<dyn Payloader + Send + Sync> {
    Box::<H264Payloader>::default()
}

/// The codec registry consulted when generating descriptions and when
/// packetizing sample tracks.
///
/// A MediaEngine is attached to an [`API`] at build time and is immutable
/// afterwards; register codecs before building.
///
/// [`API`]: crate::api::API
#[derive(Default)]
pub struct MediaEngine {
    audio_codecs: Vec<RTCRtpCodecParameters>,
    video_codecs: Vec<RTCRtpCodecParameters>,
}

impl MediaEngine {
    /// register_default_codecs registers the conventional set of supported
    /// codecs. Use register_codec instead to customize the set.
    pub fn register_default_codecs(&mut self) -> Result<()> {
        for codec in [
            RTCRtpCodecParameters {
                payload_type: DEFAULT_PAYLOAD_TYPE_PCMU,
                codec: RTCRtpCodec {
                    name: "PCMU".to_owned(),
                    clock_rate: 8000,
                    channels: 0,
                    sdp_fmtp_line: "".to_owned(),
                    kind: RtpCodecKind::Audio,
                    new_payloader: g7xx_payloader,
                },
            },
            RTCRtpCodecParameters {
                payload_type: DEFAULT_PAYLOAD_TYPE_PCMA,
                codec: RTCRtpCodec {
                    name: "PCMA".to_owned(),
                    clock_rate: 8000,
                    channels: 0,
                    sdp_fmtp_line: "".to_owned(),
                    kind: RtpCodecKind::Audio,
                    new_payloader: g7xx_payloader,
                },
            },
            RTCRtpCodecParameters {
                payload_type: DEFAULT_PAYLOAD_TYPE_G722,
                codec: RTCRtpCodec {
                    name: "G722".to_owned(),
                    clock_rate: 8000,
                    channels: 0,
                    sdp_fmtp_line: "".to_owned(),
                    kind: RtpCodecKind::Audio,
                    new_payloader: g7xx_payloader,
                },
            },
            RTCRtpCodecParameters {
                payload_type: DEFAULT_PAYLOAD_TYPE_OPUS,
                codec: RTCRtpCodec {
                    name: "opus".to_owned(),
                    clock_rate: 48000,
                    channels: 2,
                    sdp_fmtp_line: "minptime=10;useinbandfec=1".to_owned(),
                    kind: RtpCodecKind::Audio,
                    new_payloader: opus_payloader,
                },
            },
        ] {
            self.register_codec(codec, RtpCodecKind::Audio)?;
        }

        for codec in [
            RTCRtpCodecParameters {
                payload_type: DEFAULT_PAYLOAD_TYPE_VP8,
                codec: RTCRtpCodec {
                    name: "VP8".to_owned(),
                    clock_rate: 90000,
                    channels: 0,
                    sdp_fmtp_line: "".to_owned(),
                    kind: RtpCodecKind::Video,
                    new_payloader: vp8_payloader,
                },
            },
            RTCRtpCodecParameters {
                payload_type: DEFAULT_PAYLOAD_TYPE_VP9,
                codec: RTCRtpCodec {
                    name: "VP9".to_owned(),
                    clock_rate: 90000,
                    channels: 0,
                    sdp_fmtp_line: "profile-id=0".to_owned(),
                    kind: RtpCodecKind::Video,
                    new_payloader: vp9_payloader,
                },
            },
            RTCRtpCodecParameters {
                payload_type: DEFAULT_PAYLOAD_TYPE_H264,
                codec: RTCRtpCodec {
                    name: "H264".to_owned(),
                    clock_rate: 90000,
                    channels: 0,
                    sdp_fmtp_line:
                        "level-asymmetry-allowed=1;packetization-mode=1;profile-level-id=42001f"
                            .to_owned(),
                    kind: RtpCodecKind::Video,
                    new_payloader: h264_payloader,
                },
            },
        ] {
            self.register_codec(codec, RtpCodecKind::Video)?;
        }

        Ok(())
    }

    /// register_codec adds a codec to the engine under the given kind.
    pub fn register_codec(
        &mut self,
        codec: RTCRtpCodecParameters,
        kind: RtpCodecKind,
    ) -> Result<()> {
        match kind {
            RtpCodecKind::Audio => self.audio_codecs.push(codec),
            RtpCodecKind::Video => self.video_codecs.push(codec),
            RtpCodecKind::Unspecified => return Err(Error::ErrCodecNotFound),
        }
        Ok(())
    }

    pub(crate) fn codecs_by_kind(&self, kind: RtpCodecKind) -> &[RTCRtpCodecParameters] {
        match kind {
            RtpCodecKind::Audio => &self.audio_codecs,
            RtpCodecKind::Video => &self.video_codecs,
            RtpCodecKind::Unspecified => &[],
        }
    }

    pub(crate) fn codec_by_payload_type(
        &self,
        payload_type: PayloadType,
    ) -> Option<&RTCRtpCodecParameters> {
        self.audio_codecs
            .iter()
            .chain(self.video_codecs.iter())
            .find(|c| c.payload_type == payload_type)
    }
}
