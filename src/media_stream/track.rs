use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::media_stream::{Sample, TRACK_CHANNEL_CAPACITY};
use crate::rtp_transceiver::rtp_codec::{RTCRtpCodec, RtpCodecKind};
use crate::rtp_transceiver::{PayloadType, SSRC};

/// One end-to-end media stream: either packets the application supplies
/// ready-made (raw RTP mode), or samples the connection packetizes on its
/// way out (sample mode).
///
/// Exactly one of the two channels exists per track; the mode is fixed at
/// construction.
#[derive(Clone)]
pub(crate) enum TrackStream {
    RawRtp(PacketChannel<rtp::packet::Packet>),
    Sample(PacketChannel<Sample>),
}

/// Both halves of a bounded track channel. Writers clone the sender; the
/// single consumer (application for inbound tracks, the send pump for local
/// tracks) drains the shared receiver.
pub(crate) struct PacketChannel<T> {
    pub(crate) tx: mpsc::Sender<T>,
    pub(crate) rx: Arc<Mutex<mpsc::Receiver<T>>>,
}

impl<T> Clone for PacketChannel<T> {
    fn clone(&self) -> Self {
        PacketChannel {
            tx: self.tx.clone(),
            rx: Arc::clone(&self.rx),
        }
    }
}

impl<T> PacketChannel<T> {
    fn new() -> Self {
        let (tx, rx) = mpsc::channel(TRACK_CHANNEL_CAPACITY);
        PacketChannel {
            tx,
            rx: Arc::new(Mutex::new(rx)),
        }
    }
}

/// A single audio or video stream bound (or bindable) to a transceiver slot.
#[derive(Clone)]
pub struct MediaStreamTrack {
    pub(crate) id: String,
    pub(crate) label: String,
    pub(crate) kind: RtpCodecKind,
    pub(crate) payload_type: PayloadType,
    pub(crate) ssrc: SSRC,
    pub(crate) codec: RTCRtpCodec,
    pub(crate) stream: TrackStream,
}

impl fmt::Debug for MediaStreamTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaStreamTrack")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("kind", &self.kind)
            .field("payload_type", &self.payload_type)
            .field("ssrc", &self.ssrc)
            .finish()
    }
}

impl MediaStreamTrack {
    /// Creates a raw RTP track. The application supplies complete RTP
    /// packets; the ssrc must be non-zero and is written through unchanged.
    pub(crate) fn new_raw_rtp(
        payload_type: PayloadType,
        ssrc: SSRC,
        id: String,
        label: String,
        codec: RTCRtpCodec,
    ) -> Result<Self> {
        if ssrc == 0 {
            return Err(Error::ErrSSRCRequired);
        }

        Ok(MediaStreamTrack {
            id,
            label,
            kind: codec.kind,
            payload_type,
            ssrc,
            codec,
            stream: TrackStream::RawRtp(PacketChannel::new()),
        })
    }

    /// Creates a sample track with a cryptographically random ssrc. Samples
    /// are packetized before transmission.
    pub(crate) fn new_sample(
        payload_type: PayloadType,
        id: String,
        label: String,
        codec: RTCRtpCodec,
    ) -> Self {
        let mut ssrc: SSRC = rand::random();
        while ssrc == 0 {
            ssrc = rand::random();
        }

        MediaStreamTrack {
            id,
            label,
            kind: codec.kind,
            payload_type,
            ssrc,
            codec,
            stream: TrackStream::Sample(PacketChannel::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> RtpCodecKind {
        self.kind
    }

    pub fn payload_type(&self) -> PayloadType {
        self.payload_type
    }

    pub fn ssrc(&self) -> SSRC {
        self.ssrc
    }

    pub fn codec(&self) -> &RTCRtpCodec {
        &self.codec
    }

    /// Queues one RTP packet for transmission. Only valid on raw RTP tracks.
    pub async fn write_rtp(&self, packet: rtp::packet::Packet) -> Result<()> {
        match &self.stream {
            TrackStream::RawRtp(channel) => channel
                .tx
                .send(packet)
                .await
                .map_err(|_| Error::ErrConnectionClosed),
            TrackStream::Sample(_) => Err(Error::ErrIncorrectTrackMode),
        }
    }

    /// Queues one media sample for packetization and transmission. Only
    /// valid on sample tracks.
    pub async fn write_sample(&self, sample: Sample) -> Result<()> {
        match &self.stream {
            TrackStream::Sample(channel) => channel
                .tx
                .send(sample)
                .await
                .map_err(|_| Error::ErrConnectionClosed),
            TrackStream::RawRtp(_) => Err(Error::ErrIncorrectTrackMode),
        }
    }

    /// Reads the next inbound RTP packet. Returns `None` once the feeding
    /// side has gone away. Only valid on raw RTP tracks.
    pub async fn read_rtp(&self) -> Result<Option<rtp::packet::Packet>> {
        match &self.stream {
            TrackStream::RawRtp(channel) => {
                let mut rx = channel.rx.lock().await;
                Ok(rx.recv().await)
            }
            TrackStream::Sample(_) => Err(Error::ErrIncorrectTrackMode),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::api::media_engine::MediaEngine;

    fn opus_codec() -> RTCRtpCodec {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs().unwrap();
        media_engine
            .codec_by_payload_type(111)
            .expect("opus registered by default")
            .codec
            .clone()
    }

    #[test]
    fn test_new_raw_rtp_track_requires_ssrc() {
        let result = MediaStreamTrack::new_raw_rtp(
            111,
            0,
            "a".to_owned(),
            "audio".to_owned(),
            opus_codec(),
        );
        assert!(matches!(result, Err(Error::ErrSSRCRequired)));
    }

    #[test]
    fn test_new_sample_track_generates_nonzero_ssrc() {
        let track =
            MediaStreamTrack::new_sample(111, "a".to_owned(), "audio".to_owned(), opus_codec());
        assert_ne!(track.ssrc(), 0);
        assert_eq!(track.kind(), RtpCodecKind::Audio);
    }

    #[tokio::test]
    async fn test_track_mode_is_exclusive() {
        let sample_track =
            MediaStreamTrack::new_sample(111, "a".to_owned(), "audio".to_owned(), opus_codec());
        let result = sample_track.write_rtp(rtp::packet::Packet::default()).await;
        assert!(matches!(result, Err(Error::ErrIncorrectTrackMode)));

        let raw_track = MediaStreamTrack::new_raw_rtp(
            111,
            42,
            "b".to_owned(),
            "audio".to_owned(),
            opus_codec(),
        )
        .unwrap();
        let result = raw_track.write_sample(Sample::default()).await;
        assert!(matches!(result, Err(Error::ErrIncorrectTrackMode)));
    }
}
