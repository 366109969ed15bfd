//! RTP Media API: the pairing of send and receive slots for a media line.

pub(crate) mod direction;
pub(crate) mod rtp_codec;

use crate::media_stream::MediaStreamTrack;

pub use direction::RTCRtpTransceiverDirection;
pub use rtp_codec::{RTCRtpCodec, RTCRtpCodecParameters, RtpCodecKind};

/// SSRC represents a synchronization source: a 32-bit RTP stream identifier.
///
/// See [RFC 3550 Section 3](https://tools.ietf.org/html/rfc3550#section-3).
#[allow(clippy::upper_case_acronyms)]
pub type SSRC = u32;

/// PayloadType identifies the format of the RTP payload.
///
/// See [RFC 3550 Section 3](https://tools.ietf.org/html/rfc3550#section-3).
pub type PayloadType = u8;

/// The sending half of a transceiver.
#[derive(Debug, Clone)]
pub struct RTCRtpSender {
    pub(crate) track: Option<MediaStreamTrack>,
}

impl RTCRtpSender {
    pub fn track(&self) -> Option<&MediaStreamTrack> {
        self.track.as_ref()
    }
}

/// The receiving half of a transceiver.
#[derive(Debug, Clone)]
pub struct RTCRtpReceiver {
    pub(crate) track: Option<MediaStreamTrack>,
}

impl RTCRtpReceiver {
    pub fn track(&self) -> Option<&MediaStreamTrack> {
        self.track.as_ref()
    }
}

/// A permanent pairing of an [`RTCRtpSender`] and an [`RTCRtpReceiver`]
/// sharing a media line.
///
/// Transceivers are only ever appended to a connection's inventory; a
/// stopped transceiver keeps its slot and is marked by the `stopped` flag.
///
/// ## Specifications
///
/// * [W3C](https://www.w3.org/TR/webrtc/#dom-rtcrtptransceiver)
#[derive(Debug, Clone)]
pub struct RTCRtpTransceiver {
    pub(crate) mid: Option<String>,
    pub(crate) kind: RtpCodecKind,
    pub(crate) sender: Option<RTCRtpSender>,
    pub(crate) receiver: Option<RTCRtpReceiver>,
    pub(crate) direction: RTCRtpTransceiverDirection,
    pub(crate) stopped: bool,
}

impl RTCRtpTransceiver {
    pub(crate) fn new(
        kind: RtpCodecKind,
        sender: Option<RTCRtpSender>,
        receiver: Option<RTCRtpReceiver>,
        direction: RTCRtpTransceiverDirection,
    ) -> Self {
        RTCRtpTransceiver {
            mid: None,
            kind,
            sender,
            receiver,
            direction,
            stopped: false,
        }
    }

    pub fn mid(&self) -> Option<&str> {
        self.mid.as_deref()
    }

    pub fn kind(&self) -> RtpCodecKind {
        self.kind
    }

    pub fn direction(&self) -> RTCRtpTransceiverDirection {
        self.direction
    }

    pub fn sender(&self) -> Option<&RTCRtpSender> {
        self.sender.as_ref()
    }

    pub fn receiver(&self) -> Option<&RTCRtpReceiver> {
        self.receiver.as_ref()
    }

    pub fn stopped(&self) -> bool {
        self.stopped
    }

    pub(crate) fn sending_track(&self) -> Option<&MediaStreamTrack> {
        self.sender.as_ref().and_then(|s| s.track.as_ref())
    }
}

/// Looks for a sender already bound to a track with this identifier.
pub(crate) fn find_sender_track_by_id<'a>(
    transceivers: &'a [RTCRtpTransceiver],
    id: &str,
) -> Option<&'a MediaStreamTrack> {
    transceivers
        .iter()
        .filter_map(|t| t.sending_track())
        .find(|track| track.id() == id)
}

/// Finds the first transceiver a new sending track can reuse: not stopped,
/// send slot empty, and currently receiving a track of the same kind.
pub(crate) fn satisfy_send_slot(
    transceivers: &mut [RTCRtpTransceiver],
    kind: RtpCodecKind,
) -> Option<&mut RTCRtpTransceiver> {
    transceivers.iter_mut().find(|t| {
        !t.stopped
            && t.sending_track().is_none()
            && t.receiver
                .as_ref()
                .and_then(|r| r.track.as_ref())
                .map(|track| track.kind() == kind)
                .unwrap_or(false)
    })
}

/// Finds the first non-stopped transceiver of a kind that has no mid yet.
pub(crate) fn find_unassigned_by_kind(
    transceivers: &mut [RTCRtpTransceiver],
    kind: RtpCodecKind,
) -> Option<&mut RTCRtpTransceiver> {
    transceivers
        .iter_mut()
        .find(|t| !t.stopped && t.mid.is_none() && t.kind == kind)
}
