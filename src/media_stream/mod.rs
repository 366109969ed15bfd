//! RTP Media API: tracks and the samples they carry.

pub(crate) mod track;

use bytes::Bytes;

pub use track::MediaStreamTrack;

/// Capacity of every track packet/sample channel. Inbound track channels are
/// created with this bound before the first packet of a new SSRC is
/// delivered.
pub(crate) const TRACK_CHANNEL_CAPACITY: usize = 15;

/// An encoded media frame plus the number of RTP clock units it covers.
#[derive(Default, Debug, Clone)]
pub struct Sample {
    pub data: Bytes,
    pub samples: u32,
}
