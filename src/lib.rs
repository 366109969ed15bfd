#![warn(rust_2018_idioms)]
#![allow(dead_code)]

//! A WebRTC peer-connection endpoint: the session orchestration layer that
//! drives establishment between two peers, negotiates media and data-channel
//! capabilities via the offer/answer exchange, and routes the resulting
//! streams.
//!
//! The ICE agent, DTLS handshake, SRTP keying and SCTP association are
//! external collaborators reached through the contracts in [`transport`].

pub mod api;
pub mod data_channel;
pub mod error;
pub mod media_stream;
pub mod peer_connection;
pub mod rtp_transceiver;
pub mod transport;

pub use rtcp;
pub use rtp;
pub use sdp;

pub(crate) const UNSPECIFIED_STR: &str = "Unspecified";

/// Looks up the wire name of an enum value in its two-way name table.
/// Values missing from the table render as [`UNSPECIFIED_STR`].
pub(crate) fn enum_name<T: Copy + PartialEq>(
    table: &[(T, &'static str)],
    value: T,
) -> &'static str {
    table
        .iter()
        .find(|(candidate, _)| *candidate == value)
        .map(|(_, name)| *name)
        .unwrap_or(UNSPECIFIED_STR)
}

/// Looks up an enum value by its wire name, falling back for unknown input.
pub(crate) fn enum_from_name<T: Copy>(table: &[(T, &'static str)], raw: &str, fallback: T) -> T {
    table
        .iter()
        .find(|(_, name)| *name == raw)
        .map(|(value, _)| *value)
        .unwrap_or(fallback)
}
