//! The Data Channel Establishment Protocol messages used for in-band
//! channel negotiation.
//!
//! See [RFC 8832](https://www.rfc-editor.org/rfc/rfc8832.html).

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Error, Result};

pub(crate) const MESSAGE_TYPE_ACK: u8 = 0x02;
pub(crate) const MESSAGE_TYPE_OPEN: u8 = 0x03;

pub(crate) const CHANNEL_TYPE_RELIABLE: u8 = 0x00;
pub(crate) const CHANNEL_TYPE_RELIABLE_UNORDERED: u8 = 0x80;
pub(crate) const CHANNEL_TYPE_PARTIAL_RELIABLE_REXMIT: u8 = 0x01;
pub(crate) const CHANNEL_TYPE_PARTIAL_RELIABLE_REXMIT_UNORDERED: u8 = 0x81;
pub(crate) const CHANNEL_TYPE_PARTIAL_RELIABLE_TIMED: u8 = 0x02;
pub(crate) const CHANNEL_TYPE_PARTIAL_RELIABLE_TIMED_UNORDERED: u8 = 0x82;

const OPEN_HEADER_LEN: usize = 12;

/// A DATA_CHANNEL_OPEN message (RFC 8832 Section 5.1).
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub(crate) struct DataChannelOpen {
    pub(crate) channel_type: u8,
    pub(crate) priority: u16,
    pub(crate) reliability_parameter: u32,
    pub(crate) label: String,
    pub(crate) protocol: String,
}

impl DataChannelOpen {
    pub(crate) fn marshal(&self) -> Bytes {
        let mut buf =
            BytesMut::with_capacity(OPEN_HEADER_LEN + self.label.len() + self.protocol.len());

        buf.put_u8(MESSAGE_TYPE_OPEN);
        buf.put_u8(self.channel_type);
        buf.put_u16(self.priority);
        buf.put_u32(self.reliability_parameter);
        buf.put_u16(self.label.len() as u16);
        buf.put_u16(self.protocol.len() as u16);
        buf.put_slice(self.label.as_bytes());
        buf.put_slice(self.protocol.as_bytes());

        buf.freeze()
    }

    pub(crate) fn unmarshal<B: Buf>(buf: &mut B) -> Result<Self> {
        if buf.remaining() < OPEN_HEADER_LEN {
            return Err(Error::UnexpectedEndOfBuffer {
                expected: OPEN_HEADER_LEN,
                actual: buf.remaining(),
            });
        }

        let message_type = buf.get_u8();
        if message_type != MESSAGE_TYPE_OPEN {
            return Err(Error::InvalidMessageType(message_type));
        }

        let channel_type = buf.get_u8();
        match channel_type {
            CHANNEL_TYPE_RELIABLE
            | CHANNEL_TYPE_RELIABLE_UNORDERED
            | CHANNEL_TYPE_PARTIAL_RELIABLE_REXMIT
            | CHANNEL_TYPE_PARTIAL_RELIABLE_REXMIT_UNORDERED
            | CHANNEL_TYPE_PARTIAL_RELIABLE_TIMED
            | CHANNEL_TYPE_PARTIAL_RELIABLE_TIMED_UNORDERED => {}
            _ => return Err(Error::InvalidChannelType(channel_type)),
        }

        let priority = buf.get_u16();
        let reliability_parameter = buf.get_u32();
        let label_len = buf.get_u16() as usize;
        let protocol_len = buf.get_u16() as usize;

        if buf.remaining() < label_len + protocol_len {
            return Err(Error::UnexpectedEndOfBuffer {
                expected: label_len + protocol_len,
                actual: buf.remaining(),
            });
        }

        let mut label_bytes = vec![0u8; label_len];
        buf.copy_to_slice(&mut label_bytes);
        let mut protocol_bytes = vec![0u8; protocol_len];
        buf.copy_to_slice(&mut protocol_bytes);

        Ok(DataChannelOpen {
            channel_type,
            priority,
            reliability_parameter,
            label: String::from_utf8_lossy(&label_bytes).into_owned(),
            protocol: String::from_utf8_lossy(&protocol_bytes).into_owned(),
        })
    }
}

/// A DATA_CHANNEL_ACK message (RFC 8832 Section 5.2).
pub(crate) fn marshal_ack() -> Bytes {
    let mut buf = BytesMut::with_capacity(1);
    buf.put_u8(MESSAGE_TYPE_ACK);
    buf.freeze()
}

/// Derives the DCEP channel type byte from the channel's delivery options.
pub(crate) fn channel_type(
    ordered: bool,
    max_packet_life_time: Option<u16>,
    max_retransmits: Option<u16>,
) -> u8 {
    match (ordered, max_packet_life_time, max_retransmits) {
        (true, None, None) => CHANNEL_TYPE_RELIABLE,
        (false, None, None) => CHANNEL_TYPE_RELIABLE_UNORDERED,
        (true, None, Some(_)) => CHANNEL_TYPE_PARTIAL_RELIABLE_REXMIT,
        (false, None, Some(_)) => CHANNEL_TYPE_PARTIAL_RELIABLE_REXMIT_UNORDERED,
        (true, Some(_), _) => CHANNEL_TYPE_PARTIAL_RELIABLE_TIMED,
        (false, Some(_), _) => CHANNEL_TYPE_PARTIAL_RELIABLE_TIMED_UNORDERED,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_data_channel_open_marshal() {
        let open = DataChannelOpen {
            channel_type: CHANNEL_TYPE_RELIABLE,
            priority: 0,
            reliability_parameter: 0,
            label: "chat".to_owned(),
            protocol: "".to_owned(),
        };

        let raw = open.marshal();
        assert_eq!(raw[0], MESSAGE_TYPE_OPEN);
        assert_eq!(raw.len(), OPEN_HEADER_LEN + 4);

        let parsed = DataChannelOpen::unmarshal(&mut raw.clone()).unwrap();
        assert_eq!(parsed, open);
    }

    #[test]
    fn test_data_channel_open_unmarshal_failures() {
        // too short
        let mut short = Bytes::from_static(&[MESSAGE_TYPE_OPEN, 0x00]);
        assert!(matches!(
            DataChannelOpen::unmarshal(&mut short),
            Err(Error::UnexpectedEndOfBuffer { .. })
        ));

        // wrong message type
        let mut ack = BytesMut::zeroed(OPEN_HEADER_LEN);
        ack[0] = MESSAGE_TYPE_ACK;
        assert!(matches!(
            DataChannelOpen::unmarshal(&mut ack.freeze()),
            Err(Error::InvalidMessageType(MESSAGE_TYPE_ACK))
        ));

        // unknown channel type
        let mut unknown = BytesMut::zeroed(OPEN_HEADER_LEN);
        unknown[0] = MESSAGE_TYPE_OPEN;
        unknown[1] = 0x7f;
        assert!(matches!(
            DataChannelOpen::unmarshal(&mut unknown.freeze()),
            Err(Error::InvalidChannelType(0x7f))
        ));
    }

    #[test]
    fn test_channel_type_mapping() {
        let tests = vec![
            (true, None, None, CHANNEL_TYPE_RELIABLE),
            (false, None, None, CHANNEL_TYPE_RELIABLE_UNORDERED),
            (true, None, Some(3), CHANNEL_TYPE_PARTIAL_RELIABLE_REXMIT),
            (
                false,
                None,
                Some(3),
                CHANNEL_TYPE_PARTIAL_RELIABLE_REXMIT_UNORDERED,
            ),
            (true, Some(100), None, CHANNEL_TYPE_PARTIAL_RELIABLE_TIMED),
            (
                false,
                Some(100),
                None,
                CHANNEL_TYPE_PARTIAL_RELIABLE_TIMED_UNORDERED,
            ),
        ];

        for (ordered, lifetime, retransmits, expected) in tests {
            assert_eq!(channel_type(ordered, lifetime, retransmits), expected);
        }
    }
}
