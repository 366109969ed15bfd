use bytes::Bytes;

/// A message received from the data channel. `is_string` is set when the
/// incoming message is of the string type; otherwise the message is binary.
#[derive(Default, Debug, Clone)]
pub struct RTCDataChannelMessage {
    pub is_string: bool,
    pub data: Bytes,
}
