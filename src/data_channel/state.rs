use std::fmt;

/// The state of a data channel.
///
/// ## Specifications
///
/// * [W3C](https://w3c.github.io/webrtc-pc/#dom-rtcdatachannelstate)
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RTCDataChannelState {
    Unspecified = 0,

    /// The underlying transport is still being established. Channels start
    /// here.
    #[default]
    Connecting,

    /// The transport is up and the channel carries data.
    Open,

    /// Teardown of the underlying transport has begun.
    Closing,

    /// The transport is gone or was never established.
    Closed,
}

/// Indexed by the discriminant; backs the atomic ready-state storage.
const DATA_CHANNEL_STATES: [RTCDataChannelState; 5] = [
    RTCDataChannelState::Unspecified,
    RTCDataChannelState::Connecting,
    RTCDataChannelState::Open,
    RTCDataChannelState::Closing,
    RTCDataChannelState::Closed,
];

const DATA_CHANNEL_STATE_NAMES: &[(RTCDataChannelState, &str)] = &[
    (RTCDataChannelState::Connecting, "connecting"),
    (RTCDataChannelState::Open, "open"),
    (RTCDataChannelState::Closing, "closing"),
    (RTCDataChannelState::Closed, "closed"),
];

impl From<&str> for RTCDataChannelState {
    fn from(raw: &str) -> Self {
        crate::enum_from_name(
            DATA_CHANNEL_STATE_NAMES,
            raw,
            RTCDataChannelState::Unspecified,
        )
    }
}

impl From<u8> for RTCDataChannelState {
    fn from(v: u8) -> Self {
        DATA_CHANNEL_STATES
            .get(v as usize)
            .copied()
            .unwrap_or(RTCDataChannelState::Unspecified)
    }
}

impl fmt::Display for RTCDataChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(crate::enum_name(DATA_CHANNEL_STATE_NAMES, *self))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_data_channel_state_names_round_trip() {
        for (state, name) in DATA_CHANNEL_STATE_NAMES {
            assert_eq!(state.to_string(), *name);
            assert_eq!(RTCDataChannelState::from(*name), *state);
        }
        assert_eq!(
            RTCDataChannelState::from("half-open"),
            RTCDataChannelState::Unspecified
        );
    }

    #[test]
    fn test_data_channel_state_survives_atomic_storage() {
        for state in DATA_CHANNEL_STATES {
            assert_eq!(RTCDataChannelState::from(state as u8), state);
        }
        assert_eq!(
            RTCDataChannelState::from(200u8),
            RTCDataChannelState::Unspecified
        );
    }
}
