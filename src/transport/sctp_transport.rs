use std::fmt;
use std::sync::Arc;

use crate::transport::SctpAssociation;

pub(crate) const SCTP_MAX_CHANNELS: u16 = u16::MAX;

/// Indicates the state of the SCTP transport.
///
/// ## Specifications
///
/// * [W3C](https://w3c.github.io/webrtc-pc/#dom-rtcsctptransportstate)
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RTCSctpTransportState {
    Unspecified = 0,

    /// The SCTP transport is in the process of negotiating an association.
    #[default]
    Connecting,

    /// The negotiation of an association is completed.
    Connected,

    /// The SCTP association has been closed intentionally or by an error.
    Closed,
}

const SCTP_TRANSPORT_STATE_NAMES: &[(RTCSctpTransportState, &str)] = &[
    (RTCSctpTransportState::Connecting, "connecting"),
    (RTCSctpTransportState::Connected, "connected"),
    (RTCSctpTransportState::Closed, "closed"),
];

impl From<&str> for RTCSctpTransportState {
    fn from(raw: &str) -> Self {
        crate::enum_from_name(
            SCTP_TRANSPORT_STATE_NAMES,
            raw,
            RTCSctpTransportState::Unspecified,
        )
    }
}

impl fmt::Display for RTCSctpTransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(crate::enum_name(SCTP_TRANSPORT_STATE_NAMES, *self))
    }
}

/// The peer connection's handle onto its SCTP association.
///
/// The association itself is owned by the network manager; this handle
/// tracks the transport state, the mid of the application media section and
/// the stream-identifier ceiling used during data-channel ID allocation.
pub struct RTCSctpTransport {
    pub(crate) state: RTCSctpTransportState,
    pub(crate) association: Option<Arc<dyn SctpAssociation>>,
    pub(crate) mid: Option<String>,
}

impl Default for RTCSctpTransport {
    fn default() -> Self {
        RTCSctpTransport {
            state: RTCSctpTransportState::Connecting,
            association: None,
            mid: None,
        }
    }
}

impl fmt::Debug for RTCSctpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RTCSctpTransport")
            .field("state", &self.state)
            .field("mid", &self.mid)
            .finish()
    }
}

impl RTCSctpTransport {
    pub fn state(&self) -> RTCSctpTransportState {
        self.state
    }

    /// max_channels is the maximum number of data channels that can be open
    /// simultaneously.
    pub fn max_channels(&self) -> u16 {
        match &self.association {
            Some(association) => {
                let max = association.max_channels();
                if max == 0 {
                    SCTP_MAX_CHANNELS
                } else {
                    max
                }
            }
            None => SCTP_MAX_CHANNELS,
        }
    }

    pub(crate) fn association(&self) -> Option<Arc<dyn SctpAssociation>> {
        self.association.clone()
    }
}
