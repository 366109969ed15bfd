//! Peer-to-peer Data API.

pub(crate) mod dcep;
pub(crate) mod init;
pub(crate) mod message;
pub(crate) mod state;

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use arc_swap::ArcSwapOption;
use bytes::Bytes;
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::transport::SctpAssociation;

pub use init::{RTCDataChannelInit, RTCPriorityType};
pub use message::RTCDataChannelMessage;
pub use state::RTCDataChannelState;

/// Identifier for a data channel within a particular peer connection: the
/// SCTP stream identifier it maps onto.
pub type RTCDataChannelId = u16;

pub type OnOpenHdlrFn =
    Box<dyn (FnMut() -> Pin<Box<dyn Future<Output = ()> + Send + 'static>>) + Send + Sync>;

pub type OnMessageHdlrFn = Box<
    dyn (FnMut(RTCDataChannelMessage) -> Pin<Box<dyn Future<Output = ()> + Send + 'static>>)
        + Send
        + Sync,
>;

/// A bidirectional data channel riding one SCTP stream of the connection's
/// association.
///
/// The peer connection owns the channel; the channel keeps only a non-owning
/// handle onto the SCTP association it sends through.
///
/// ## Specifications
///
/// * [W3C](https://w3c.github.io/webrtc-pc/#dom-rtcdatachannel)
pub struct RTCDataChannel {
    pub(crate) label: String,
    pub(crate) protocol: String,
    pub(crate) id: RTCDataChannelId,
    pub(crate) ordered: bool,
    pub(crate) max_packet_life_time: Option<u16>,
    pub(crate) max_retransmits: Option<u16>,
    pub(crate) negotiated: bool,
    pub(crate) priority: RTCPriorityType,
    pub(crate) ready_state: AtomicU8,
    pub(crate) buffered_amount: AtomicUsize,
    pub(crate) association: Weak<dyn SctpAssociation>,

    pub(crate) on_open_handler: ArcSwapOption<Mutex<OnOpenHdlrFn>>,
    pub(crate) on_message_handler: ArcSwapOption<Mutex<OnMessageHdlrFn>>,
}

impl std::fmt::Debug for RTCDataChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RTCDataChannel")
            .field("label", &self.label)
            .field("id", &self.id)
            .field("ready_state", &self.ready_state())
            .finish()
    }
}

impl RTCDataChannel {
    /// label represents a label that can be used to distinguish this
    /// DataChannel object from other DataChannel objects.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// protocol represents the name of the sub-protocol used with this
    /// DataChannel.
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// id returns the stream identifier of this DataChannel.
    pub fn id(&self) -> RTCDataChannelId {
        self.id
    }

    /// ordered returns true if the DataChannel guarantees in-order delivery.
    pub fn ordered(&self) -> bool {
        self.ordered
    }

    /// max_packet_life_time represents the length of the time window (msec)
    /// during which transmissions and retransmissions may occur in
    /// unreliable mode.
    pub fn max_packet_life_time(&self) -> Option<u16> {
        self.max_packet_life_time
    }

    /// max_retransmits represents the maximum number of retransmissions that
    /// are attempted in unreliable mode.
    pub fn max_retransmits(&self) -> Option<u16> {
        self.max_retransmits
    }

    /// negotiated represents whether this DataChannel was negotiated by the
    /// application rather than announced in-band.
    pub fn negotiated(&self) -> bool {
        self.negotiated
    }

    pub fn priority(&self) -> RTCPriorityType {
        self.priority
    }

    /// ready_state represents the state of the DataChannel object.
    pub fn ready_state(&self) -> RTCDataChannelState {
        RTCDataChannelState::from(self.ready_state.load(Ordering::SeqCst))
    }

    /// buffered_amount returns the number of bytes of application data that
    /// have been queued on this channel.
    pub fn buffered_amount(&self) -> usize {
        self.buffered_amount.load(Ordering::SeqCst)
    }

    /// on_open sets the handler invoked once the channel transitions to
    /// Open. The handler runs on the connection's background worker.
    pub fn on_open(&self, f: OnOpenHdlrFn) {
        self.on_open_handler.store(Some(Arc::new(Mutex::new(f))));
    }

    /// on_message sets the handler invoked per inbound message. The handler
    /// runs on the connection's background worker.
    pub fn on_message(&self, f: OnMessageHdlrFn) {
        self.on_message_handler
            .store(Some(Arc::new(Mutex::new(f))));
    }

    /// send queues a binary message to the DataChannel peer.
    pub fn send(&self, data: &Bytes) -> Result<usize> {
        self.ensure_open()?;

        let association = self
            .association
            .upgrade()
            .ok_or(Error::ErrConnectionClosed)?;
        association.send(self.id, data.clone())?;
        self.buffered_amount.fetch_add(data.len(), Ordering::SeqCst);

        Ok(data.len())
    }

    /// send_text queues a UTF-8 text message to the DataChannel peer.
    pub fn send_text(&self, s: impl Into<String>) -> Result<usize> {
        self.send(&Bytes::from(s.into()))
    }

    fn ensure_open(&self) -> Result<()> {
        match self.ready_state() {
            RTCDataChannelState::Open => Ok(()),
            RTCDataChannelState::Closing | RTCDataChannelState::Closed => {
                Err(Error::ErrDataChannelClosed)
            }
            _ => Err(Error::ErrDataChannelNotOpen),
        }
    }

    pub(crate) fn set_ready_state(&self, state: RTCDataChannelState) {
        self.ready_state.store(state as u8, Ordering::SeqCst);
    }

    /// The DCEP open-channel message announcing this channel in-band.
    pub(crate) fn open_channel_message(&self) -> dcep::DataChannelOpen {
        dcep::DataChannelOpen {
            channel_type: dcep::channel_type(
                self.ordered,
                self.max_packet_life_time,
                self.max_retransmits,
            ),
            priority: self.priority as u16,
            reliability_parameter: self
                .max_packet_life_time
                .or(self.max_retransmits)
                .unwrap_or(0) as u32,
            label: self.label.clone(),
            protocol: self.protocol.clone(),
        }
    }
}
