//! The peer connection: session orchestration over an external transport
//! stack.

pub mod certificate;
pub mod configuration;
pub(crate) mod operation;
pub mod sdp;
pub(crate) mod signaling_state;
pub mod state;

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use arc_swap::ArcSwapOption;
use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::thread_rng;
use rtp::packetizer::Packetizer;
use crate::sdp::description::session::Origin;
use crate::sdp::util::ConnectionRole;
use tokio::sync::mpsc;
use tokio::sync::{Mutex, RwLock};

use crate::api::media_engine::MediaEngine;
use crate::api::API;
use crate::data_channel::{
    RTCDataChannel, RTCDataChannelInit, RTCDataChannelState, RTCPriorityType,
};
use crate::error::{Error, Result};
use crate::media_stream::track::{PacketChannel, TrackStream};
use crate::media_stream::{MediaStreamTrack, Sample, TRACK_CHANNEL_CAPACITY};
use crate::peer_connection::configuration::{
    RTCAnswerOptions, RTCBundlePolicy, RTCConfiguration, RTCOfferOptions, RTCRtcpMuxPolicy,
};
use crate::peer_connection::operation::{Operation, Operations};
use crate::peer_connection::sdp::{
    extract_ice_details, get_mid_value, get_peer_direction, populate_sdp, resolve_direction,
    update_sdp_origin, MediaSection, PopulateSdpParams, RTCSdpType, RTCSessionDescription,
    MEDIA_SECTION_APPLICATION,
};
use crate::peer_connection::signaling_state::{check_next_signaling_state, StateChangeOp};
use crate::peer_connection::state::{
    RTCIceConnectionState, RTCIceGatheringState, RTCPeerConnectionState,
};
use crate::rtp_transceiver::{
    find_sender_track_by_id, find_unassigned_by_kind, satisfy_send_slot, PayloadType,
    RTCRtpReceiver, RTCRtpSender, RTCRtpTransceiver, RTCRtpTransceiverDirection, RtpCodecKind,
    SSRC,
};
use crate::transport::{
    DataChannelEvent, NetworkManager, NetworkObserver, RTCIceCandidate, RTCSctpTransport,
    RTCSctpTransportState,
};

pub use signaling_state::RTCSignalingState;

/// MTU used when packetizing samples into outbound RTP.
const RTP_OUTBOUND_MTU: usize = 1200;

/// The highest stream identifier DCEP permits.
const MAX_DATA_CHANNEL_ID: u32 = 65534;

const RUNES_ALPHA: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// math_rand_alpha generates a mathematical random alphabet sequence of the
/// requested length.
pub(crate) fn math_rand_alpha(n: usize) -> String {
    let mut rng = thread_rng();

    (0..n)
        .map(|_| *RUNES_ALPHA.choose(&mut rng).unwrap_or(&b'a') as char)
        .collect()
}

pub type OnIceConnectionStateChangeHdlrFn = Box<
    dyn (FnMut(RTCIceConnectionState) -> Pin<Box<dyn Future<Output = ()> + Send + 'static>>)
        + Send
        + Sync,
>;

pub type OnTrackHdlrFn = Box<
    dyn (FnMut(MediaStreamTrack) -> Pin<Box<dyn Future<Output = ()> + Send + 'static>>)
        + Send
        + Sync,
>;

pub type OnDataChannelHdlrFn = Box<
    dyn (FnMut(Arc<RTCDataChannel>) -> Pin<Box<dyn Future<Output = ()> + Send + 'static>>)
        + Send
        + Sync,
>;

/// Mutable connection state, guarded by the connection's single
/// reader-writer lock.
struct PeerConnectionInner {
    configuration: RTCConfiguration,

    signaling_state: RTCSignalingState,
    ice_gathering_state: RTCIceGatheringState,
    ice_connection_state: RTCIceConnectionState,
    peer_connection_state: RTCPeerConnectionState,

    current_local_description: Option<RTCSessionDescription>,
    pending_local_description: Option<RTCSessionDescription>,
    current_remote_description: Option<RTCSessionDescription>,
    pending_remote_description: Option<RTCSessionDescription>,

    sdp_origin: Origin,
    last_offer: String,
    last_answer: String,

    /// The last known greater mid value. Mids are generated as numbers so
    /// that reused and fresh media sections stay unique (JSEP 3.4.1).
    greater_mid: isize,

    rtp_transceivers: Vec<RTCRtpTransceiver>,
    sctp_transport: RTCSctpTransport,
    data_channels: HashMap<u16, Arc<RTCDataChannel>>,

    network_started: bool,
}

impl PeerConnectionInner {
    fn remote_description(&self) -> Option<&RTCSessionDescription> {
        self.pending_remote_description
            .as_ref()
            .or(self.current_remote_description.as_ref())
    }

    fn local_description(&self) -> Option<&RTCSessionDescription> {
        self.pending_local_description
            .as_ref()
            .or(self.current_local_description.as_ref())
    }

    /// Whether this side is answering: true once the applied remote
    /// description is an offer.
    fn is_answerer(&self) -> bool {
        self.remote_description()
            .map(|d| d.sdp_type == RTCSdpType::Offer)
            .unwrap_or(false)
    }
}

pub(crate) struct PeerConnectionInternal {
    stats_id: String,
    is_closed: AtomicBool,
    ops: Operations,
    media_engine: Arc<MediaEngine>,
    network: OnceLock<Arc<dyn NetworkManager>>,
    inner: RwLock<PeerConnectionInner>,

    on_ice_connection_state_change_handler:
        ArcSwapOption<Mutex<OnIceConnectionStateChangeHdlrFn>>,
    on_track_handler: ArcSwapOption<Mutex<OnTrackHdlrFn>>,
    on_data_channel_handler: ArcSwapOption<Mutex<OnDataChannelHdlrFn>>,
}

impl PeerConnectionInternal {
    fn network(&self) -> Result<Arc<dyn NetworkManager>> {
        self.network
            .get()
            .cloned()
            .ok_or(Error::ErrNetworkManagerGone)
    }

    async fn dispatch_ice_connection_state_change(&self, state: RTCIceConnectionState) {
        if let Some(handler) = self.on_ice_connection_state_change_handler.load_full() {
            let mut f = handler.lock().await;
            f(state).await;
        }
    }

    async fn dispatch_on_track(&self, track: MediaStreamTrack) {
        if let Some(handler) = self.on_track_handler.load_full() {
            let mut f = handler.lock().await;
            f(track).await;
        }
    }

    async fn dispatch_on_data_channel(&self, channel: Arc<RTCDataChannel>) {
        if let Some(handler) = self.on_data_channel_handler.load_full() {
            let mut f = handler.lock().await;
            f(channel).await;
        }
    }

    async fn dispatch_channel_open(channel: Arc<RTCDataChannel>) {
        if let Some(handler) = channel.on_open_handler.load_full() {
            let mut f = handler.lock().await;
            f().await;
        }
    }

    /// Registry handling for one inbound data-channel event. Runs on the
    /// background worker.
    async fn handle_data_channel_event_op(self: Arc<Self>, event: DataChannelEvent) {
        match event {
            DataChannelEvent::Created {
                stream_id,
                label,
                protocol,
            } => {
                let channel = {
                    let mut inner = self.inner.write().await;
                    let association = match inner.sctp_transport.association() {
                        Some(a) => a,
                        None => return,
                    };

                    let channel = Arc::new(RTCDataChannel {
                        label,
                        protocol,
                        id: stream_id,
                        ordered: true,
                        max_packet_life_time: None,
                        max_retransmits: None,
                        negotiated: false,
                        priority: RTCPriorityType::Low,
                        ready_state: AtomicU8::new(RTCDataChannelState::Open as u8),
                        buffered_amount: AtomicUsize::new(0),
                        association: Arc::downgrade(&association),
                        on_open_handler: ArcSwapOption::empty(),
                        on_message_handler: ArcSwapOption::empty(),
                    });
                    inner.data_channels.insert(stream_id, Arc::clone(&channel));

                    // acknowledge the in-band open (RFC 8832 section 5.2)
                    if let Err(err) =
                        association.send(stream_id, crate::data_channel::dcep::marshal_ack())
                    {
                        warn!("{}: failed to ack channel {stream_id}: {err}", self.stats_id);
                    }

                    channel
                };

                self.dispatch_on_data_channel(channel).await;
            }
            DataChannelEvent::Message { stream_id, payload } => {
                let channel = {
                    let inner = self.inner.read().await;
                    inner.data_channels.get(&stream_id).cloned()
                };

                let Some(channel) = channel else {
                    debug!(
                        "{}: dropping message for unknown channel {stream_id}",
                        self.stats_id
                    );
                    return;
                };

                match channel.on_message_handler.load_full() {
                    Some(handler) => {
                        let mut f = handler.lock().await;
                        f(crate::data_channel::RTCDataChannelMessage {
                            is_string: false,
                            data: payload,
                        })
                        .await;
                    }
                    None => {
                        debug!(
                            "{}: no on_message handler for channel {stream_id}, dropping",
                            self.stats_id
                        );
                    }
                }
            }
            DataChannelEvent::TransportOpen => {
                let opened = {
                    let mut inner = self.inner.write().await;
                    inner.sctp_transport.state = RTCSctpTransportState::Connected;

                    let association = match inner.sctp_transport.association() {
                        Some(a) => a,
                        None => return,
                    };

                    let mut channels: Vec<Arc<RTCDataChannel>> =
                        inner.data_channels.values().cloned().collect();
                    channels.sort_by_key(|c| c.id());

                    let mut opened = Vec::with_capacity(channels.len());
                    for channel in channels {
                        if channel.ready_state() == RTCDataChannelState::Open {
                            continue;
                        }
                        if !channel.negotiated() {
                            let message = channel.open_channel_message().marshal();
                            if let Err(err) = association.send(channel.id(), message) {
                                warn!(
                                    "{}: failed to announce channel {}: {err}",
                                    self.stats_id,
                                    channel.id()
                                );
                                continue;
                            }
                        }
                        channel.set_ready_state(RTCDataChannelState::Open);
                        opened.push(channel);
                    }
                    opened
                };

                for channel in opened {
                    Self::dispatch_channel_open(channel).await;
                }
            }
        }
    }

    /// Binds an inbound track into the inventory and fires on_track. Runs on
    /// the background worker.
    async fn handle_inbound_track_op(self: Arc<Self>, track: MediaStreamTrack) {
        {
            let mut inner = self.inner.write().await;
            let slot = inner.rtp_transceivers.iter_mut().find(|t| {
                !t.stopped
                    && t.kind == track.kind()
                    && t.receiver
                        .as_ref()
                        .map(|r| r.track.is_none())
                        .unwrap_or(true)
            });
            match slot {
                Some(transceiver) => {
                    transceiver.receiver = Some(RTCRtpReceiver {
                        track: Some(track.clone()),
                    });
                }
                None => {
                    let mut transceiver = RTCRtpTransceiver::new(
                        track.kind(),
                        None,
                        Some(RTCRtpReceiver {
                            track: Some(track.clone()),
                        }),
                        RTCRtpTransceiverDirection::Recvonly,
                    );
                    transceiver.mid = None;
                    inner.rtp_transceivers.push(transceiver);
                }
            }
        }

        self.dispatch_on_track(track).await;
    }

    /// Drains a local track's channel into the network manager.
    fn start_send_pump(&self, track: &MediaStreamTrack) {
        let network = match self.network() {
            Ok(network) => network,
            Err(_) => return,
        };
        let stats_id = self.stats_id.clone();

        match &track.stream {
            TrackStream::RawRtp(channel) => {
                let rx = Arc::clone(&channel.rx);
                tokio::spawn(async move {
                    let mut rx = rx.lock().await;
                    while let Some(packet) = rx.recv().await {
                        if let Err(err) = network.send_rtp(packet) {
                            debug!("{stats_id}: raw RTP pump stopped: {err}");
                            break;
                        }
                    }
                });
            }
            TrackStream::Sample(channel) => {
                let rx = Arc::clone(&channel.rx);
                let payloader = (track.codec.new_payloader)();
                let sequencer: Box<dyn rtp::sequence::Sequencer + Send + Sync> =
                    Box::new(rtp::sequence::new_random_sequencer());
                let mut packetizer = rtp::packetizer::new_packetizer(
                    RTP_OUTBOUND_MTU,
                    track.payload_type,
                    track.ssrc,
                    payloader,
                    sequencer,
                    track.codec.clock_rate,
                );

                tokio::spawn(async move {
                    let mut rx = rx.lock().await;
                    while let Some(sample) = rx.recv().await {
                        let Sample { data, samples } = sample;
                        let packets = match packetizer.packetize(&data, samples) {
                            Ok(packets) => packets,
                            Err(err) => {
                                warn!("{stats_id}: packetizing sample failed: {err}");
                                continue;
                            }
                        };
                        let mut failed = false;
                        for packet in packets {
                            if let Err(err) = network.send_rtp(packet) {
                                debug!("{stats_id}: sample pump stopped: {err}");
                                failed = true;
                                break;
                            }
                        }
                        if failed {
                            break;
                        }
                    }
                });
            }
        }
    }
}

/// Callback proxy handed to the network manager. Every inbound event is
/// enqueued onto the connection's serial worker, preserving arrival order.
pub(crate) struct PeerConnectionObserver(Arc<PeerConnectionInternal>);

impl NetworkObserver for PeerConnectionObserver {
    fn create_track_channel(
        &self,
        payload_type: PayloadType,
        ssrc: SSRC,
    ) -> mpsc::Sender<rtp::packet::Packet> {
        let (tx, rx) = mpsc::channel(TRACK_CHANNEL_CAPACITY);

        let codec = match self.0.media_engine.codec_by_payload_type(payload_type) {
            Some(parameters) => parameters.codec.clone(),
            None => {
                // nothing sensible to surface; the buffer drains nowhere
                warn!(
                    "{}: inbound ssrc {ssrc} uses unknown payload type {payload_type}",
                    self.0.stats_id
                );
                return tx;
            }
        };

        let track = MediaStreamTrack {
            id: math_rand_alpha(16),
            label: format!("remote-{ssrc}"),
            kind: codec.kind,
            payload_type,
            ssrc,
            codec,
            stream: TrackStream::RawRtp(PacketChannel {
                tx: tx.clone(),
                rx: Arc::new(Mutex::new(rx)),
            }),
        };

        let internal = Arc::clone(&self.0);
        let enqueued = self.0.ops.enqueue(Operation::new(
            move || Box::pin(internal.handle_inbound_track_op(track)),
            "on_track",
        ));
        if enqueued.is_err() {
            debug!("{}: dropping inbound track {ssrc}: closed", self.0.stats_id);
        }

        tx
    }

    fn handle_data_channel_event(&self, event: DataChannelEvent) {
        let internal = Arc::clone(&self.0);
        let enqueued = self.0.ops.enqueue(Operation::new(
            move || Box::pin(internal.handle_data_channel_event_op(event)),
            "data_channel_event",
        ));
        if enqueued.is_err() {
            debug!("{}: dropping data channel event: closed", self.0.stats_id);
        }
    }

    fn handle_ice_state_change(&self, state: RTCIceConnectionState) {
        let internal = Arc::clone(&self.0);
        let enqueued = self.0.ops.enqueue(Operation::new(
            move || {
                Box::pin(async move {
                    {
                        let mut inner = internal.inner.write().await;
                        inner.ice_connection_state = state;
                        inner.peer_connection_state = match state {
                            RTCIceConnectionState::Checking => RTCPeerConnectionState::Connecting,
                            RTCIceConnectionState::Connected
                            | RTCIceConnectionState::Completed => {
                                RTCPeerConnectionState::Connected
                            }
                            RTCIceConnectionState::Disconnected => {
                                RTCPeerConnectionState::Disconnected
                            }
                            RTCIceConnectionState::Failed => RTCPeerConnectionState::Failed,
                            RTCIceConnectionState::Closed => RTCPeerConnectionState::Closed,
                            _ => inner.peer_connection_state,
                        };
                    }
                    internal.dispatch_ice_connection_state_change(state).await;
                })
            },
            "ice_connection_state_change",
        ));
        if enqueued.is_err() {
            debug!("{}: dropping ICE state change: closed", self.0.stats_id);
        }
    }
}

/// A WebRTC session endpoint: negotiates media and data-channel capability
/// with a remote peer via the offer/answer exchange and routes the resulting
/// streams.
///
/// ## Specifications
///
/// * [W3C](https://w3c.github.io/webrtc-pc/#rtcpeerconnection-interface)
pub struct RTCPeerConnection {
    internal: Arc<PeerConnectionInternal>,
}

impl std::fmt::Debug for RTCPeerConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RTCPeerConnection")
            .field("stats_id", &self.internal.stats_id)
            .finish()
    }
}

impl RTCPeerConnection {
    /// Builds a connection from a validated configuration, allocating the
    /// network manager with its three inward callbacks and starting the
    /// serial background worker.
    pub(crate) fn new(api: &API, mut configuration: RTCConfiguration) -> Result<Self> {
        configuration.init()?;

        let factory = api
            .network_manager_factory
            .clone()
            .ok_or(Error::ErrNoNetworkManagerFactory)?;

        let ice_servers = configuration.get_ice_servers();

        let internal = Arc::new(PeerConnectionInternal {
            stats_id: format!(
                "PeerConnection-{}",
                SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_nanos())
                    .unwrap_or_default()
            ),
            is_closed: AtomicBool::new(false),
            ops: Operations::new(),
            media_engine: Arc::clone(&api.media_engine),
            network: OnceLock::new(),
            inner: RwLock::new(PeerConnectionInner {
                configuration,
                signaling_state: RTCSignalingState::Stable,
                ice_gathering_state: RTCIceGatheringState::New,
                ice_connection_state: RTCIceConnectionState::New,
                peer_connection_state: RTCPeerConnectionState::New,
                current_local_description: None,
                pending_local_description: None,
                current_remote_description: None,
                pending_remote_description: None,
                sdp_origin: Origin::default(),
                last_offer: String::new(),
                last_answer: String::new(),
                greater_mid: -1,
                rtp_transceivers: Vec::new(),
                sctp_transport: RTCSctpTransport::default(),
                data_channels: HashMap::new(),
                network_started: false,
            }),
            on_ice_connection_state_change_handler: ArcSwapOption::empty(),
            on_track_handler: ArcSwapOption::empty(),
            on_data_channel_handler: ArcSwapOption::empty(),
        });

        let observer = Arc::new(PeerConnectionObserver(Arc::clone(&internal)));
        let network = factory.create(observer)?;

        for server in &ice_servers {
            for url in server.urls()? {
                network.add_url(&url)?;
            }
        }

        {
            let mut inner = internal.inner.try_write().map_err(|_| {
                Error::Other("peer connection lock held during construction".to_owned())
            })?;
            inner.sctp_transport.association = Some(network.sctp_association());
        }

        internal
            .network
            .set(network)
            .map_err(|_| Error::Other("network manager attached twice".to_owned()))?;

        Ok(RTCPeerConnection { internal })
    }

    fn ensure_not_closed(&self) -> Result<()> {
        if self.internal.is_closed.load(Ordering::SeqCst) {
            Err(Error::ErrConnectionClosed)
        } else {
            Ok(())
        }
    }

    /// on_ice_connection_state_change sets the handler called when the ICE
    /// connection state changes. The handler runs on the background worker;
    /// it must not call close synchronously.
    pub fn on_ice_connection_state_change(&self, f: OnIceConnectionStateChangeHdlrFn) {
        self.internal
            .on_ice_connection_state_change_handler
            .store(Some(Arc::new(Mutex::new(f))));
    }

    /// on_track sets the handler called on the first packet of a new inbound
    /// stream.
    pub fn on_track(&self, f: OnTrackHdlrFn) {
        self.internal
            .on_track_handler
            .store(Some(Arc::new(Mutex::new(f))));
    }

    /// on_data_channel sets the handler called when the remote peer opens a
    /// data channel.
    pub fn on_data_channel(&self, f: OnDataChannelHdlrFn) {
        self.internal
            .on_data_channel_handler
            .store(Some(Arc::new(Mutex::new(f))));
    }

    /// get_configuration returns a snapshot of the current configuration.
    /// <https://www.w3.org/TR/webrtc/#dom-rtcpeerconnection-getconfiguration>
    pub async fn get_configuration(&self) -> RTCConfiguration {
        let inner = self.internal.inner.read().await;
        inner.configuration.clone()
    }

    /// set_configuration replaces the configuration, enforcing the W3C
    /// modification rules. Nothing is mutated when any rule fails.
    /// <https://www.w3.org/TR/webrtc/#dom-rtcpeerconnection-setconfiguration>
    pub async fn set_configuration(&self, configuration: RTCConfiguration) -> Result<()> {
        self.ensure_not_closed()?;

        let mut inner = self.internal.inner.write().await;
        let mut new_configuration = inner.configuration.clone();

        // https://www.w3.org/TR/webrtc/#set-the-configuration (step #3)
        if !configuration.peer_identity.is_empty() {
            if configuration.peer_identity != inner.configuration.peer_identity {
                return Err(Error::ErrModifyingPeerIdentity);
            }
            new_configuration.peer_identity = configuration.peer_identity;
        }

        // https://www.w3.org/TR/webrtc/#set-the-configuration (step #4)
        if !configuration.certificates.is_empty() {
            if configuration.certificates.len() != inner.configuration.certificates.len() {
                return Err(Error::ErrModifyingCertificates);
            }
            for (supplied, existing) in configuration
                .certificates
                .iter()
                .zip(inner.configuration.certificates.iter())
            {
                if supplied != existing {
                    return Err(Error::ErrModifyingCertificates);
                }
            }
            new_configuration.certificates = configuration.certificates;
        }

        // https://www.w3.org/TR/webrtc/#set-the-configuration (step #5)
        if configuration.bundle_policy != RTCBundlePolicy::Unspecified {
            if configuration.bundle_policy != inner.configuration.bundle_policy {
                return Err(Error::ErrModifyingBundlePolicy);
            }
        }

        // https://www.w3.org/TR/webrtc/#set-the-configuration (step #6)
        if configuration.rtcp_mux_policy != RTCRtcpMuxPolicy::Unspecified {
            if configuration.rtcp_mux_policy != inner.configuration.rtcp_mux_policy {
                return Err(Error::ErrModifyingRTCPMuxPolicy);
            }
        }

        // https://www.w3.org/TR/webrtc/#set-the-configuration (step #7)
        if configuration.ice_candidate_pool_size != inner.configuration.ice_candidate_pool_size {
            if inner.local_description().is_some() {
                return Err(Error::ErrModifyingICECandidatePoolSize);
            }
            new_configuration.ice_candidate_pool_size = configuration.ice_candidate_pool_size;
        }

        // https://www.w3.org/TR/webrtc/#set-the-configuration (step #8)
        if configuration.ice_transport_policy
            != crate::peer_connection::configuration::RTCIceTransportPolicy::Unspecified
        {
            new_configuration.ice_transport_policy = configuration.ice_transport_policy;
        }

        // https://www.w3.org/TR/webrtc/#set-the-configuration (step #11)
        if !configuration.ice_servers.is_empty() {
            for server in &configuration.ice_servers {
                server.validate()?;
            }
            new_configuration.ice_servers = configuration.ice_servers;
        }

        inner.configuration = new_configuration;
        Ok(())
    }

    /// create_offer generates a JSEP offer, applies it as the pending local
    /// description and moves signaling to have-local-offer.
    /// <https://w3c.github.io/webrtc-pc/#dom-rtcpeerconnection-createoffer>
    pub async fn create_offer(
        &self,
        options: Option<RTCOfferOptions>,
    ) -> Result<RTCSessionDescription> {
        self.ensure_not_closed()?;
        if options.is_some() {
            return Err(Error::ErrOfferOptionsNotSupported);
        }
        let network = self.internal.network()?;

        let mut inner = self.internal.inner.write().await;
        if !inner.configuration.peer_identity.is_empty() {
            return Err(Error::ErrIdentityProviderNotImplemented);
        }

        let next_state = check_next_signaling_state(
            inner.signaling_state,
            RTCSignalingState::HaveLocalOffer,
            StateChangeOp::SetLocal,
            RTCSdpType::Offer,
        )?;

        // absorb a greater numeric mid the remote may have introduced
        let mut remote_numeric_mids = Vec::new();
        if let Some(parsed) = inner.remote_description().and_then(|d| d.parsed.as_ref()) {
            for media in &parsed.media_descriptions {
                if let Some(mid) = get_mid_value(media) {
                    if let Ok(numeric_mid) = mid.parse::<isize>() {
                        remote_numeric_mids.push(numeric_mid);
                    }
                }
            }
        }
        for numeric_mid in remote_numeric_mids {
            if numeric_mid > inner.greater_mid {
                inner.greater_mid = numeric_mid;
            }
        }

        for i in 0..inner.rtp_transceivers.len() {
            if inner.rtp_transceivers[i].mid.is_none() && !inner.rtp_transceivers[i].stopped {
                inner.greater_mid += 1;
                let mid = inner.greater_mid.to_string();
                inner.rtp_transceivers[i].mid = Some(mid);
            }
        }
        if inner.sctp_transport.mid.is_none() {
            inner.greater_mid += 1;
            let mid = inner.greater_mid.to_string();
            inner.sctp_transport.mid = Some(mid);
        }

        let mut media_sections = Vec::new();
        for kind in [RtpCodecKind::Audio, RtpCodecKind::Video] {
            let of_kind: Vec<&RTCRtpTransceiver> = inner
                .rtp_transceivers
                .iter()
                .filter(|t| t.kind == kind && !t.stopped)
                .collect();
            let Some(first) = of_kind.first() else {
                continue;
            };

            media_sections.push(MediaSection {
                mid: first.mid.clone().unwrap_or_default(),
                kind,
                data: false,
                direction: first.direction,
                sending_tracks: of_kind
                    .iter()
                    .filter_map(|t| t.sending_track().cloned())
                    .collect(),
            });
        }
        media_sections.push(MediaSection {
            mid: inner.sctp_transport.mid.clone().unwrap_or_default(),
            kind: RtpCodecKind::Unspecified,
            data: true,
            direction: RTCRtpTransceiverDirection::Unspecified,
            sending_tracks: Vec::new(),
        });

        let fingerprint = network.dtls_fingerprint();
        let agent = network.ice_agent();
        let ice_ufrag = agent.local_ufrag();
        let ice_pwd = agent.local_pwd();
        let candidates = agent.local_candidates();

        let mut d = populate_sdp(
            &media_sections,
            PopulateSdpParams {
                media_engine: self.internal.media_engine.as_ref(),
                fingerprint: &fingerprint,
                ice_ufrag: &ice_ufrag,
                ice_pwd: &ice_pwd,
                candidates: &candidates,
                connection_role: ConnectionRole::Actpass,
            },
        )?;

        update_sdp_origin(&mut inner.sdp_origin, &mut d);
        let sdp = d.marshal();

        let offer = RTCSessionDescription {
            sdp_type: RTCSdpType::Offer,
            sdp: sdp.clone(),
            parsed: Some(d),
        };

        inner.last_offer = sdp;
        inner.pending_local_description = Some(offer.clone());
        inner.signaling_state = next_state;
        // the candidate set is embedded with an end-of-candidates marker
        inner.ice_gathering_state = RTCIceGatheringState::Complete;

        Ok(offer)
    }

    /// create_answer mirrors the remote offer's media sections, applies the
    /// answer as the local description and returns signaling to stable.
    /// <https://w3c.github.io/webrtc-pc/#dom-rtcpeerconnection-createanswer>
    pub async fn create_answer(
        &self,
        options: Option<RTCAnswerOptions>,
    ) -> Result<RTCSessionDescription> {
        self.ensure_not_closed()?;
        if options.is_some() {
            return Err(Error::ErrAnswerOptionsNotSupported);
        }
        let network = self.internal.network()?;

        let mut inner = self.internal.inner.write().await;
        if !inner.configuration.peer_identity.is_empty() {
            return Err(Error::ErrIdentityProviderNotImplemented);
        }

        let remote_parsed = match inner.remote_description() {
            Some(remote) => match &remote.parsed {
                Some(parsed) => parsed.clone(),
                None => return Err(Error::ErrNoRemoteDescription),
            },
            None => return Err(Error::ErrNoRemoteDescription),
        };

        let next_state = check_next_signaling_state(
            inner.signaling_state,
            RTCSignalingState::Stable,
            StateChangeOp::SetLocal,
            RTCSdpType::Answer,
        )?;

        let mut media_sections = Vec::new();
        for media in &remote_parsed.media_descriptions {
            let mid = get_mid_value(media)
                .ok_or(Error::ErrPeerConnRemoteDescriptionWithoutMidValue)?
                .to_owned();

            if media.media_name.media == MEDIA_SECTION_APPLICATION {
                inner.sctp_transport.mid = Some(mid.clone());
                media_sections.push(MediaSection {
                    mid,
                    kind: RtpCodecKind::Unspecified,
                    data: true,
                    direction: RTCRtpTransceiverDirection::Unspecified,
                    sending_tracks: Vec::new(),
                });
                continue;
            }

            let kind = RtpCodecKind::from(media.media_name.media.as_str());
            let peer_direction = get_peer_direction(media);

            // adopt the remote mid on the first unassigned transceiver of
            // this kind
            let already_bound = inner
                .rtp_transceivers
                .iter()
                .any(|t| t.mid.as_deref() == Some(mid.as_str()));
            if !already_bound {
                if let Some(transceiver) =
                    find_unassigned_by_kind(&mut inner.rtp_transceivers, kind)
                {
                    transceiver.mid = Some(mid.clone());
                }
            }

            let sending_tracks: Vec<MediaStreamTrack> = inner
                .rtp_transceivers
                .iter()
                .filter(|t| t.kind == kind && !t.stopped)
                .filter_map(|t| t.sending_track().cloned())
                .collect();
            let we_send = !sending_tracks.is_empty();

            media_sections.push(MediaSection {
                mid,
                kind,
                data: false,
                direction: resolve_direction(we_send, peer_direction),
                sending_tracks,
            });
        }

        let fingerprint = network.dtls_fingerprint();
        let agent = network.ice_agent();
        let ice_ufrag = agent.local_ufrag();
        let ice_pwd = agent.local_pwd();
        let candidates = agent.local_candidates();

        let mut d = populate_sdp(
            &media_sections,
            PopulateSdpParams {
                media_engine: self.internal.media_engine.as_ref(),
                fingerprint: &fingerprint,
                ice_ufrag: &ice_ufrag,
                ice_pwd: &ice_pwd,
                candidates: &candidates,
                connection_role: ConnectionRole::Active,
            },
        )?;

        update_sdp_origin(&mut inner.sdp_origin, &mut d);
        let sdp = d.marshal();

        let answer = RTCSessionDescription {
            sdp_type: RTCSdpType::Answer,
            sdp: sdp.clone(),
            parsed: Some(d),
        };

        inner.last_answer = sdp;
        inner.pending_local_description = Some(answer.clone());
        inner.signaling_state = next_state;
        inner.ice_gathering_state = RTCIceGatheringState::Complete;

        if next_state == RTCSignalingState::Stable {
            // 4.4.1.6: applying the final answer promotes both pending
            // descriptions
            inner.current_local_description = inner.pending_local_description.take();
            inner.current_remote_description = inner.pending_remote_description.take();
        }

        Ok(answer)
    }

    /// set_remote_description applies a description from the remote peer:
    /// the signaling transition, transceiver bookkeeping for offered media
    /// sections, and the push of remote candidates and ICE credentials into
    /// the network manager.
    /// <https://w3c.github.io/webrtc-pc/#dom-rtcpeerconnection-setremotedescription>
    pub async fn set_remote_description(&self, mut desc: RTCSessionDescription) -> Result<()> {
        self.ensure_not_closed()?;

        // parse failures surface before any state is touched
        if desc.parsed.is_none() {
            desc.parsed = Some(desc.unmarshal()?);
        }
        let network = self.internal.network()?;

        let mut inner = self.internal.inner.write().await;

        let next_state = match desc.sdp_type {
            RTCSdpType::Offer => check_next_signaling_state(
                inner.signaling_state,
                RTCSignalingState::HaveRemoteOffer,
                StateChangeOp::SetRemote,
                RTCSdpType::Offer,
            )?,
            RTCSdpType::Answer => check_next_signaling_state(
                inner.signaling_state,
                RTCSignalingState::Stable,
                StateChangeOp::SetRemote,
                RTCSdpType::Answer,
            )?,
            RTCSdpType::Pranswer => check_next_signaling_state(
                inner.signaling_state,
                RTCSignalingState::HaveRemotePranswer,
                StateChangeOp::SetRemote,
                RTCSdpType::Pranswer,
            )?,
            other => {
                check_next_signaling_state(
                    inner.signaling_state,
                    inner.signaling_state,
                    StateChangeOp::SetRemote,
                    other,
                )?;
                return Err(Error::ErrSignalingStateProposedTransitionInvalid(format!(
                    "cannot apply remote description of type {other}"
                )));
            }
        };

        let parsed = match &desc.parsed {
            Some(parsed) => parsed.clone(),
            None => return Err(Error::ErrNoRemoteDescription),
        };

        match desc.sdp_type {
            RTCSdpType::Offer | RTCSdpType::Pranswer => {
                inner.pending_remote_description = Some(desc.clone());
            }
            _ => {
                // final answer: promote both sides to current
                inner.current_remote_description = Some(desc.clone());
                inner.current_local_description = inner.pending_local_description.take();
                inner.pending_remote_description = None;
            }
        }
        inner.signaling_state = next_state;

        if desc.sdp_type == RTCSdpType::Offer {
            for media in &parsed.media_descriptions {
                let Some(mid) = get_mid_value(media) else {
                    continue;
                };
                let mid = mid.to_owned();

                if let Ok(numeric_mid) = mid.parse::<isize>() {
                    if numeric_mid > inner.greater_mid {
                        inner.greater_mid = numeric_mid;
                    }
                }

                if media.media_name.media == MEDIA_SECTION_APPLICATION {
                    inner.sctp_transport.mid = Some(mid);
                    continue;
                }

                let kind = RtpCodecKind::from(media.media_name.media.as_str());
                if kind == RtpCodecKind::Unspecified {
                    continue;
                }

                let already_bound = inner
                    .rtp_transceivers
                    .iter()
                    .any(|t| t.mid.as_deref() == Some(mid.as_str()));
                if already_bound {
                    continue;
                }

                if let Some(transceiver) =
                    find_unassigned_by_kind(&mut inner.rtp_transceivers, kind)
                {
                    transceiver.mid = Some(mid);
                } else {
                    let mut transceiver = RTCRtpTransceiver::new(
                        kind,
                        None,
                        Some(RTCRtpReceiver { track: None }),
                        RTCRtpTransceiverDirection::Recvonly,
                    );
                    transceiver.mid = Some(mid);
                    inner.rtp_transceivers.push(transceiver);
                }
            }
        }

        let details = extract_ice_details(&parsed);

        let agent = network.ice_agent();
        for candidate in details.candidates {
            if let Err(err) = agent.add_remote_candidate(candidate) {
                warn!("{}: agent rejected remote candidate: {err}", self.internal.stats_id);
            }
        }

        let should_start = !inner.network_started;
        inner.network_started = true;

        if should_start {
            // we are the answerer exactly when the remote description is an
            // offer
            let we_offer = desc.sdp_type == RTCSdpType::Answer;
            network.start(we_offer, details.ufrag, details.pwd).await?;
        }

        Ok(())
    }

    /// local_description returns the pending local description if present,
    /// otherwise the current one.
    /// <https://www.w3.org/TR/webrtc/#dom-rtcpeerconnection-localdescription>
    pub async fn local_description(&self) -> Option<RTCSessionDescription> {
        let inner = self.internal.inner.read().await;
        inner.local_description().cloned()
    }

    /// remote_description returns the pending remote description if present,
    /// otherwise the current one.
    /// <https://www.w3.org/TR/webrtc/#dom-rtcpeerconnection-remotedescription>
    pub async fn remote_description(&self) -> Option<RTCSessionDescription> {
        let inner = self.internal.inner.read().await;
        inner.remote_description().cloned()
    }

    /// add_ice_candidate parses one trickled candidate attribute line and
    /// forwards it to the ICE agent.
    pub async fn add_ice_candidate(&self, candidate: &str) -> Result<()> {
        self.ensure_not_closed()?;

        let parsed = RTCIceCandidate::unmarshal(candidate)?;
        self.internal
            .network()?
            .ice_agent()
            .add_remote_candidate(parsed)
    }

    /// add_track binds a local track into the first reusable transceiver or
    /// appends a fresh sendonly one, and starts the track's send pump.
    /// <https://www.w3.org/TR/webrtc/#dom-rtcpeerconnection-addtrack>
    pub async fn add_track(&self, track: MediaStreamTrack) -> Result<RTCRtpSender> {
        self.ensure_not_closed()?;

        let mut inner = self.internal.inner.write().await;
        if find_sender_track_by_id(&inner.rtp_transceivers, track.id()).is_some() {
            return Err(Error::ErrExistingTrack);
        }

        self.internal.start_send_pump(&track);

        let sender = RTCRtpSender {
            track: Some(track.clone()),
        };

        if let Some(transceiver) = satisfy_send_slot(&mut inner.rtp_transceivers, track.kind()) {
            transceiver.sender = Some(sender.clone());
            transceiver.direction = RTCRtpTransceiverDirection::Sendrecv;
        } else {
            inner.rtp_transceivers.push(RTCRtpTransceiver::new(
                track.kind(),
                Some(sender.clone()),
                None,
                RTCRtpTransceiverDirection::Sendonly,
            ));
        }

        Ok(sender)
    }

    /// get_senders returns copies of the senders of every transceiver, in
    /// insertion order.
    pub async fn get_senders(&self) -> Vec<RTCRtpSender> {
        let inner = self.internal.inner.read().await;
        inner
            .rtp_transceivers
            .iter()
            .filter_map(|t| t.sender.clone())
            .collect()
    }

    /// get_receivers returns copies of the receivers of every transceiver,
    /// in insertion order.
    pub async fn get_receivers(&self) -> Vec<RTCRtpReceiver> {
        let inner = self.internal.inner.read().await;
        inner
            .rtp_transceivers
            .iter()
            .filter_map(|t| t.receiver.clone())
            .collect()
    }

    /// get_transceivers returns copies of every transceiver, in insertion
    /// order.
    pub async fn get_transceivers(&self) -> Vec<RTCRtpTransceiver> {
        let inner = self.internal.inner.read().await;
        inner.rtp_transceivers.clone()
    }

    /// new_sample_track creates a sample-mode track for a codec registered
    /// with the media engine. The ssrc is generated.
    pub fn new_sample_track(
        &self,
        payload_type: PayloadType,
        id: &str,
        label: &str,
    ) -> Result<MediaStreamTrack> {
        self.ensure_not_closed()?;

        let codec = self
            .internal
            .media_engine
            .codec_by_payload_type(payload_type)
            .ok_or(Error::ErrCodecNotFound)?
            .codec
            .clone();

        Ok(MediaStreamTrack::new_sample(
            payload_type,
            id.to_owned(),
            label.to_owned(),
            codec,
        ))
    }

    /// new_raw_rtp_track creates a raw-mode track carrying caller-built RTP
    /// packets. The ssrc must be non-zero.
    pub fn new_raw_rtp_track(
        &self,
        payload_type: PayloadType,
        ssrc: SSRC,
        id: &str,
        label: &str,
    ) -> Result<MediaStreamTrack> {
        self.ensure_not_closed()?;

        let codec = self
            .internal
            .media_engine
            .codec_by_payload_type(payload_type)
            .ok_or(Error::ErrCodecNotFound)?
            .codec
            .clone();

        MediaStreamTrack::new_raw_rtp(payload_type, ssrc, id.to_owned(), label.to_owned(), codec)
    }

    /// create_data_channel validates the channel options, allocates a stream
    /// identifier with DCEP parity (offerer even, answerer odd) and
    /// registers the channel.
    /// <https://www.w3.org/TR/webrtc/#dom-rtcpeerconnection-createdatachannel>
    pub async fn create_data_channel(
        &self,
        label: &str,
        options: Option<RTCDataChannelInit>,
    ) -> Result<Arc<RTCDataChannel>> {
        self.ensure_not_closed()?;

        // https://www.w3.org/TR/webrtc/#dom-rtcpeerconnection-createdatachannel
        // (steps #4-#12): option normalization and shape checks
        if label.len() > 65535 {
            return Err(Error::ErrStringSizeLimit);
        }

        let init = options.unwrap_or_default();
        let ordered = init.ordered.unwrap_or(true);
        let protocol = init.protocol.unwrap_or_default();
        if protocol.len() > 65535 {
            return Err(Error::ErrStringSizeLimit);
        }
        let negotiated = init.negotiated.unwrap_or(false);
        let priority = match init.priority {
            Some(RTCPriorityType::Unspecified) | None => RTCPriorityType::Low,
            Some(priority) => priority,
        };

        if init.max_packet_life_time.is_some() && init.max_retransmits.is_some() {
            return Err(Error::ErrRetransmitsOrPacketLifeTime);
        }
        if negotiated && init.id.is_none() {
            return Err(Error::ErrNegotiatedWithoutID);
        }

        let mut inner = self.internal.inner.write().await;

        let transport_connected =
            inner.sctp_transport.state() == RTCSctpTransportState::Connected;
        let id_ceiling: u32 = if transport_connected {
            inner.sctp_transport.max_channels() as u32
        } else {
            MAX_DATA_CHANNEL_ID + 1
        };

        let id = if negotiated {
            match init.id {
                Some(id) => {
                    let id = id as u32;
                    if id > MAX_DATA_CHANNEL_ID || id >= id_ceiling {
                        return Err(Error::ErrMaxDataChannelID);
                    }
                    if inner.data_channels.contains_key(&(id as u16)) {
                        return Err(Error::ErrDataChannelIDInUse);
                    }
                    id as u16
                }
                None => return Err(Error::ErrNegotiatedWithoutID),
            }
        } else {
            // DCEP parity: the offering side uses even stream identifiers,
            // the answering side odd ones
            let mut id: u32 = if inner.is_answerer() { 1 } else { 0 };
            loop {
                if id > MAX_DATA_CHANNEL_ID || id >= id_ceiling {
                    return Err(Error::ErrMaxDataChannelID);
                }
                if !inner.data_channels.contains_key(&(id as u16)) {
                    break;
                }
                id += 2;
            }
            id as u16
        };

        let association = inner
            .sctp_transport
            .association()
            .ok_or(Error::ErrConnectionClosed)?;

        let channel = Arc::new(RTCDataChannel {
            label: label.to_owned(),
            protocol,
            id,
            ordered,
            max_packet_life_time: init.max_packet_life_time,
            max_retransmits: init.max_retransmits,
            negotiated,
            priority,
            ready_state: AtomicU8::new(RTCDataChannelState::Connecting as u8),
            buffered_amount: AtomicUsize::new(0),
            association: Arc::downgrade(&association),
            on_open_handler: ArcSwapOption::empty(),
            on_message_handler: ArcSwapOption::empty(),
        });

        inner.data_channels.insert(id, Arc::clone(&channel));

        // a channel created on an already-established association announces
        // itself immediately instead of waiting for the open sweep
        if transport_connected {
            let mut announce_failed = false;
            if !negotiated {
                let message = channel.open_channel_message().marshal();
                if let Err(err) = association.send(id, message) {
                    warn!(
                        "{}: failed to announce channel {id}: {err}",
                        self.internal.stats_id
                    );
                    announce_failed = true;
                }
            }
            if !announce_failed {
                channel.set_ready_state(RTCDataChannelState::Open);
                let opened = Arc::clone(&channel);
                let _ = self.internal.ops.enqueue(Operation::new(
                    move || Box::pin(PeerConnectionInternal::dispatch_channel_open(opened)),
                    "on_open",
                ));
            }
        }

        Ok(channel)
    }

    /// send_rtcp serializes one RTCP packet and forwards the raw bytes to
    /// the network manager. Succeeds even when no peer is connected; the
    /// packet is dropped downstream.
    pub fn send_rtcp(&self, packet: &(dyn rtcp::packet::Packet + Send + Sync)) -> Result<()> {
        self.ensure_not_closed()?;

        let raw = packet.marshal()?;
        self.internal.network()?.send_rtcp(raw)
    }

    pub async fn signaling_state(&self) -> RTCSignalingState {
        let inner = self.internal.inner.read().await;
        inner.signaling_state
    }

    pub async fn ice_connection_state(&self) -> RTCIceConnectionState {
        let inner = self.internal.inner.read().await;
        inner.ice_connection_state
    }

    pub async fn ice_gathering_state(&self) -> RTCIceGatheringState {
        let inner = self.internal.inner.read().await;
        inner.ice_gathering_state
    }

    pub async fn connection_state(&self) -> RTCPeerConnectionState {
        let inner = self.internal.inner.read().await;
        inner.peer_connection_state
    }

    /// close ends the session: the background worker stops accepting work,
    /// the network manager is shut down, and every state moves to closed.
    /// Calling close on an already-closed connection is a no-op.
    /// <https://www.w3.org/TR/webrtc/#dom-rtcpeerconnection-close>
    pub async fn close(&self) -> Result<()> {
        if self.internal.is_closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        self.internal.ops.close();

        let close_err = match self.internal.network.get() {
            Some(network) => network.close().await.err(),
            None => None,
        };

        {
            let mut inner = self.internal.inner.write().await;
            inner.signaling_state = RTCSignalingState::Closed;
            inner.ice_connection_state = RTCIceConnectionState::Closed;
            inner.peer_connection_state = RTCPeerConnectionState::Closed;
            inner.sctp_transport.state = RTCSctpTransportState::Closed;

            for channel in inner.data_channels.values() {
                channel.set_ready_state(RTCDataChannelState::Closed);
            }
            inner.data_channels.clear();
        }

        match close_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn get_stats_id(&self) -> &str {
        &self.internal.stats_id
    }
}
