#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use rtc_peer::api::media_engine::MediaEngine;
use rtc_peer::api::{API, APIBuilder};
use rtc_peer::error::Result;
use rtc_peer::peer_connection::configuration::{RTCConfiguration, RTCIceServerUrl};
use rtc_peer::peer_connection::RTCPeerConnection;
use rtc_peer::transport::{
    IceAgent, NetworkManager, NetworkManagerFactory, NetworkObserver, RTCIceCandidate,
    SctpAssociation,
};

pub const MOCK_FINGERPRINT: &str =
    "02:03:05:07:0B:0D:11:13:17:1D:1F:25:29:2B:2F:35:3B:3D:43:47:49:4F:53:59:61:65:67:6B:6D:71:7F:83";

pub struct MockIceAgent {
    pub remote_candidates: Mutex<Vec<RTCIceCandidate>>,
    local_candidates: Vec<RTCIceCandidate>,
}

impl IceAgent for MockIceAgent {
    fn local_ufrag(&self) -> String {
        "localUfrag".to_owned()
    }

    fn local_pwd(&self) -> String {
        "localPwdlocalPwdlocalPwd".to_owned()
    }

    fn local_candidates(&self) -> Vec<RTCIceCandidate> {
        self.local_candidates.clone()
    }

    fn add_remote_candidate(&self, candidate: RTCIceCandidate) -> Result<()> {
        self.remote_candidates.lock().unwrap().push(candidate);
        Ok(())
    }
}

pub struct MockAssociation {
    max_channels: u16,
    pub sent: Mutex<Vec<(u16, Bytes)>>,
}

impl SctpAssociation for MockAssociation {
    fn send(&self, stream_id: u16, payload: Bytes) -> Result<()> {
        self.sent.lock().unwrap().push((stream_id, payload));
        Ok(())
    }

    fn max_channels(&self) -> u16 {
        self.max_channels
    }
}

pub struct MockNetworkManager {
    pub agent: Arc<MockIceAgent>,
    pub association: Arc<MockAssociation>,
    pub urls: Mutex<Vec<RTCIceServerUrl>>,
    pub started: Mutex<Option<(bool, String, String)>>,
    pub sent_rtp: Mutex<Vec<rtc_peer::rtp::packet::Packet>>,
    pub sent_rtcp: Mutex<Vec<Bytes>>,
    pub closed: AtomicBool,
}

#[async_trait]
impl NetworkManager for MockNetworkManager {
    fn add_url(&self, url: &RTCIceServerUrl) -> Result<()> {
        self.urls.lock().unwrap().push(url.clone());
        Ok(())
    }

    fn dtls_fingerprint(&self) -> String {
        MOCK_FINGERPRINT.to_owned()
    }

    async fn start(&self, we_offer: bool, remote_ufrag: String, remote_pwd: String) -> Result<()> {
        *self.started.lock().unwrap() = Some((we_offer, remote_ufrag, remote_pwd));
        Ok(())
    }

    fn send_rtp(&self, packet: rtc_peer::rtp::packet::Packet) -> Result<()> {
        self.sent_rtp.lock().unwrap().push(packet);
        Ok(())
    }

    fn send_rtcp(&self, raw: Bytes) -> Result<()> {
        self.sent_rtcp.lock().unwrap().push(raw);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn ice_agent(&self) -> Arc<dyn IceAgent> {
        Arc::clone(&self.agent) as Arc<dyn IceAgent>
    }

    fn sctp_association(&self) -> Arc<dyn SctpAssociation> {
        Arc::clone(&self.association) as Arc<dyn SctpAssociation>
    }
}

pub struct MockNetworkManagerFactory {
    max_channels: u16,
    local_candidates: Vec<RTCIceCandidate>,
    pub created: Mutex<Option<(Arc<MockNetworkManager>, Arc<dyn NetworkObserver>)>>,
}

impl MockNetworkManagerFactory {
    pub fn new(max_channels: u16) -> Arc<Self> {
        let local_candidates = vec![RTCIceCandidate::unmarshal(
            "3860676666 1 udp 2130706431 192.168.1.7 51000 typ host",
        )
        .unwrap()];
        Arc::new(MockNetworkManagerFactory {
            max_channels,
            local_candidates,
            created: Mutex::new(None),
        })
    }

    pub fn manager(&self) -> Arc<MockNetworkManager> {
        let created = self.created.lock().unwrap();
        Arc::clone(&created.as_ref().expect("no connection created yet").0)
    }

    pub fn observer(&self) -> Arc<dyn NetworkObserver> {
        let created = self.created.lock().unwrap();
        Arc::clone(&created.as_ref().expect("no connection created yet").1)
    }
}

impl NetworkManagerFactory for MockNetworkManagerFactory {
    fn create(&self, observer: Arc<dyn NetworkObserver>) -> Result<Arc<dyn NetworkManager>> {
        let manager = Arc::new(MockNetworkManager {
            agent: Arc::new(MockIceAgent {
                remote_candidates: Mutex::new(Vec::new()),
                local_candidates: self.local_candidates.clone(),
            }),
            association: Arc::new(MockAssociation {
                max_channels: self.max_channels,
                sent: Mutex::new(Vec::new()),
            }),
            urls: Mutex::new(Vec::new()),
            started: Mutex::new(None),
            sent_rtp: Mutex::new(Vec::new()),
            sent_rtcp: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        });

        *self.created.lock().unwrap() = Some((Arc::clone(&manager), observer));
        Ok(manager as Arc<dyn NetworkManager>)
    }
}

pub fn api_with_factory(factory: Arc<MockNetworkManagerFactory>) -> API {
    let mut media_engine = MediaEngine::default();
    media_engine
        .register_default_codecs()
        .expect("default codecs");
    APIBuilder::new()
        .with_media_engine(media_engine)
        .with_network_manager_factory(factory)
        .build()
}

pub async fn new_peer_connection() -> (RTCPeerConnection, Arc<MockNetworkManagerFactory>) {
    new_peer_connection_with_max_channels(u16::MAX).await
}

pub async fn new_peer_connection_with_max_channels(
    max_channels: u16,
) -> (RTCPeerConnection, Arc<MockNetworkManagerFactory>) {
    let factory = MockNetworkManagerFactory::new(max_channels);
    let api = api_with_factory(Arc::clone(&factory));
    let pc = api
        .new_peer_connection(RTCConfiguration::default())
        .await
        .expect("new_peer_connection");
    (pc, factory)
}

/// A remote offer with one sendonly video section (mid v0) and one
/// application section (mid d0).
pub const REMOTE_OFFER_SDP: &str = "v=0\r\n\
o=- 884433 2 IN IP4 0.0.0.0\r\n\
s=-\r\n\
t=0 0\r\n\
m=video 9 UDP/TLS/RTP/SAVPF 96\r\n\
c=IN IP4 0.0.0.0\r\n\
a=setup:actpass\r\n\
a=mid:v0\r\n\
a=sendonly\r\n\
a=ice-ufrag:remoteUfrag\r\n\
a=ice-pwd:remotePwdremotePwd\r\n\
a=rtpmap:96 VP8/90000\r\n\
a=candidate:1 1 udp 2130706431 10.0.0.1 5000 typ host\r\n\
m=application 9 DTLS/SCTP 5000\r\n\
c=IN IP4 0.0.0.0\r\n\
a=setup:actpass\r\n\
a=mid:d0\r\n\
a=sctpmap:5000 webrtc-datachannel 1024\r\n";

/// Polls a condition until it holds or the timeout elapses. Background
/// callbacks run on the connection's worker, so tests wait instead of
/// asserting immediately.
pub async fn wait_until(mut condition: impl FnMut() -> bool, what: &str) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("timed out waiting for {what}");
}
