//! The factory assembling peer connections from a codec registry and a
//! network-manager provider.

pub mod media_engine;

use std::sync::Arc;

use crate::error::Result;
use crate::peer_connection::configuration::RTCConfiguration;
use crate::peer_connection::RTCPeerConnection;
use crate::transport::NetworkManagerFactory;

use media_engine::MediaEngine;

/// The API object holds everything connections share: the media engine
/// (immutable once attached) and the factory producing each connection's
/// network manager.
pub struct API {
    pub(crate) media_engine: Arc<MediaEngine>,
    pub(crate) network_manager_factory: Option<Arc<dyn NetworkManagerFactory>>,
}

impl API {
    /// new_peer_connection creates a PeerConnection with the API's media
    /// engine and network-manager factory. Must run inside a tokio runtime:
    /// the connection spawns its background worker here.
    pub async fn new_peer_connection(
        &self,
        configuration: RTCConfiguration,
    ) -> Result<RTCPeerConnection> {
        RTCPeerConnection::new(self, configuration)
    }
}

#[derive(Default)]
pub struct APIBuilder {
    media_engine: Option<MediaEngine>,
    network_manager_factory: Option<Arc<dyn NetworkManagerFactory>>,
}

impl APIBuilder {
    pub fn new() -> Self {
        APIBuilder::default()
    }

    /// with_media_engine attaches a codec registry. Register codecs before
    /// building; the engine cannot change afterwards.
    pub fn with_media_engine(mut self, media_engine: MediaEngine) -> Self {
        self.media_engine = Some(media_engine);
        self
    }

    /// with_network_manager_factory attaches the transport-stack provider
    /// every connection built from this API will use.
    pub fn with_network_manager_factory(
        mut self,
        network_manager_factory: Arc<dyn NetworkManagerFactory>,
    ) -> Self {
        self.network_manager_factory = Some(network_manager_factory);
        self
    }

    pub fn build(self) -> API {
        API {
            media_engine: Arc::new(self.media_engine.unwrap_or_default()),
            network_manager_factory: self.network_manager_factory,
        }
    }
}
