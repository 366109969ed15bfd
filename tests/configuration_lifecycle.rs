mod common;

use std::time::SystemTime;

use rtc_peer::error::{Error, ErrorKind};
use rtc_peer::peer_connection::certificate::RTCCertificate;
use rtc_peer::peer_connection::configuration::{
    RTCBundlePolicy, RTCConfiguration, RTCIceServer, RTCIceTransportPolicy,
};

use common::{api_with_factory, new_peer_connection, MockNetworkManagerFactory};

#[tokio::test]
async fn test_default_configuration_generates_certificate() {
    let (pc, _factory) = new_peer_connection().await;

    let config = pc.get_configuration().await;
    assert_eq!(config.certificates.len(), 1);
    assert!(config.certificates[0].expires() > SystemTime::now());
    assert_eq!(config.ice_transport_policy, RTCIceTransportPolicy::All);
    assert_eq!(config.bundle_policy, RTCBundlePolicy::Balanced);
    assert_eq!(config.ice_candidate_pool_size, 0);
    assert!(config.ice_servers.is_empty());

    pc.close().await.unwrap();
}

#[tokio::test]
async fn test_ice_servers_are_registered_with_network_manager() {
    let factory = MockNetworkManagerFactory::new(u16::MAX);
    let api = api_with_factory(factory.clone());

    let pc = api
        .new_peer_connection(RTCConfiguration {
            ice_servers: vec![RTCIceServer {
                urls: vec![
                    "stun:stun.l.google.com:19302".to_owned(),
                    "stun:stun1.l.google.com".to_owned(),
                ],
                ..Default::default()
            }],
            ..Default::default()
        })
        .await
        .unwrap();

    let manager = factory.manager();
    let urls = manager.urls.lock().unwrap();
    assert_eq!(urls.len(), 2);
    assert_eq!(urls[0].host, "stun.l.google.com");
    assert_eq!(urls[0].port, 19302);
    assert_eq!(urls[1].port, 3478);
    drop(urls);

    pc.close().await.unwrap();
}

#[tokio::test]
async fn test_construct_rejects_expired_certificate() {
    let factory = MockNetworkManagerFactory::new(u16::MAX);
    let api = api_with_factory(factory);

    let fresh = RTCCertificate::generate().unwrap();
    let stale = RTCCertificate::from_existing(
        fresh.certificate_der().to_vec(),
        fresh.private_key_der().to_vec(),
        SystemTime::UNIX_EPOCH,
    );

    let result = api
        .new_peer_connection(RTCConfiguration {
            certificates: vec![stale],
            ..Default::default()
        })
        .await;

    match result {
        Err(err) => assert_eq!(err.kind(), ErrorKind::InvalidAccess),
        Ok(_) => panic!("expired certificate must be rejected"),
    }
}

#[tokio::test]
async fn test_set_configuration_modification_rules() {
    let (pc, _factory) = new_peer_connection().await;
    let snapshot = pc.get_configuration().await;

    // changing the bundle policy after construction is rejected
    let result = pc
        .set_configuration(RTCConfiguration {
            bundle_policy: RTCBundlePolicy::MaxBundle,
            ..Default::default()
        })
        .await;
    assert!(matches!(result, Err(Error::ErrModifyingBundlePolicy)));

    // a rejected call leaves the previous snapshot untouched
    let after = pc.get_configuration().await;
    assert_eq!(after.bundle_policy, snapshot.bundle_policy);
    assert_eq!(after.certificates.len(), snapshot.certificates.len());

    // supplying a different certificate list is rejected
    let result = pc
        .set_configuration(RTCConfiguration {
            certificates: vec![RTCCertificate::generate().unwrap()],
            ..Default::default()
        })
        .await;
    assert!(matches!(result, Err(Error::ErrModifyingCertificates)));

    // the pool size may change while no local description exists
    pc.set_configuration(RTCConfiguration {
        ice_candidate_pool_size: 4,
        ..Default::default()
    })
    .await
    .unwrap();
    assert_eq!(pc.get_configuration().await.ice_candidate_pool_size, 4);

    // once a local description exists it is frozen
    pc.create_offer(None).await.unwrap();
    let result = pc
        .set_configuration(RTCConfiguration {
            ice_candidate_pool_size: 8,
            ..Default::default()
        })
        .await;
    assert!(matches!(
        result,
        Err(Error::ErrModifyingICECandidatePoolSize)
    ));

    pc.close().await.unwrap();
}

#[tokio::test]
async fn test_set_configuration_replaces_ice_servers() {
    let (pc, _factory) = new_peer_connection().await;

    pc.set_configuration(RTCConfiguration {
        ice_servers: vec![RTCIceServer {
            urls: vec!["stun:stun.example.com".to_owned()],
            ..Default::default()
        }],
        ..Default::default()
    })
    .await
    .unwrap();

    let config = pc.get_configuration().await;
    assert_eq!(config.ice_servers.len(), 1);

    // an invalid server leaves the configuration untouched
    let result = pc
        .set_configuration(RTCConfiguration {
            ice_servers: vec![RTCIceServer {
                urls: vec!["turn:turn.example.com".to_owned()],
                ..Default::default()
            }],
            ..Default::default()
        })
        .await;
    assert!(result.is_err());
    assert_eq!(pc.get_configuration().await.ice_servers.len(), 1);

    pc.close().await.unwrap();
}

#[tokio::test]
async fn test_close_is_idempotent_and_final() {
    let (pc, factory) = new_peer_connection().await;
    let channel = pc.create_data_channel("chat", None).await.unwrap();

    pc.close().await.unwrap();
    pc.close().await.unwrap();

    let manager = factory.manager();
    assert!(manager.closed.load(std::sync::atomic::Ordering::SeqCst));
    assert_eq!(
        channel.ready_state(),
        rtc_peer::data_channel::RTCDataChannelState::Closed
    );

    assert!(matches!(
        pc.create_offer(None).await,
        Err(Error::ErrConnectionClosed)
    ));
    assert!(matches!(
        pc.create_answer(None).await,
        Err(Error::ErrConnectionClosed)
    ));
    assert!(matches!(
        pc.create_data_channel("late", None).await,
        Err(Error::ErrConnectionClosed)
    ));
    assert!(matches!(
        pc.set_configuration(RTCConfiguration::default()).await,
        Err(Error::ErrConnectionClosed)
    ));
    assert!(matches!(
        pc.add_ice_candidate("candidate:1 1 udp 1 1.1.1.1 1 typ host")
            .await,
        Err(Error::ErrConnectionClosed)
    ));
    assert!(matches!(
        pc.new_sample_track(111, "a", "b"),
        Err(Error::ErrConnectionClosed)
    ));
}

#[tokio::test]
async fn test_api_without_network_factory_fails() {
    let api = rtc_peer::api::APIBuilder::new().build();
    let result = api.new_peer_connection(RTCConfiguration::default()).await;
    assert!(matches!(result, Err(Error::ErrNoNetworkManagerFactory)));
}
