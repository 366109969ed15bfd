mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;

use rtc_peer::data_channel::{RTCDataChannelInit, RTCDataChannelState, RTCPriorityType};
use rtc_peer::error::Error;
use rtc_peer::peer_connection::sdp::RTCSessionDescription;
use rtc_peer::transport::DataChannelEvent;

use common::{
    new_peer_connection, new_peer_connection_with_max_channels, wait_until, REMOTE_OFFER_SDP,
};

#[tokio::test]
async fn test_create_data_channel_defaults() {
    let (pc, _factory) = new_peer_connection().await;

    let channel = pc.create_data_channel("chat", None).await.unwrap();

    assert_eq!(channel.label(), "chat");
    assert_eq!(channel.protocol(), "");
    assert!(channel.ordered());
    assert!(!channel.negotiated());
    assert_eq!(channel.priority(), RTCPriorityType::Low);
    assert_eq!(channel.ready_state(), RTCDataChannelState::Connecting);
    assert_eq!(channel.buffered_amount(), 0);
    assert_eq!(channel.id(), 0);

    let second = pc.create_data_channel("more", None).await.unwrap();
    assert_eq!(second.id(), 2);

    pc.close().await.unwrap();
}

#[tokio::test]
async fn test_data_channel_options_round_trip() {
    let (pc, _factory) = new_peer_connection().await;

    let channel = pc
        .create_data_channel(
            "options",
            Some(RTCDataChannelInit {
                ordered: Some(false),
                max_retransmits: Some(3),
                protocol: Some("proto".to_owned()),
                negotiated: Some(true),
                id: Some(42),
                priority: Some(RTCPriorityType::High),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

    assert!(!channel.ordered());
    assert_eq!(channel.max_retransmits(), Some(3));
    assert_eq!(channel.max_packet_life_time(), None);
    assert_eq!(channel.protocol(), "proto");
    assert!(channel.negotiated());
    assert_eq!(channel.id(), 42);
    assert_eq!(channel.priority(), RTCPriorityType::High);

    pc.close().await.unwrap();
}

#[tokio::test]
async fn test_create_data_channel_option_shape_errors() {
    let (pc, _factory) = new_peer_connection().await;

    let result = pc
        .create_data_channel(
            "both",
            Some(RTCDataChannelInit {
                max_packet_life_time: Some(100),
                max_retransmits: Some(3),
                ..Default::default()
            }),
        )
        .await;
    assert!(matches!(result, Err(Error::ErrRetransmitsOrPacketLifeTime)));

    let result = pc
        .create_data_channel(
            "negotiated-without-id",
            Some(RTCDataChannelInit {
                negotiated: Some(true),
                ..Default::default()
            }),
        )
        .await;
    assert!(matches!(result, Err(Error::ErrNegotiatedWithoutID)));

    let long_label = "x".repeat(65536);
    let result = pc.create_data_channel(&long_label, None).await;
    assert!(matches!(result, Err(Error::ErrStringSizeLimit)));

    pc.close().await.unwrap();
}

#[tokio::test]
async fn test_answerer_allocates_odd_ids() {
    let (pc, _factory) = new_peer_connection().await;

    let offer = RTCSessionDescription::offer(REMOTE_OFFER_SDP.to_owned()).unwrap();
    pc.set_remote_description(offer).await.unwrap();

    let first = pc.create_data_channel("a", None).await.unwrap();
    let second = pc.create_data_channel("b", None).await.unwrap();
    assert_eq!(first.id(), 1);
    assert_eq!(second.id(), 3);

    pc.close().await.unwrap();
}

#[tokio::test]
async fn test_data_channel_id_exhaustion() {
    let (pc, factory) = new_peer_connection_with_max_channels(4).await;

    // the first channel also serves as the signal that the transport came
    // up: the open sweep flips it to Open
    let first = pc.create_data_channel("a", None).await.unwrap();
    assert_eq!(first.id(), 0);

    factory
        .observer()
        .handle_data_channel_event(DataChannelEvent::TransportOpen);

    let first2 = Arc::clone(&first);
    wait_until(
        || first2.ready_state() == RTCDataChannelState::Open,
        "sctp transport connected",
    )
    .await;

    let second = pc.create_data_channel("b", None).await.unwrap();
    assert_eq!(second.id(), 2);

    // the next even id would be 4, which is not below max_channels
    let result = pc.create_data_channel("c", None).await;
    assert!(matches!(result, Err(Error::ErrMaxDataChannelID)));

    pc.close().await.unwrap();
}

#[tokio::test]
async fn test_open_sweep_announces_and_opens_channels() {
    let (pc, factory) = new_peer_connection().await;

    let opened = Arc::new(AtomicUsize::new(0));

    let chat = pc.create_data_channel("chat", None).await.unwrap();
    let opened2 = Arc::clone(&opened);
    chat.on_open(Box::new(move || {
        let opened = Arc::clone(&opened2);
        Box::pin(async move {
            opened.fetch_add(1, Ordering::SeqCst);
        })
    }));

    let file = pc.create_data_channel("file", None).await.unwrap();
    let opened2 = Arc::clone(&opened);
    file.on_open(Box::new(move || {
        let opened = Arc::clone(&opened2);
        Box::pin(async move {
            opened.fetch_add(1, Ordering::SeqCst);
        })
    }));

    assert_eq!(chat.ready_state(), RTCDataChannelState::Connecting);

    factory
        .observer()
        .handle_data_channel_event(DataChannelEvent::TransportOpen);

    let opened2 = Arc::clone(&opened);
    wait_until(|| opened2.load(Ordering::SeqCst) == 2, "both channels open").await;

    assert_eq!(chat.ready_state(), RTCDataChannelState::Open);
    assert_eq!(file.ready_state(), RTCDataChannelState::Open);

    // two DCEP open messages went out on the association, lowest id first
    let manager = factory.manager();
    let sent = manager.association.sent.lock().unwrap();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].0, chat.id());
    assert_eq!(sent[1].0, file.id());
    // type byte of DATA_CHANNEL_OPEN
    assert_eq!(sent[0].1[0], 0x03);
    drop(sent);

    pc.close().await.unwrap();
}

#[tokio::test]
async fn test_inbound_channel_created_event() {
    let (pc, factory) = new_peer_connection().await;

    let received = Arc::new(Mutex::new(None));
    let received2 = Arc::clone(&received);
    pc.on_data_channel(Box::new(move |channel| {
        let received = Arc::clone(&received2);
        Box::pin(async move {
            *received.lock().unwrap() = Some(channel);
        })
    }));

    factory
        .observer()
        .handle_data_channel_event(DataChannelEvent::Created {
            stream_id: 5,
            label: "inbound".to_owned(),
            protocol: "sub".to_owned(),
        });

    let received2 = Arc::clone(&received);
    wait_until(
        || received2.lock().unwrap().is_some(),
        "on_data_channel fired",
    )
    .await;

    let channel = received.lock().unwrap().take().unwrap();
    assert_eq!(channel.label(), "inbound");
    assert_eq!(channel.protocol(), "sub");
    assert_eq!(channel.id(), 5);
    assert_eq!(channel.ready_state(), RTCDataChannelState::Open);

    // the open was acknowledged in-band
    let manager = factory.manager();
    let sent = manager.association.sent.lock().unwrap();
    assert!(sent.iter().any(|(id, raw)| *id == 5 && raw[0] == 0x02));
    drop(sent);

    pc.close().await.unwrap();
}

#[tokio::test]
async fn test_inbound_message_dispatch() {
    let (pc, factory) = new_peer_connection().await;

    let received = Arc::new(Mutex::new(None));
    let channel_slot = Arc::new(Mutex::new(None));

    let channel_slot2 = Arc::clone(&channel_slot);
    pc.on_data_channel(Box::new(move |channel| {
        let channel_slot = Arc::clone(&channel_slot2);
        Box::pin(async move {
            *channel_slot.lock().unwrap() = Some(channel);
        })
    }));

    factory
        .observer()
        .handle_data_channel_event(DataChannelEvent::Created {
            stream_id: 7,
            label: "inbound".to_owned(),
            protocol: "".to_owned(),
        });

    let channel_slot2 = Arc::clone(&channel_slot);
    wait_until(|| channel_slot2.lock().unwrap().is_some(), "channel created").await;

    let channel = channel_slot.lock().unwrap().take().unwrap();
    let received2 = Arc::clone(&received);
    channel.on_message(Box::new(move |message| {
        let received = Arc::clone(&received2);
        Box::pin(async move {
            *received.lock().unwrap() = Some(message.data);
        })
    }));

    factory
        .observer()
        .handle_data_channel_event(DataChannelEvent::Message {
            stream_id: 7,
            payload: Bytes::from_static(b"ping"),
        });

    let received2 = Arc::clone(&received);
    wait_until(|| received2.lock().unwrap().is_some(), "message dispatched").await;
    assert_eq!(
        received.lock().unwrap().take().unwrap(),
        Bytes::from_static(b"ping")
    );

    // a message for an unknown stream is dropped silently
    factory
        .observer()
        .handle_data_channel_event(DataChannelEvent::Message {
            stream_id: 9,
            payload: Bytes::from_static(b"lost"),
        });

    pc.close().await.unwrap();
}

#[tokio::test]
async fn test_send_after_open_counts_buffered_amount() {
    let (pc, factory) = new_peer_connection().await;

    let channel = pc.create_data_channel("chat", None).await.unwrap();
    factory
        .observer()
        .handle_data_channel_event(DataChannelEvent::TransportOpen);

    let channel2 = Arc::clone(&channel);
    wait_until(
        || channel2.ready_state() == RTCDataChannelState::Open,
        "channel open",
    )
    .await;

    channel.send_text("hello").unwrap();
    assert_eq!(channel.buffered_amount(), 5);

    let manager = factory.manager();
    let sent = manager.association.sent.lock().unwrap();
    let (stream_id, payload) = sent.last().unwrap();
    assert_eq!(*stream_id, channel.id());
    assert_eq!(payload.as_ref(), b"hello");
    drop(sent);

    pc.close().await.unwrap();
}

#[tokio::test]
async fn test_channel_created_after_transport_open_announces_immediately() {
    let (pc, factory) = new_peer_connection().await;

    let probe = pc.create_data_channel("probe", None).await.unwrap();
    factory
        .observer()
        .handle_data_channel_event(DataChannelEvent::TransportOpen);

    let probe2 = Arc::clone(&probe);
    wait_until(
        || probe2.ready_state() == RTCDataChannelState::Open,
        "sctp transport connected",
    )
    .await;

    // with the association established, a new channel opens at once
    let late = pc.create_data_channel("late", None).await.unwrap();
    assert_eq!(late.ready_state(), RTCDataChannelState::Open);

    let manager = factory.manager();
    let sent = manager.association.sent.lock().unwrap();
    assert!(sent
        .iter()
        .any(|(id, raw)| *id == late.id() && raw[0] == 0x03));
    drop(sent);

    pc.close().await.unwrap();
}
