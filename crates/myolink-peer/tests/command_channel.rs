use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use myolink_frame::{CommandFrame, ResponseStatus, GET_RELATIVE_HUMIDITY, SET_DIGIT_POSITIONS};
use myolink_peer::{ChannelConfig, CommandChannel, CommandError, Grip, Hand, HandConfig};
use myolink_transport::{Characteristic, MemoryTransport};

async fn attach(transport: &MemoryTransport) -> CommandChannel {
    CommandChannel::attach(Arc::new(transport.clone()), ChannelConfig::default())
        .await
        .unwrap()
}

fn response(command_id: u8, status: ResponseStatus, payload: &[u8]) -> Bytes {
    CommandFrame::response(command_id, status, payload.to_vec())
        .unwrap()
        .to_bytes()
        .unwrap()
}

async fn wait_pending(channel: &CommandChannel, command_id: u8) {
    while !channel.pending_commands().contains(&command_id) {
        tokio::task::yield_now().await;
    }
}

fn spawn_request(
    channel: &CommandChannel,
    command_id: u8,
    timeout: Duration,
) -> tokio::task::JoinHandle<Result<Vec<u8>, CommandError>> {
    let channel = channel.clone();
    tokio::spawn(async move {
        channel
            .send_request(command_id, Bytes::new(), Some(timeout), |p| Ok(p.to_vec()))
            .await
    })
}

#[tokio::test(start_paused = true)]
async fn duplicate_command_id_rejected_without_write() {
    let transport = MemoryTransport::new();
    let channel = attach(&transport).await;

    let first = spawn_request(&channel, GET_RELATIVE_HUMIDITY, Duration::from_secs(5));
    wait_pending(&channel, GET_RELATIVE_HUMIDITY).await;

    let err = channel
        .send_request(GET_RELATIVE_HUMIDITY, Bytes::new(), None, |_| Ok(()))
        .await
        .unwrap_err();
    assert!(matches!(err, CommandError::AlreadyInFlight(GET_RELATIVE_HUMIDITY)));
    assert_eq!(transport.writes_to(Characteristic::Control).len(), 1);

    transport.notify(
        Characteristic::Control,
        &response(GET_RELATIVE_HUMIDITY, ResponseStatus::Success, &[1]),
    );
    assert_eq!(first.await.unwrap().unwrap(), vec![1]);
}

#[tokio::test(start_paused = true)]
async fn timeout_only_affects_its_own_request() {
    let transport = MemoryTransport::new();
    let channel = attach(&transport).await;

    let short = spawn_request(&channel, 0x0A, Duration::from_secs(1));
    let long = spawn_request(&channel, 0x0B, Duration::from_secs(10));
    wait_pending(&channel, 0x0A).await;
    wait_pending(&channel, 0x0B).await;

    let err = short.await.unwrap().unwrap_err();
    assert!(matches!(err, CommandError::Timeout(d) if d == Duration::from_secs(1)));
    assert_eq!(channel.pending_commands(), vec![0x0B]);
    assert_eq!(channel.stats().timeouts, 1);

    transport.notify(
        Characteristic::Control,
        &response(0x0B, ResponseStatus::Success, &[9, 9]),
    );
    assert_eq!(long.await.unwrap().unwrap(), vec![9, 9]);
    assert!(channel.pending_commands().is_empty());
}

#[tokio::test]
async fn unsolicited_response_is_counted_not_fatal() {
    let transport = MemoryTransport::new();
    let channel = attach(&transport).await;

    transport.notify(
        Characteristic::Control,
        &response(0x0C, ResponseStatus::Success, &[]),
    );
    assert_eq!(channel.stats().unsolicited, 1);

    let task = spawn_request(&channel, 0x0C, Duration::from_secs(5));
    wait_pending(&channel, 0x0C).await;
    transport.notify(
        Characteristic::Control,
        &response(0x0C, ResponseStatus::Success, &[3]),
    );
    assert_eq!(task.await.unwrap().unwrap(), vec![3]);
}

#[tokio::test(start_paused = true)]
async fn abandoned_request_releases_slot() {
    let transport = MemoryTransport::new();
    let channel = attach(&transport).await;

    let abandoned = tokio::time::timeout(
        Duration::from_millis(10),
        channel.send_request(0x0A, Bytes::new(), Some(Duration::from_secs(60)), |_| {
            Ok(())
        }),
    )
    .await;
    assert!(abandoned.is_err());
    assert!(channel.pending_commands().is_empty());

    let task = spawn_request(&channel, 0x0A, Duration::from_secs(5));
    wait_pending(&channel, 0x0A).await;
    transport.notify(
        Characteristic::Control,
        &response(0x0A, ResponseStatus::Success, &[]),
    );
    assert!(task.await.unwrap().is_ok());
}

#[tokio::test]
async fn close_fails_pending_and_unsubscribes() {
    let transport = MemoryTransport::new();
    let channel = attach(&transport).await;

    let task = spawn_request(&channel, 0x0A, Duration::from_secs(5));
    wait_pending(&channel, 0x0A).await;
    channel.close().await.unwrap();

    assert!(matches!(task.await.unwrap(), Err(CommandError::Closed)));
    assert!(!transport.is_subscribed(Characteristic::Control));
    assert!(matches!(
        channel.send_command(0x07, vec![0]).await,
        Err(CommandError::Closed)
    ));
}

#[tokio::test]
async fn hand_clamps_digit_positions_on_the_wire() {
    let transport = MemoryTransport::new();
    let hand = Hand::connect(Arc::new(transport.clone()), HandConfig::default())
        .await
        .unwrap();

    hand.set_digit_positions([(0, 1.4), (1, -0.2)]).await.unwrap();

    let writes = transport.writes_to(Characteristic::Control);
    assert_eq!(writes.len(), 1);
    let mut expected = vec![0x00, SET_DIGIT_POSITIONS, 0x80, 11, 0x01, 0];
    expected.extend_from_slice(&1.0f32.to_be_bytes());
    expected.push(1);
    expected.extend_from_slice(&0.0f32.to_be_bytes());
    assert_eq!(writes[0].as_ref(), expected.as_slice());
    assert!(hand.channel().pending_commands().is_empty());
}

#[tokio::test]
async fn hand_invalid_digits_never_reach_the_transport() {
    let transport = MemoryTransport::new();
    let hand = Hand::connect(Arc::new(transport.clone()), HandConfig::default())
        .await
        .unwrap();

    let err = hand.set_digit_positions([(7, 0.5)]).await.unwrap_err();
    assert!(matches!(err, CommandError::InvalidArgument(_)));
    assert!(transport.writes_to(Characteristic::Control).is_empty());

    hand.set_grip(Grip::Pinch).await.unwrap();
    let writes = transport.writes_to(Characteristic::Control);
    assert_eq!(writes[0].as_ref(), &[0x00, 0x07, 0x80, 0x01, 0x03]);
}

#[tokio::test]
async fn hand_reads_relative_humidity() {
    let transport = MemoryTransport::new().with_responder(|_, data| {
        vec![(
            Characteristic::Control,
            response(data[1], ResponseStatus::Success, &46.5f32.to_be_bytes()),
        )]
    });
    let hand = Hand::connect(Arc::new(transport.clone()), HandConfig::default())
        .await
        .unwrap();

    assert_eq!(hand.get_relative_humidity().await.unwrap(), 46.5);
}

#[tokio::test]
async fn hand_surfaces_device_rejection() {
    let transport = MemoryTransport::new().with_responder(|_, data| {
        vec![(
            Characteristic::Control,
            response(data[1], ResponseStatus::Busy, &[]),
        )]
    });
    let hand = Hand::connect(Arc::new(transport.clone()), HandConfig::default())
        .await
        .unwrap();

    let err = hand.get_relative_humidity().await.unwrap_err();
    assert!(matches!(
        err,
        CommandError::DeviceRejected {
            command_id: GET_RELATIVE_HUMIDITY,
            status: ResponseStatus::Busy,
        }
    ));
}

#[tokio::test]
async fn hand_rejects_short_humidity_payload() {
    let transport = MemoryTransport::new().with_responder(|_, data| {
        vec![(
            Characteristic::Control,
            response(data[1], ResponseStatus::Success, &[0x42, 0x00]),
        )]
    });
    let hand = Hand::connect(Arc::new(transport.clone()), HandConfig::default())
        .await
        .unwrap();

    let err = hand.get_relative_humidity().await.unwrap_err();
    assert!(matches!(err, CommandError::Frame(_)));
}
