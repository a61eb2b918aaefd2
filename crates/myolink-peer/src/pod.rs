use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use myolink_stream::{
    build_configure_frame, decode_data_packet, CompressionType, ConfigureFrame, EmgStreamSource,
    ReadOnlyConfiguration, StreamConfiguration, StreamDataPacket, SUPPORTED_STREAM_SCHEMA,
};
use myolink_transport::{Characteristic, GattTransport, NotificationHandler};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use crate::error::StreamError;

type Result<T> = std::result::Result<T, StreamError>;

/// Configuration for a [`MyoPod`].
#[derive(Debug, Clone)]
pub struct PodConfig {
    /// Data packet schema requested in every configure write.
    pub stream_schema: u8,
    /// Packets buffered between the notification path and the consumer.
    pub hand_off_capacity: usize,
}

impl Default for PodConfig {
    fn default() -> Self {
        Self {
            stream_schema: SUPPORTED_STREAM_SCHEMA,
            hand_off_capacity: 256,
        }
    }
}

/// Stream session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No source selected on the device.
    Idle,
    /// A source is configured but packets are not being consumed.
    Configuring,
    /// Subscribed to stream data.
    Streaming,
}

/// Counters kept by the stream data path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub decoded: u64,
    pub malformed: u64,
    /// Decoded packets dropped because the hand-off was full.
    pub dropped: u64,
    /// Block numbers that did not follow their predecessor.
    pub block_gaps: u64,
}

struct Session {
    state: SessionState,
    configuration: Option<StreamConfiguration>,
}

/// A connected EMG sensor pod.
///
/// Session transitions run one at a time; the decode path itself runs
/// inside the transport's notification callback and never blocks.
pub struct MyoPod {
    transport: Arc<dyn GattTransport>,
    config: PodConfig,
    session: Mutex<Session>,
    stats: Arc<Mutex<StreamStats>>,
    transitions: tokio::sync::Mutex<()>,
}

impl MyoPod {
    pub fn new(transport: Arc<dyn GattTransport>, config: PodConfig) -> Self {
        Self {
            transport,
            config,
            session: Mutex::new(Session {
                state: SessionState::Idle,
                configuration: None,
            }),
            stats: Arc::new(Mutex::new(StreamStats::default())),
            transitions: tokio::sync::Mutex::new(()),
        }
    }

    pub fn state(&self) -> SessionState {
        self.lock_session().state
    }

    /// The last stream configuration read from the device.
    pub fn cached_configuration(&self) -> Option<StreamConfiguration> {
        self.lock_session().configuration
    }

    pub fn stats(&self) -> StreamStats {
        *lock(&self.stats)
    }

    pub async fn read_only_configuration(&self) -> Result<ReadOnlyConfiguration> {
        let raw = self
            .transport
            .read(Characteristic::ReadOnlyConfiguration)
            .await?;
        Ok(ReadOnlyConfiguration::decode(&raw)?)
    }

    /// Read the stream configuration and cache it.
    pub async fn read_stream_configuration(&self) -> Result<StreamConfiguration> {
        let raw = self
            .transport
            .read(Characteristic::StreamConfiguration)
            .await?;
        let configuration = StreamConfiguration::decode(&raw)?;
        self.lock_session().configuration = Some(configuration);
        Ok(configuration)
    }

    /// Select a source and compression on the device.
    ///
    /// Rejected while streaming. Input is validated before anything is
    /// written; on success the device's resulting configuration is read
    /// back and cached.
    pub async fn configure_stream(
        &self,
        source: EmgStreamSource,
        compression: CompressionType,
        average_samples: u32,
    ) -> Result<StreamConfiguration> {
        let _transition = self.transitions.lock().await;
        let previous = self.state();
        if previous == SessionState::Streaming {
            return Err(myolink_stream::ConfigurationError::StreamActive.into());
        }
        let frame =
            build_configure_frame(source, compression, average_samples, self.config.stream_schema)?;

        self.set_state(SessionState::Configuring);
        let result = self.write_configuration(&frame).await;
        match &result {
            Ok(configuration) if configuration.is_streaming() => {
                debug!(
                    source = %configuration.active_stream_source,
                    compression = %configuration.compression_type,
                    average = configuration.average_samples,
                    "stream configured"
                );
            }
            Ok(_) => self.set_state(SessionState::Idle),
            Err(_) => self.set_state(previous),
        }
        result
    }

    /// Subscribe to stream data and hand decoded packets to the returned receiver.
    ///
    /// When the receiver falls behind and the hand-off is full, the newest
    /// packet is dropped and counted.
    pub async fn start_stream(&self) -> Result<mpsc::Receiver<StreamDataPacket>> {
        let _transition = self.transitions.lock().await;
        match self.state() {
            SessionState::Streaming => return Err(StreamError::AlreadyStreaming),
            SessionState::Idle => return Err(StreamError::NotConfigured),
            SessionState::Configuring => {}
        }

        let (tx, rx) = mpsc::channel(self.config.hand_off_capacity.max(1));
        let sink = Arc::new(StreamSink {
            tx,
            stats: Arc::clone(&self.stats),
            last_block: Mutex::new(None),
        });
        let handler: NotificationHandler = Arc::new(move |data: &[u8]| sink.on_notification(data));
        self.transport
            .subscribe(Characteristic::StreamData, handler)
            .await?;

        self.set_state(SessionState::Streaming);
        debug!("stream started");
        Ok(rx)
    }

    /// Tell the device to stop, then unsubscribe.
    ///
    /// A packet that arrives between the two steps is still decoded; one
    /// arriving after the unsubscribe is never observed. From `Configuring`
    /// the device is already transmitting, so only the stop is written.
    /// No-op when idle.
    pub async fn stop_stream(&self) -> Result<()> {
        let _transition = self.transitions.lock().await;
        let subscribed = match self.state() {
            SessionState::Idle => return Ok(()),
            SessionState::Configuring => false,
            SessionState::Streaming => true,
        };

        let stop = ConfigureFrame {
            stream_schema: self.config.stream_schema,
            ..ConfigureFrame::stop()
        };
        let stopped = self
            .transport
            .write(Characteristic::StreamConfiguration, &stop.to_bytes())
            .await;
        let unsubscribed = if subscribed {
            self.transport.unsubscribe(Characteristic::StreamData).await
        } else {
            Ok(())
        };

        {
            let mut session = self.lock_session();
            session.state = SessionState::Idle;
            if let Some(configuration) = session.configuration.as_mut() {
                configuration.active_stream_source = EmgStreamSource::None;
            }
        }
        debug!(subscribed, "stream stopped");
        stopped?;
        unsubscribed?;
        Ok(())
    }

    async fn write_configuration(&self, frame: &ConfigureFrame) -> Result<StreamConfiguration> {
        self.transport
            .write(Characteristic::StreamConfiguration, &frame.to_bytes())
            .await?;
        self.read_stream_configuration().await
    }

    fn set_state(&self, state: SessionState) {
        self.lock_session().state = state;
    }

    fn lock_session(&self) -> MutexGuard<'_, Session> {
        lock(&self.session)
    }
}

impl std::fmt::Debug for MyoPod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MyoPod")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("stats", &self.stats())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Decode-and-forward state owned by one streaming session.
struct StreamSink {
    tx: mpsc::Sender<StreamDataPacket>,
    stats: Arc<Mutex<StreamStats>>,
    last_block: Mutex<Option<u8>>,
}

impl StreamSink {
    fn on_notification(&self, data: &[u8]) {
        let packet = match decode_data_packet(data) {
            Ok(packet) => packet,
            Err(err) => {
                lock(&self.stats).malformed += 1;
                warn!(error = %err, len = data.len(), "dropping malformed stream packet");
                return;
            }
        };

        let block = packet.block_number;
        let previous = lock(&self.last_block).replace(block);
        let gap = previous.is_some_and(|last| block != last.wrapping_add(1));
        if gap {
            debug!(block, ?previous, "stream block gap");
        }
        {
            let mut stats = lock(&self.stats);
            stats.decoded += 1;
            if gap {
                stats.block_gaps += 1;
            }
        }

        match self.tx.try_send(packet) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                lock(&self.stats).dropped += 1;
                warn!(block, "stream hand-off full, dropping newest packet");
            }
            Err(TrySendError::Closed(_)) => {
                debug!(block, "stream consumer gone");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;
    use myolink_stream::{encode_data_packet, PacketHeader};
    use myolink_transport::MemoryTransport;

    fn data_packet(block: u8) -> BytesMut {
        let header = PacketHeader {
            schema_version: 0,
            block_number: block,
            source: EmgStreamSource::RawEmg,
            compression: CompressionType::ResLimit8Bit,
            timestamp: 0.0,
            conversion_factor: 1.0,
        };
        let mut buf = BytesMut::new();
        encode_data_packet(&header, &[1, 2], &mut buf).unwrap();
        buf
    }

    fn sink(capacity: usize) -> (StreamSink, mpsc::Receiver<StreamDataPacket>) {
        let (tx, rx) = mpsc::channel(capacity);
        let sink = StreamSink {
            tx,
            stats: Arc::new(Mutex::new(StreamStats::default())),
            last_block: Mutex::new(None),
        };
        (sink, rx)
    }

    #[test]
    fn sink_counts_gaps_with_wraparound() {
        let (sink, mut rx) = sink(8);
        for block in [254, 255, 0, 2] {
            sink.on_notification(&data_packet(block));
        }
        let stats = *lock(&sink.stats);
        assert_eq!(stats.decoded, 4);
        assert_eq!(stats.block_gaps, 1);
        assert_eq!(rx.try_recv().unwrap().block_number, 254);
    }

    #[test]
    fn sink_drops_newest_when_full() {
        let (sink, mut rx) = sink(1);
        sink.on_notification(&data_packet(1));
        sink.on_notification(&data_packet(2));
        sink.on_notification(&[0x00, 0x01]);

        let stats = *lock(&sink.stats);
        assert_eq!(stats.dropped, 1);
        assert_eq!(stats.malformed, 1);
        assert_eq!(rx.try_recv().unwrap().block_number, 1);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn start_requires_configuration() {
        let pod = MyoPod::new(Arc::new(MemoryTransport::new()), PodConfig::default());
        assert!(matches!(
            pod.start_stream().await,
            Err(StreamError::NotConfigured)
        ));
        assert_eq!(pod.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn stop_when_idle_writes_nothing() {
        let transport = MemoryTransport::new();
        let pod = MyoPod::new(Arc::new(transport.clone()), PodConfig::default());
        pod.stop_stream().await.unwrap();
        assert!(transport.events().is_empty());
    }

    #[tokio::test]
    async fn invalid_configuration_writes_nothing() {
        let transport = MemoryTransport::new();
        let pod = MyoPod::new(Arc::new(transport.clone()), PodConfig::default());
        let err = pod
            .configure_stream(EmgStreamSource::RawEmg, CompressionType::Int16, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, StreamError::Configuration(_)));
        assert!(transport.events().is_empty());
        assert_eq!(pod.state(), SessionState::Idle);
    }
}
