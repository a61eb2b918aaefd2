use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::error::{Result, TransportError};
use crate::traits::{Characteristic, GattTransport, NotificationHandler};

/// Produces the notifications a simulated device emits in reaction to a write.
pub type Responder = Arc<dyn Fn(Characteristic, &[u8]) -> Vec<(Characteristic, Bytes)> + Send + Sync>;

/// One primitive invocation observed by a [`MemoryTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Write(Characteristic, Bytes),
    Read(Characteristic),
    Subscribe(Characteristic),
    Unsubscribe(Characteristic),
}

/// In-process transport that stands in for a connected device.
///
/// Records every primitive call, serves reads from a value table, and lets
/// the caller inject notifications. Clones share the same state.
#[derive(Clone, Default)]
pub struct MemoryTransport {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    events: Vec<TransportEvent>,
    values: HashMap<Characteristic, Bytes>,
    handlers: HashMap<Characteristic, NotificationHandler>,
    responder: Option<Responder>,
    fail_writes: bool,
    disconnected: bool,
}

impl MemoryTransport {
    /// Create an empty transport with no readable values and no responder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a responder that is consulted after every successful write.
    pub fn with_responder<F>(self, responder: F) -> Self
    where
        F: Fn(Characteristic, &[u8]) -> Vec<(Characteristic, Bytes)> + Send + Sync + 'static,
    {
        self.lock().responder = Some(Arc::new(responder));
        self
    }

    /// Set the value returned by reads of `characteristic`.
    pub fn set_value(&self, characteristic: Characteristic, value: impl Into<Bytes>) {
        self.lock().values.insert(characteristic, value.into());
    }

    /// Make subsequent writes fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Simulate link loss: every later primitive returns `Disconnected`.
    pub fn disconnect(&self) {
        let mut state = self.lock();
        state.disconnected = true;
        state.handlers.clear();
    }

    /// Deliver a notification to the subscribed handler, if any.
    ///
    /// Returns `true` if a handler observed the value.
    pub fn notify(&self, characteristic: Characteristic, data: &[u8]) -> bool {
        let handler = self.lock().handlers.get(&characteristic).cloned();
        match handler {
            Some(handler) => {
                handler(data);
                true
            }
            None => {
                debug!(%characteristic, len = data.len(), "notification dropped, no subscriber");
                false
            }
        }
    }

    /// Whether a handler is currently subscribed to `characteristic`.
    pub fn is_subscribed(&self, characteristic: Characteristic) -> bool {
        self.lock().handlers.contains_key(&characteristic)
    }

    /// Every primitive call observed so far, in order.
    pub fn events(&self) -> Vec<TransportEvent> {
        self.lock().events.clone()
    }

    /// Values written to `characteristic`, in order.
    pub fn writes_to(&self, characteristic: Characteristic) -> Vec<Bytes> {
        self.lock()
            .events
            .iter()
            .filter_map(|event| match event {
                TransportEvent::Write(c, data) if *c == characteristic => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    /// Forget recorded events.
    pub fn clear_events(&self) {
        self.lock().events.clear();
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_connected(state: &MemoryState) -> Result<()> {
        if state.disconnected {
            return Err(TransportError::Disconnected);
        }
        Ok(())
    }
}

#[async_trait]
impl GattTransport for MemoryTransport {
    async fn write(&self, characteristic: Characteristic, data: &[u8]) -> Result<()> {
        let responder = {
            let mut state = self.lock();
            Self::ensure_connected(&state)?;
            if state.fail_writes {
                return Err(TransportError::Write {
                    characteristic,
                    reason: "simulated write failure".to_string(),
                });
            }
            state
                .events
                .push(TransportEvent::Write(characteristic, Bytes::copy_from_slice(data)));
            state.responder.clone()
        };

        if let Some(responder) = responder {
            for (target, value) in responder(characteristic, data) {
                self.notify(target, &value);
            }
        }
        Ok(())
    }

    async fn read(&self, characteristic: Characteristic) -> Result<Bytes> {
        let mut state = self.lock();
        Self::ensure_connected(&state)?;
        state.events.push(TransportEvent::Read(characteristic));
        state
            .values
            .get(&characteristic)
            .cloned()
            .ok_or(TransportError::NotAvailable(characteristic))
    }

    async fn subscribe(
        &self,
        characteristic: Characteristic,
        handler: NotificationHandler,
    ) -> Result<()> {
        let mut state = self.lock();
        Self::ensure_connected(&state)?;
        state.events.push(TransportEvent::Subscribe(characteristic));
        state.handlers.insert(characteristic, handler);
        Ok(())
    }

    async fn unsubscribe(&self, characteristic: Characteristic) -> Result<()> {
        let mut state = self.lock();
        Self::ensure_connected(&state)?;
        state.events.push(TransportEvent::Unsubscribe(characteristic));
        state.handlers.remove(&characteristic);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn records_writes_in_order() {
        let transport = MemoryTransport::new();
        transport
            .write(Characteristic::Control, b"one")
            .await
            .unwrap();
        transport
            .write(Characteristic::StreamConfiguration, b"two")
            .await
            .unwrap();

        assert_eq!(
            transport.writes_to(Characteristic::Control),
            vec![Bytes::from_static(b"one")]
        );
        assert_eq!(transport.events().len(), 2);
    }

    #[tokio::test]
    async fn read_serves_configured_value() {
        let transport = MemoryTransport::new();
        transport.set_value(Characteristic::ReadOnlyConfiguration, vec![1, 2, 3]);

        let value = transport
            .read(Characteristic::ReadOnlyConfiguration)
            .await
            .unwrap();
        assert_eq!(value.as_ref(), &[1, 2, 3]);

        let err = transport.read(Characteristic::StreamData).await.unwrap_err();
        assert!(matches!(err, TransportError::NotAvailable(Characteristic::StreamData)));
    }

    #[tokio::test]
    async fn notify_reaches_subscriber_until_unsubscribed() {
        let transport = MemoryTransport::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        transport
            .subscribe(
                Characteristic::StreamData,
                Arc::new(move |data: &[u8]| {
                    counter.fetch_add(data.len(), Ordering::SeqCst);
                }),
            )
            .await
            .unwrap();

        assert!(transport.notify(Characteristic::StreamData, &[0; 4]));
        transport.unsubscribe(Characteristic::StreamData).await.unwrap();
        assert!(!transport.notify(Characteristic::StreamData, &[0; 4]));
        assert_eq!(seen.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn responder_notifications_follow_write() {
        let transport = MemoryTransport::new().with_responder(|characteristic, data| {
            vec![(characteristic, Bytes::copy_from_slice(data))]
        });
        let echoed = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&echoed);
        transport
            .subscribe(
                Characteristic::Control,
                Arc::new(move |data: &[u8]| sink.lock().unwrap().extend_from_slice(data)),
            )
            .await
            .unwrap();

        transport.write(Characteristic::Control, b"ping").await.unwrap();
        assert_eq!(echoed.lock().unwrap().as_slice(), b"ping");
    }

    #[tokio::test]
    async fn failures_and_disconnect_surface_as_errors() {
        let transport = MemoryTransport::new();
        transport.set_fail_writes(true);
        let err = transport
            .write(Characteristic::Control, b"x")
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Write { .. }));
        assert!(transport.events().is_empty());

        transport.disconnect();
        let err = transport.read(Characteristic::Control).await.unwrap_err();
        assert!(matches!(err, TransportError::Disconnected));
    }
}
