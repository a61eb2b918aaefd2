use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use myolink_frame::{
    command_name, decode_frame, is_fire_and_forget, CommandFrame, ControlByte, ResponseStatus,
};
use myolink_transport::{Characteristic, GattTransport, NotificationHandler};
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{CommandError, Result};

/// Configuration for a command channel.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Schema byte stamped on every request.
    pub schema_version: u8,
    /// Deadline used when a request does not pass its own.
    pub default_timeout: Duration,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            schema_version: myolink_frame::SCHEMA_VERSION,
            default_timeout: Duration::from_secs(5),
        }
    }
}

/// Counters for notifications that did not resolve a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStats {
    /// Responses that resolved a pending request.
    pub responses: u64,
    /// Responses for a command with nothing pending.
    pub unsolicited: u64,
    /// Notifications too short to carry a header.
    pub malformed: u64,
    /// Request frames sent by the device; this side never serves them.
    pub ignored_requests: u64,
    /// Requests that hit their deadline.
    pub timeouts: u64,
}

struct PendingRequest {
    ticket: u64,
    created_at: Instant,
    resolver: oneshot::Sender<Result<Bytes>>,
}

struct Inner {
    transport: Arc<dyn GattTransport>,
    config: ChannelConfig,
    pending: Mutex<HashMap<u8, PendingRequest>>,
    stats: Mutex<ChannelStats>,
    next_ticket: AtomicU64,
    closed: AtomicBool,
}

/// Request/response correlation over the control characteristic.
///
/// At most one request per command id is outstanding; responses are matched
/// to it by command id alone. Distinct command ids run concurrently.
/// Clones share the same pending table.
#[derive(Clone)]
pub struct CommandChannel {
    inner: Arc<Inner>,
}

impl CommandChannel {
    /// Subscribe to the control characteristic and start correlating responses.
    pub async fn attach(transport: Arc<dyn GattTransport>, config: ChannelConfig) -> Result<Self> {
        let inner = Arc::new(Inner {
            transport,
            config,
            pending: Mutex::new(HashMap::new()),
            stats: Mutex::new(ChannelStats::default()),
            next_ticket: AtomicU64::new(1),
            closed: AtomicBool::new(false),
        });

        let weak = Arc::downgrade(&inner);
        let handler: NotificationHandler = Arc::new(move |data: &[u8]| {
            if let Some(inner) = weak.upgrade() {
                inner.on_notification(data);
            }
        });
        inner
            .transport
            .subscribe(Characteristic::Control, handler)
            .await?;
        debug!(
            schema = inner.config.schema_version,
            timeout = ?inner.config.default_timeout,
            "command channel attached"
        );
        Ok(Self { inner })
    }

    /// Send a request and await its response, decoding the payload with `decode`.
    ///
    /// The pending slot is registered before the frame is written, so a
    /// response delivered during the write still resolves it. Dropping the
    /// returned future releases the slot. Fire-and-forget command ids are
    /// rejected with [`CommandError::InvalidArgument`] before anything is sent.
    pub async fn send_request<T, F>(
        &self,
        command_id: u8,
        payload: impl Into<Bytes>,
        timeout: Option<Duration>,
        decode: F,
    ) -> Result<T>
    where
        F: FnOnce(&[u8]) -> Result<T>,
    {
        self.ensure_open()?;
        if is_fire_and_forget(command_id) {
            return Err(CommandError::InvalidArgument(format!(
                "{} ({command_id:#04x}) has no response, use send_command",
                command_name(command_id)
            )));
        }
        let wire = self.request_frame(command_id, payload)?;
        let timeout = timeout.unwrap_or(self.inner.config.default_timeout);

        let (tx, rx) = oneshot::channel();
        let ticket = self.inner.next_ticket.fetch_add(1, Ordering::Relaxed);
        self.inner.register(command_id, ticket, tx)?;
        let _slot = SlotGuard {
            inner: &self.inner,
            command_id,
            ticket,
        };

        debug!(
            command = command_name(command_id),
            command_id,
            len = wire.len(),
            "sending request"
        );
        self.inner
            .transport
            .write(Characteristic::Control, &wire)
            .await?;

        let payload = match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(result)) => result?,
            Ok(Err(_)) => return Err(CommandError::Closed),
            Err(_) => {
                self.inner.lock_stats().timeouts += 1;
                warn!(
                    command = command_name(command_id),
                    command_id,
                    ?timeout,
                    "request timed out"
                );
                return Err(CommandError::Timeout(timeout));
            }
        };
        decode(&payload)
    }

    /// Write a command that expects no response.
    pub async fn send_command(&self, command_id: u8, payload: impl Into<Bytes>) -> Result<()> {
        self.ensure_open()?;
        let wire = self.request_frame(command_id, payload)?;
        debug!(
            command = command_name(command_id),
            command_id,
            len = wire.len(),
            "sending command"
        );
        self.inner
            .transport
            .write(Characteristic::Control, &wire)
            .await?;
        Ok(())
    }

    /// Feed one control notification to the correlator.
    ///
    /// Called by the transport's notification handler; exposed for transports
    /// that deliver notifications by other means. Never blocks.
    pub fn on_notification(&self, data: &[u8]) {
        self.inner.on_notification(data);
    }

    /// Command ids with a request outstanding, ascending.
    pub fn pending_commands(&self) -> Vec<u8> {
        let mut ids: Vec<u8> = self.inner.lock_pending().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn stats(&self) -> ChannelStats {
        *self.inner.lock_stats()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Fail every pending request with [`CommandError::Closed`] and unsubscribe.
    pub async fn close(&self) -> Result<()> {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let drained: Vec<(u8, PendingRequest)> = self.inner.lock_pending().drain().collect();
        for (command_id, request) in drained {
            debug!(command_id, "failing pending request on close");
            let _ = request.resolver.send(Err(CommandError::Closed));
        }
        self.inner
            .transport
            .unsubscribe(Characteristic::Control)
            .await?;
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(CommandError::Closed);
        }
        Ok(())
    }

    fn request_frame(&self, command_id: u8, payload: impl Into<Bytes>) -> Result<Bytes> {
        let frame = CommandFrame::new(
            self.inner.config.schema_version,
            command_id,
            ControlByte::request(),
            payload,
        )?;
        Ok(frame.to_bytes()?)
    }
}

impl std::fmt::Debug for CommandChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandChannel")
            .field("config", &self.inner.config)
            .field("pending", &self.pending_commands())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Inner {
    fn lock_pending(&self) -> MutexGuard<'_, HashMap<u8, PendingRequest>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_stats(&self) -> MutexGuard<'_, ChannelStats> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a pending slot. The closed flag is checked under the table lock
    /// so a slot can never land after `close` has drained the table.
    fn register(
        &self,
        command_id: u8,
        ticket: u64,
        resolver: oneshot::Sender<Result<Bytes>>,
    ) -> Result<()> {
        let mut pending = self.lock_pending();
        if self.closed.load(Ordering::Acquire) {
            return Err(CommandError::Closed);
        }
        if pending.contains_key(&command_id) {
            return Err(CommandError::AlreadyInFlight(command_id));
        }
        pending.insert(
            command_id,
            PendingRequest {
                ticket,
                created_at: Instant::now(),
                resolver,
            },
        );
        Ok(())
    }

    fn on_notification(&self, data: &[u8]) {
        let frame = match decode_frame(data) {
            Ok(frame) => frame,
            Err(err) => {
                self.lock_stats().malformed += 1;
                warn!(error = %err, len = data.len(), "malformed control notification");
                return;
            }
        };
        let header = frame.header;
        if header.control.is_request() {
            self.lock_stats().ignored_requests += 1;
            debug!(command_id = header.command_id, "ignoring request frame from device");
            return;
        }

        let Some(request) = self.lock_pending().remove(&header.command_id) else {
            self.lock_stats().unsolicited += 1;
            info!(
                command = command_name(header.command_id),
                command_id = header.command_id,
                "unsolicited response"
            );
            return;
        };
        self.lock_stats().responses += 1;

        let result = match header.control.status() {
            Some(ResponseStatus::Success) if !frame.length_matches() => {
                Err(CommandError::LengthMismatch {
                    declared: header.data_length,
                    actual: frame.payload.len(),
                })
            }
            Some(ResponseStatus::Success) => Ok(frame.payload),
            Some(status) => Err(CommandError::DeviceRejected {
                command_id: header.command_id,
                status,
            }),
            None => Err(CommandError::UnknownStatus {
                command_id: header.command_id,
                code: header.control.status_code(),
            }),
        };
        debug!(
            command = command_name(header.command_id),
            command_id = header.command_id,
            ok = result.is_ok(),
            elapsed = ?request.created_at.elapsed(),
            "response received"
        );
        // Receiver may already be gone if the caller was cancelled.
        let _ = request.resolver.send(result);
    }
}

/// Releases a pending slot when its request future finishes or is dropped.
///
/// Only the slot registered under the same ticket is removed, so a stale
/// guard never evicts a newer request for the same command id.
struct SlotGuard<'a> {
    inner: &'a Inner,
    command_id: u8,
    ticket: u64,
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        let mut pending = self.inner.lock_pending();
        if pending
            .get(&self.command_id)
            .is_some_and(|request| request.ticket == self.ticket)
        {
            pending.remove(&self.command_id);
        }
    }
}
