use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// Hand control service.
pub const CONTROL_SERVICE_UUID: &str = "0B0B4000-FEED-DEAD-BEE5-0BE9B1091C50";

/// Sensor pod data-streaming service.
pub const DATA_STREAMING_SERVICE_UUID: &str = "0B0B3000-FEED-DEAD-BEE5-0BE9B1091C50";

/// Callback invoked with the raw value of every inbound notification.
///
/// Runs on the transport's notification-delivery path, so it must not block.
pub type NotificationHandler = Arc<dyn Fn(&[u8]) + Send + Sync>;

/// The characteristics the protocol engine addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Characteristic {
    /// Command/response channel (write + notify).
    Control,
    /// Read-only device configuration (read).
    ReadOnlyConfiguration,
    /// Editable stream configuration (read + write + notify).
    StreamConfiguration,
    /// Telemetry sample blocks (notify).
    StreamData,
}

impl Characteristic {
    /// The 128-bit UUID of this characteristic.
    pub fn uuid(self) -> &'static str {
        match self {
            Characteristic::Control => "0B0B4102-FEED-DEAD-BEE5-0BE9B1091C50",
            Characteristic::ReadOnlyConfiguration => "0B0B3101-FEED-DEAD-BEE5-0BE9B1091C50",
            Characteristic::StreamConfiguration => "0B0B3102-FEED-DEAD-BEE5-0BE9B1091C50",
            Characteristic::StreamData => "0B0B3103-FEED-DEAD-BEE5-0BE9B1091C50",
        }
    }

    /// The service this characteristic belongs to.
    pub fn service_uuid(self) -> &'static str {
        match self {
            Characteristic::Control => CONTROL_SERVICE_UUID,
            _ => DATA_STREAMING_SERVICE_UUID,
        }
    }

    /// Look up a characteristic by UUID (case-insensitive).
    pub fn from_uuid(uuid: &str) -> Option<Self> {
        [
            Characteristic::Control,
            Characteristic::ReadOnlyConfiguration,
            Characteristic::StreamConfiguration,
            Characteristic::StreamData,
        ]
        .into_iter()
        .find(|c| c.uuid().eq_ignore_ascii_case(uuid))
    }

    /// Short human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Characteristic::Control => "control",
            Characteristic::ReadOnlyConfiguration => "read-only-configuration",
            Characteristic::StreamConfiguration => "stream-configuration",
            Characteristic::StreamData => "stream-data",
        }
    }
}

impl fmt::Display for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The three primitives the protocol engine consumes from a BLE connection.
///
/// Implementations own adapter management, connection lifecycle and GATT
/// discovery. Each connected device gets its own transport instance.
#[async_trait]
pub trait GattTransport: Send + Sync {
    /// Write a value to a characteristic (write-without-response is fine).
    async fn write(&self, characteristic: Characteristic, data: &[u8]) -> Result<()>;

    /// Read the current value of a characteristic.
    async fn read(&self, characteristic: Characteristic) -> Result<Bytes>;

    /// Start delivering notifications on `characteristic` to `handler`.
    ///
    /// Subscribing again replaces the previous handler.
    async fn subscribe(
        &self,
        characteristic: Characteristic,
        handler: NotificationHandler,
    ) -> Result<()>;

    /// Stop delivering notifications on `characteristic`.
    async fn unsubscribe(&self, characteristic: Characteristic) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_lookup_roundtrips() {
        for c in [
            Characteristic::Control,
            Characteristic::ReadOnlyConfiguration,
            Characteristic::StreamConfiguration,
            Characteristic::StreamData,
        ] {
            assert_eq!(Characteristic::from_uuid(c.uuid()), Some(c));
        }
    }

    #[test]
    fn uuid_lookup_ignores_case() {
        let lower = Characteristic::Control.uuid().to_ascii_lowercase();
        assert_eq!(
            Characteristic::from_uuid(&lower),
            Some(Characteristic::Control)
        );
        assert_eq!(Characteristic::from_uuid("not-a-uuid"), None);
    }

    #[test]
    fn services_match_characteristics() {
        assert_eq!(
            Characteristic::Control.service_uuid(),
            CONTROL_SERVICE_UUID
        );
        assert_eq!(
            Characteristic::StreamData.service_uuid(),
            DATA_STREAMING_SERVICE_UUID
        );
    }
}
