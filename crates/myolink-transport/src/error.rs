use crate::traits::Characteristic;

/// Errors reported by a GATT transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Writing to a characteristic failed.
    #[error("write to {characteristic} failed: {reason}")]
    Write {
        characteristic: Characteristic,
        reason: String,
    },

    /// Reading a characteristic failed.
    #[error("read of {characteristic} failed: {reason}")]
    Read {
        characteristic: Characteristic,
        reason: String,
    },

    /// Subscribing to or unsubscribing from notifications failed.
    #[error("notification setup on {characteristic} failed: {reason}")]
    Subscription {
        characteristic: Characteristic,
        reason: String,
    },

    /// The device exposes no such characteristic.
    #[error("characteristic {0} not available")]
    NotAvailable(Characteristic),

    /// The link to the device is gone.
    #[error("device disconnected")]
    Disconnected,
}

pub type Result<T> = std::result::Result<T, TransportError>;
