//! GATT transport boundary for the myolink protocol stack.
//!
//! The protocol engine never talks to a Bluetooth adapter directly. It needs
//! exactly three primitives from whatever owns the connection:
//! - write bytes to a named characteristic
//! - read bytes from a named characteristic
//! - subscribe/unsubscribe a callback to notifications on a characteristic
//!
//! [`GattTransport`] captures those primitives. [`MemoryTransport`] is an
//! in-process device double used by tests and simulators.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{Result, TransportError};
pub use memory::{MemoryTransport, Responder, TransportEvent};
pub use traits::{
    Characteristic, GattTransport, NotificationHandler, CONTROL_SERVICE_UUID,
    DATA_STREAMING_SERVICE_UUID,
};
