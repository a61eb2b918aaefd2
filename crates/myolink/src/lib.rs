//! Client-side protocol stack for myolink BLE hands and EMG sensor pods.
//!
//! The BLE link itself is left to the host application; this crate covers
//! everything above it: advertisement decoding, the control-channel command
//! protocol, and the EMG telemetry stream codec.
//!
//! # Crate Structure
//!
//! - [`transport`] - GATT transport boundary and an in-memory transport
//! - [`frame`] - Command frame codec for the control characteristic
//! - [`advert`] - Manufacturer-data advertisement decoder
//! - [`stream`] - Stream configuration and data packet codec
//! - [`peer`] - Command channel, `Hand` and `MyoPod` sessions (behind `peer` feature)

/// Re-export transport types.
pub mod transport {
    pub use myolink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use myolink_frame::*;
}

/// Re-export advertisement types.
pub mod advert {
    pub use myolink_advert::*;
}

/// Re-export stream codec types.
pub mod stream {
    pub use myolink_stream::*;
}

/// Re-export peer types (requires `peer` feature).
#[cfg(feature = "peer")]
pub mod peer {
    pub use myolink_peer::*;
}
