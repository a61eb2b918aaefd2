//! Manufacturer-data advertisement decoder for myolink devices.
//!
//! Hands and sensor pods broadcast a schema-versioned record in the
//! vendor-specific manufacturer data of their advertisements. [`decode`]
//! turns those bytes into a typed [`AdvertisingRecord`] before any
//! connection is made.

pub mod bitfield;
pub mod decode;
pub mod error;
pub mod types;

pub use bitfield::BitField;
pub use decode::{decode, decode_manufacturer_data, try_decode, VENDOR_ID};
pub use error::{AdvertError, Result};
pub use types::{
    AdvertisingReason, AdvertisingRecord, AssociationTrailer, Chirality, DeviceConfig,
    DeviceSpecific, DeviceType, HandClass, HandSize, HandSpecific, SensorSpecificV1,
    SensorSpecificV2, SensorSpecificV3, SensorType,
};
