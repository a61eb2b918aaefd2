//! Telemetry stream codec for myolink sensor pods.
//!
//! A pod streams sample blocks on a notify-only characteristic. Each block
//! carries its own source/compression tag and conversion factor; this crate
//! builds the configuration writes that select a stream and decodes the
//! blocks back into physical units. Everything here is pure: no I/O.
//!
//! | Compression | Wire sample | Stride |
//! |---|---|---|
//! | `NONE` | f32 BE | 4 bytes / sample |
//! | `INT16` | i16 BE | 2 bytes / sample |
//! | `RES_LIMIT_8BIT` | i8 | 1 byte / sample |
//! | `BYTE_PACK_12BIT` | 12-bit two's complement | 6 bytes / 4 samples |

pub mod config;
pub mod error;
pub mod packet;
pub mod samples;
pub mod types;

pub use config::{
    build_configure_frame, ConfigureFrame, ReadOnlyConfiguration, StreamConfiguration,
    CONFIGURE_FRAME_SIZE, CONFIG_SCHEMA_VERSION, READ_ONLY_CONFIGURATION_SIZE,
    STREAM_CONFIGURATION_SIZE, SUPPORTED_STREAM_SCHEMA,
};
pub use error::{ConfigurationError, DecodeError, EncodeError, Result};
pub use packet::{
    decode_data_packet, encode_data_packet, PacketHeader, StreamDataPacket, DATA_HEADER_SIZE,
    DATA_SCHEMA_VERSION, MAX_DATA_PAYLOAD,
};
pub use samples::decode_samples;
pub use types::{
    pack_source_compression, unpack_source_compression, CompressionType, EmgStreamSource,
};
