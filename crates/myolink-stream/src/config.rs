//! Stream configuration values.
//!
//! A configure write selects the source, compression and averaging window;
//! reading the same characteristic back adds the device's native sample rate
//! and the conversion factor it will stamp on each data packet.

use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;

use crate::error::{ConfigurationError, DecodeError, Result};
use crate::types::{
    pack_source_compression, unpack_source_compression, CompressionType, EmgStreamSource,
};

/// Configuration schema this codec emits and accepts.
pub const CONFIG_SCHEMA_VERSION: u8 = 0;

/// Stream (data packet) schema this codec can decode.
pub const SUPPORTED_STREAM_SCHEMA: u8 = 0;

/// schema + average (2) + src/comp + stream schema.
pub const CONFIGURE_FRAME_SIZE: usize = 5;

/// Configure fields + native rate (2) + conversion factor (4).
pub const STREAM_CONFIGURATION_SIZE: usize = 11;

/// schema + max editable + max stream + service version + sync timestamp (4).
pub const READ_ONLY_CONFIGURATION_SIZE: usize = 8;

/// The value written to the stream configuration characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConfigureFrame {
    pub schema_version: u8,
    pub average_samples: u16,
    pub source: EmgStreamSource,
    pub compression: CompressionType,
    pub stream_schema: u8,
}

impl ConfigureFrame {
    /// A configuration that turns streaming off.
    pub fn stop() -> Self {
        Self {
            schema_version: CONFIG_SCHEMA_VERSION,
            average_samples: 1,
            source: EmgStreamSource::None,
            compression: CompressionType::None,
            stream_schema: SUPPORTED_STREAM_SCHEMA,
        }
    }

    pub fn is_stop(&self) -> bool {
        self.source == EmgStreamSource::None
    }

    pub fn encode(&self, dst: &mut BytesMut) {
        dst.reserve(CONFIGURE_FRAME_SIZE);
        dst.put_u8(self.schema_version);
        dst.put_u16(self.average_samples);
        dst.put_u8(pack_source_compression(self.source, self.compression));
        dst.put_u8(self.stream_schema);
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut dst = BytesMut::with_capacity(CONFIGURE_FRAME_SIZE);
        self.encode(&mut dst);
        dst.freeze()
    }
}

/// Validate caller input and build the configure value.
///
/// Nothing is written here; a rejected configuration never reaches the device.
pub fn build_configure_frame(
    source: EmgStreamSource,
    compression: CompressionType,
    average_samples: u32,
    stream_schema: u8,
) -> std::result::Result<ConfigureFrame, ConfigurationError> {
    let average_samples = u16::try_from(average_samples)
        .ok()
        .filter(|n| *n >= 1)
        .ok_or(ConfigurationError::InvalidAverageSamples(average_samples))?;
    if stream_schema != SUPPORTED_STREAM_SCHEMA {
        return Err(ConfigurationError::UnsupportedStreamSchema(stream_schema));
    }
    Ok(ConfigureFrame {
        schema_version: CONFIG_SCHEMA_VERSION,
        average_samples,
        source,
        compression,
        stream_schema,
    })
}

fn check_len(raw: &[u8], needed: usize) -> Result<()> {
    if raw.len() < needed {
        return Err(DecodeError::Truncated {
            needed,
            actual: raw.len(),
        });
    }
    Ok(())
}

/// The stream configuration as read back from the device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StreamConfiguration {
    pub schema_version: u8,
    pub average_samples: u16,
    pub active_stream_source: EmgStreamSource,
    pub compression_type: CompressionType,
    pub data_stream_schema: u8,
    pub native_sample_rate_hz: u16,
    pub conversion_factor: f32,
}

impl StreamConfiguration {
    pub fn decode(raw: &[u8]) -> Result<Self> {
        check_len(raw, STREAM_CONFIGURATION_SIZE)?;
        let schema_version = raw[0];
        if schema_version != CONFIG_SCHEMA_VERSION {
            return Err(DecodeError::UnsupportedSchema(schema_version));
        }
        let (active_stream_source, compression_type) = unpack_source_compression(raw[3])?;
        Ok(Self {
            schema_version,
            average_samples: u16::from_be_bytes([raw[1], raw[2]]),
            active_stream_source,
            compression_type,
            data_stream_schema: raw[4],
            native_sample_rate_hz: u16::from_be_bytes([raw[5], raw[6]]),
            conversion_factor: f32::from_be_bytes([raw[7], raw[8], raw[9], raw[10]]),
        })
    }

    /// Samples per second after on-device averaging.
    pub fn effective_sample_rate_hz(&self) -> f32 {
        f32::from(self.native_sample_rate_hz) / f32::from(self.average_samples.max(1))
    }

    pub fn is_streaming(&self) -> bool {
        self.active_stream_source != EmgStreamSource::None
    }

    /// The configure fields of this configuration.
    pub fn configure_frame(&self) -> ConfigureFrame {
        ConfigureFrame {
            schema_version: self.schema_version,
            average_samples: self.average_samples,
            source: self.active_stream_source,
            compression: self.compression_type,
            stream_schema: self.data_stream_schema,
        }
    }

    pub fn encode(&self, dst: &mut BytesMut) {
        self.configure_frame().encode(dst);
        dst.put_u16(self.native_sample_rate_hz);
        dst.put_f32(self.conversion_factor);
    }
}

/// Fixed facts about the pod's streaming service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReadOnlyConfiguration {
    pub schema_version: u8,
    pub max_editable_schema: u8,
    pub max_stream_schema: u8,
    pub service_version: u8,
    pub sync_timestamp: f32,
}

impl ReadOnlyConfiguration {
    pub fn decode(raw: &[u8]) -> Result<Self> {
        check_len(raw, READ_ONLY_CONFIGURATION_SIZE)?;
        Ok(Self {
            schema_version: raw[0],
            max_editable_schema: raw[1],
            max_stream_schema: raw[2],
            service_version: raw[3],
            sync_timestamp: f32::from_be_bytes([raw[4], raw[5], raw[6], raw[7]]),
        })
    }

    pub fn encode(&self, dst: &mut BytesMut) {
        dst.put_u8(self.schema_version);
        dst.put_u8(self.max_editable_schema);
        dst.put_u8(self.max_stream_schema);
        dst.put_u8(self.service_version);
        dst.put_f32(self.sync_timestamp);
    }
}
