use bytes::{BufMut, BytesMut};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{DecodeError, EncodeError, Result};
use crate::samples::decode_samples;
use crate::types::{
    pack_source_compression, unpack_source_compression, CompressionType, EmgStreamSource,
};

/// schema (1) + block (1) + src/comp (1) + timestamp (4) + factor (4) + length (1).
pub const DATA_HEADER_SIZE: usize = 12;

/// The only data packet schema this codec understands.
pub const DATA_SCHEMA_VERSION: u8 = 0;

/// Largest payload the one-byte length field can declare.
pub const MAX_DATA_PAYLOAD: usize = u8::MAX as usize;

/// The fixed part of a data packet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PacketHeader {
    pub schema_version: u8,
    pub block_number: u8,
    pub source: EmgStreamSource,
    pub compression: CompressionType,
    pub timestamp: f32,
    pub conversion_factor: f32,
}

/// One decoded block of samples, already scaled into physical units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamDataPacket {
    pub schema_version: u8,
    /// Wrapping 8-bit block counter.
    pub block_number: u8,
    pub active_stream_source: EmgStreamSource,
    pub compression_type: CompressionType,
    pub timestamp: f32,
    pub conversion_factor: f32,
    pub data_points: Vec<f64>,
}

impl StreamDataPacket {
    pub fn header(&self) -> PacketHeader {
        PacketHeader {
            schema_version: self.schema_version,
            block_number: self.block_number,
            source: self.active_stream_source,
            compression: self.compression_type,
            timestamp: self.timestamp,
            conversion_factor: self.conversion_factor,
        }
    }
}

/// Decode one stream data notification.
///
/// Wire format:
/// ```text
/// ┌────────┬───────┬─────────┬───────────┬────────────┬────────┬─────────────┐
/// │ Schema │ Block │ Src|Cmp │ Timestamp │ Conversion │ Length │ Payload     │
/// │ (1B)   │ (1B)  │ (1B)    │ (f32 BE)  │ (f32 BE)   │ (1B)   │ (Length B)  │
/// └────────┴───────┴─────────┴───────────┴────────────┴────────┴─────────────┘
/// ```
///
/// A payload that is not a whole number of sample groups is decoded up to
/// the last complete group.
pub fn decode_data_packet(raw: &[u8]) -> Result<StreamDataPacket> {
    if raw.len() < DATA_HEADER_SIZE {
        return Err(DecodeError::Truncated {
            needed: DATA_HEADER_SIZE,
            actual: raw.len(),
        });
    }
    let schema_version = raw[0];
    if schema_version != DATA_SCHEMA_VERSION {
        return Err(DecodeError::UnsupportedSchema(schema_version));
    }
    let block_number = raw[1];
    let (source, compression) = unpack_source_compression(raw[2])?;
    let timestamp = f32::from_be_bytes([raw[3], raw[4], raw[5], raw[6]]);
    let conversion_factor = f32::from_be_bytes([raw[7], raw[8], raw[9], raw[10]]);
    let declared = usize::from(raw[11]);

    let needed = DATA_HEADER_SIZE + declared;
    if raw.len() < needed {
        return Err(DecodeError::Truncated {
            needed,
            actual: raw.len(),
        });
    }
    if raw.len() > needed {
        debug!(
            block = block_number,
            extra = raw.len() - needed,
            "ignoring bytes past declared length"
        );
    }

    let payload = &raw[DATA_HEADER_SIZE..needed];
    let (group_bytes, _) = compression.stride();
    if payload.len() % group_bytes != 0 {
        warn!(
            block = block_number,
            compression = %compression,
            len = payload.len(),
            stride = group_bytes,
            "payload not a multiple of sample stride; trailing bytes dropped"
        );
    }

    Ok(StreamDataPacket {
        schema_version,
        block_number,
        active_stream_source: source,
        compression_type: compression,
        timestamp,
        conversion_factor,
        data_points: decode_samples(compression, payload, conversion_factor),
    })
}

/// Encode a data packet from a header and an already-packed payload.
pub fn encode_data_packet(
    header: &PacketHeader,
    payload: &[u8],
    dst: &mut BytesMut,
) -> std::result::Result<(), EncodeError> {
    if payload.len() > MAX_DATA_PAYLOAD {
        return Err(EncodeError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_DATA_PAYLOAD,
        });
    }
    dst.reserve(DATA_HEADER_SIZE + payload.len());
    dst.put_u8(header.schema_version);
    dst.put_u8(header.block_number);
    dst.put_u8(pack_source_compression(header.source, header.compression));
    dst.put_f32(header.timestamp);
    dst.put_f32(header.conversion_factor);
    dst.put_u8(payload.len() as u8);
    dst.put_slice(payload);
    Ok(())
}
