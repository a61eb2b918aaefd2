use bytes::{BufMut, Bytes, BytesMut};
use tracing::warn;

use crate::error::{FrameError, Result};
use crate::status::{ControlByte, ResponseStatus};

/// Frame header: schema (1) + command id (1) + control (1) + length (1) = 4 bytes.
pub const HEADER_SIZE: usize = 4;

/// Maximum payload size: one ATT notification (247 MTU) minus header.
pub const MAX_PAYLOAD: usize = 244;

/// Control schema version this codec emits.
pub const SCHEMA_VERSION: u8 = 0x00;

/// The fixed 4-byte header of a command frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub schema_version: u8,
    pub command_id: u8,
    pub control: ControlByte,
    /// Payload length as declared on the wire.
    pub data_length: u8,
}

impl FrameHeader {
    /// Parse the header from the front of `src`.
    pub fn parse(src: &[u8]) -> Result<Self> {
        if src.len() < HEADER_SIZE {
            return Err(FrameError::Truncated {
                needed: HEADER_SIZE,
                actual: src.len(),
            });
        }
        Ok(Self {
            schema_version: src[0],
            command_id: src[1],
            control: ControlByte::from_raw(src[2]),
            data_length: src[3],
        })
    }
}

/// A command frame with an owned payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFrame {
    pub schema_version: u8,
    pub command_id: u8,
    pub control: ControlByte,
    pub payload: Bytes,
}

impl CommandFrame {
    /// Build a request frame at the current schema version.
    pub fn request(command_id: u8, payload: impl Into<Bytes>) -> Result<Self> {
        Self::new(SCHEMA_VERSION, command_id, ControlByte::request(), payload)
    }

    /// Build a response frame at the current schema version.
    pub fn response(
        command_id: u8,
        status: ResponseStatus,
        payload: impl Into<Bytes>,
    ) -> Result<Self> {
        Self::new(
            SCHEMA_VERSION,
            command_id,
            ControlByte::response(status),
            payload,
        )
    }

    /// Build a frame, rejecting payloads that cannot be framed.
    pub fn new(
        schema_version: u8,
        command_id: u8,
        control: ControlByte,
        payload: impl Into<Bytes>,
    ) -> Result<Self> {
        let payload = payload.into();
        if payload.len() > MAX_PAYLOAD {
            return Err(FrameError::PayloadTooLarge {
                size: payload.len(),
                max: MAX_PAYLOAD,
            });
        }
        Ok(Self {
            schema_version,
            command_id,
            control,
            payload,
        })
    }

    /// The length byte this frame carries on the wire.
    pub fn data_length(&self) -> u8 {
        // Bounded by MAX_PAYLOAD at construction.
        self.payload.len() as u8
    }

    /// The total wire size of this frame (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }

    /// Encode into a fresh buffer.
    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut dst = BytesMut::with_capacity(self.wire_size());
        encode_frame(self, &mut dst)?;
        Ok(dst.freeze())
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────┬────────────┬──────────────┬──────────┬──────────────────┐
/// │ Schema   │ Command ID │ Control      │ Length   │ Payload          │
/// │ (1B)     │ (1B)       │ (1B)         │ (1B)     │ (Length bytes)   │
/// │          │            │ b7 = request │          │ big-endian       │
/// │          │            │ b0-2 status  │          │ fields           │
/// └──────────┴────────────┴──────────────┴──────────┴──────────────────┘
/// ```
pub fn encode_frame(frame: &CommandFrame, dst: &mut BytesMut) -> Result<()> {
    if frame.payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: frame.payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    dst.reserve(frame.wire_size());
    dst.put_u8(frame.schema_version);
    dst.put_u8(frame.command_id);
    dst.put_u8(frame.control.raw());
    dst.put_u8(frame.data_length());
    dst.put_slice(&frame.payload);
    Ok(())
}

/// A frame as received, before the declared length is reconciled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub header: FrameHeader,
    /// Every byte after the header, regardless of the declared length.
    pub payload: Bytes,
}

impl DecodedFrame {
    /// Whether the declared length matches the bytes actually received.
    pub fn length_matches(&self) -> bool {
        self.header.data_length as usize == self.payload.len()
    }
}

/// Decode a complete notification value into header + payload.
///
/// A declared length that disagrees with the received payload is reported
/// as a warning only; callers decide via [`DecodedFrame::length_matches`].
pub fn decode_frame(src: &[u8]) -> Result<DecodedFrame> {
    let header = FrameHeader::parse(src)?;
    let payload = Bytes::copy_from_slice(&src[HEADER_SIZE..]);
    let frame = DecodedFrame { header, payload };
    if !frame.length_matches() {
        warn!(
            command_id = header.command_id,
            declared = header.data_length,
            actual = frame.payload.len(),
            "frame length mismatch"
        );
    }
    Ok(frame)
}

/// Decode a payload that is exactly one big-endian IEEE-754 f32.
pub fn decode_f32_payload(payload: &[u8]) -> Result<f32> {
    let raw: [u8; 4] = payload
        .try_into()
        .map_err(|_| FrameError::UnexpectedPayload {
            expected: 4,
            actual: payload.len(),
        })?;
    Ok(f32::from_be_bytes(raw))
}
