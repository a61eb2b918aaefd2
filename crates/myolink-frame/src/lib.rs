//! Command frame codec for the myolink control channel.
//!
//! Every control-channel message, in both directions, is framed with a fixed
//! 4-byte header:
//! - schema version
//! - command id
//! - control/status byte (request flag + 3-bit response status)
//! - payload length
//!
//! followed by at most [`MAX_PAYLOAD`] payload bytes. Multi-byte payload
//! fields are big-endian.

pub mod codec;
pub mod command;
pub mod error;
pub mod status;

pub use codec::{
    decode_f32_payload, decode_frame, encode_frame, CommandFrame, DecodedFrame, FrameHeader,
    HEADER_SIZE, MAX_PAYLOAD, SCHEMA_VERSION,
};
pub use command::{
    command_name, is_fire_and_forget, GET_RELATIVE_HUMIDITY, SET_DIGIT_POSITIONS, SET_GRIP,
};
pub use error::{FrameError, Result};
pub use status::{ControlByte, ResponseStatus};
