//! Command channel and device sessions for myolink hands and sensor pods.
//!
//! This is the layer applications talk to. A [`CommandChannel`] correlates
//! control-characteristic responses with the request that caused them; a
//! [`Hand`] wraps one with typed commands; a [`MyoPod`] drives the stream
//! configuration lifecycle and hands decoded packets to a consumer.
//!
//! Nothing here owns a BLE stack: every type works against a
//! [`GattTransport`](myolink_transport::GattTransport).

pub mod channel;
pub mod error;
pub mod hand;
pub mod pod;

pub use channel::{ChannelConfig, ChannelStats, CommandChannel};
pub use error::{CommandError, Result, StreamError};
pub use hand::{encode_digit_positions, Digit, Grip, Hand, HandConfig, DIGIT_POSITIONS_SUBTYPE};
pub use pod::{MyoPod, PodConfig, SessionState, StreamStats};
