use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};
use myolink_frame::{decode_f32_payload, GET_RELATIVE_HUMIDITY, SET_DIGIT_POSITIONS, SET_GRIP};
use myolink_transport::GattTransport;
use tracing::debug;

use crate::channel::{ChannelConfig, CommandChannel};
use crate::error::{CommandError, Result};

/// Leading payload byte of a set-digit-positions command.
pub const DIGIT_POSITIONS_SUBTYPE: u8 = 0x01;

/// A hand has five digits; each may appear once per command.
pub const MAX_DIGITS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Digit {
    Thumb = 0,
    Index = 1,
    Middle = 2,
    Ring = 3,
    Pinky = 4,
}

impl Digit {
    pub const ALL: [Digit; MAX_DIGITS] = [
        Digit::Thumb,
        Digit::Index,
        Digit::Middle,
        Digit::Ring,
        Digit::Pinky,
    ];

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(usize::from(id)).copied()
    }

    pub fn id(self) -> u8 {
        self as u8
    }
}

/// Predefined grips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Grip {
    Relax = 0,
    Point = 1,
    Hook = 2,
    Pinch = 3,
    Cylindrical = 4,
    Tripod = 5,
}

impl Grip {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::Relax),
            1 => Some(Self::Point),
            2 => Some(Self::Hook),
            3 => Some(Self::Pinch),
            4 => Some(Self::Cylindrical),
            5 => Some(Self::Tripod),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Relax => "RELAX",
            Self::Point => "POINT",
            Self::Hook => "HOOK",
            Self::Pinch => "PINCH",
            Self::Cylindrical => "CYLINDRICAL",
            Self::Tripod => "TRIPOD",
        }
    }
}

impl fmt::Display for Grip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Build a set-digit-positions payload.
///
/// Positions are clamped to `0.0..=1.0`. Empty input, unknown or repeated
/// digits and non-finite positions are rejected; with five distinct digits
/// that also bounds the payload to five entries.
pub fn encode_digit_positions<I>(positions: I) -> Result<Bytes>
where
    I: IntoIterator<Item = (u8, f32)>,
{
    let mut payload = BytesMut::with_capacity(1 + MAX_DIGITS * 5);
    payload.put_u8(DIGIT_POSITIONS_SUBTYPE);

    let mut seen = HashSet::new();
    for (id, position) in positions {
        let digit = Digit::from_id(id)
            .ok_or_else(|| CommandError::InvalidArgument(format!("unknown digit {id}")))?;
        if !seen.insert(digit) {
            return Err(CommandError::InvalidArgument(format!(
                "digit {id} given more than once"
            )));
        }
        if !position.is_finite() {
            return Err(CommandError::InvalidArgument(format!(
                "position for digit {id} is not finite"
            )));
        }
        payload.put_u8(digit.id());
        payload.put_f32(position.clamp(0.0, 1.0));
    }

    if seen.is_empty() {
        return Err(CommandError::InvalidArgument(
            "no digit positions given".to_string(),
        ));
    }
    Ok(payload.freeze())
}

/// Configuration for a [`Hand`].
#[derive(Debug, Clone)]
pub struct HandConfig {
    /// Deadline for request/response commands.
    pub request_timeout: Duration,
}

impl Default for HandConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_millis(4500),
        }
    }
}

/// A connected prosthetic hand.
#[derive(Debug, Clone)]
pub struct Hand {
    channel: CommandChannel,
    config: HandConfig,
}

impl Hand {
    /// Attach a command channel to `transport` and wrap it.
    pub async fn connect(transport: Arc<dyn GattTransport>, config: HandConfig) -> Result<Self> {
        let channel = CommandChannel::attach(transport, ChannelConfig::default()).await?;
        Ok(Self::new(channel, config))
    }

    pub fn new(channel: CommandChannel, config: HandConfig) -> Self {
        Self { channel, config }
    }

    pub fn channel(&self) -> &CommandChannel {
        &self.channel
    }

    /// Move one or more digits, given as `(digit id, position)` pairs.
    pub async fn set_digit_positions<I>(&self, positions: I) -> Result<()>
    where
        I: IntoIterator<Item = (u8, f32)>,
    {
        let payload = encode_digit_positions(positions)?;
        debug!(digits = (payload.len() - 1) / 5, "setting digit positions");
        self.channel.send_command(SET_DIGIT_POSITIONS, payload).await
    }

    pub async fn set_digit_position(&self, digit: Digit, position: f32) -> Result<()> {
        self.set_digit_positions([(digit.id(), position)]).await
    }

    pub async fn set_grip(&self, grip: Grip) -> Result<()> {
        debug!(%grip, "setting grip");
        self.channel.send_command(SET_GRIP, vec![grip.id()]).await
    }

    /// Relative humidity inside the hand, in percent.
    pub async fn get_relative_humidity(&self) -> Result<f32> {
        self.channel
            .send_request(
                GET_RELATIVE_HUMIDITY,
                Bytes::new(),
                Some(self.config.request_timeout),
                |payload| Ok(decode_f32_payload(payload)?),
            )
            .await
    }

    pub async fn close(&self) -> Result<()> {
        self.channel.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_positions() {
        let payload = encode_digit_positions([(0, 1.4), (1, -0.2)]).unwrap();
        let mut expected = vec![DIGIT_POSITIONS_SUBTYPE, 0];
        expected.extend_from_slice(&1.0f32.to_be_bytes());
        expected.push(1);
        expected.extend_from_slice(&0.0f32.to_be_bytes());
        assert_eq!(payload.as_ref(), expected.as_slice());
    }

    #[test]
    fn rejects_bad_input() {
        let cases: [Vec<(u8, f32)>; 4] = [
            vec![],
            vec![(5, 0.5)],
            vec![(2, 0.1), (2, 0.2)],
            vec![(3, f32::NAN)],
        ];
        for case in cases {
            let err = encode_digit_positions(case.clone()).unwrap_err();
            assert!(
                matches!(err, CommandError::InvalidArgument(_)),
                "{case:?}: {err:?}"
            );
        }
    }

    #[test]
    fn all_five_digits_fit() {
        let payload = encode_digit_positions(Digit::ALL.map(|d| (d.id(), 0.5))).unwrap();
        assert_eq!(payload.len(), 1 + 5 * 5);
    }

    #[test]
    fn ids_round_trip() {
        assert_eq!(Digit::from_id(4), Some(Digit::Pinky));
        assert_eq!(Digit::from_id(5), None);
        assert_eq!(Grip::from_id(5), Some(Grip::Tripod));
        assert_eq!(Grip::from_id(6), None);
        assert_eq!(Grip::Cylindrical.to_string(), "CYLINDRICAL");
    }
}
