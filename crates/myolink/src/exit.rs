use std::fmt;

use myolink_advert::AdvertError;
use myolink_frame::FrameError;
use myolink_peer::CommandError;
use myolink_stream::{ConfigurationError, DecodeError};

pub const SUCCESS: i32 = 0;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn hex_error(context: &str, err: hex::FromHexError) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: invalid hex: {err}"))
}

pub fn advert_error(context: &str, err: AdvertError) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::PayloadTooLarge { .. } => CliError::new(USAGE, format!("{context}: {err}")),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

pub fn decode_error(context: &str, err: DecodeError) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

pub fn configuration_error(context: &str, err: ConfigurationError) -> CliError {
    CliError::new(USAGE, format!("{context}: {err}"))
}

pub fn command_error(context: &str, err: CommandError) -> CliError {
    match err {
        CommandError::InvalidArgument(_) => CliError::new(USAGE, format!("{context}: {err}")),
        CommandError::Frame(err) => frame_error(context, err),
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}
