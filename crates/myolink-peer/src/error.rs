use std::time::Duration;

use myolink_frame::ResponseStatus;

/// Errors from a single command exchange.
///
/// Each error resolves exactly one request; the channel stays usable.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// No response arrived before the deadline.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// A request with the same command id is still awaiting its response.
    #[error("command {0:#04x} already in flight")]
    AlreadyInFlight(u8),

    /// The device answered with a non-success status.
    #[error("device rejected command {command_id:#04x}: {status}")]
    DeviceRejected {
        command_id: u8,
        status: ResponseStatus,
    },

    /// The device answered with a status code outside the known set.
    #[error("device returned unknown status {code} for command {command_id:#04x}")]
    UnknownStatus { command_id: u8, code: u8 },

    /// The response header's length disagrees with the bytes received.
    #[error("response length mismatch (declared {declared}, received {actual})")]
    LengthMismatch { declared: u8, actual: usize },

    /// Caller input rejected before anything was written.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] myolink_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] myolink_frame::FrameError),

    /// The channel was closed while the request was pending.
    #[error("command channel closed")]
    Closed,
}

/// Errors from a sensor pod stream session.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// Caller input rejected before anything was written.
    #[error("configuration error: {0}")]
    Configuration(#[from] myolink_stream::ConfigurationError),

    /// A configuration value read from the device was malformed.
    #[error("decode error: {0}")]
    Decode(#[from] myolink_stream::DecodeError),

    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] myolink_transport::TransportError),

    /// `start_stream` called while already streaming.
    #[error("stream already active")]
    AlreadyStreaming,

    /// `start_stream` called with no active source configured.
    #[error("no stream source configured")]
    NotConfigured,
}

pub type Result<T> = std::result::Result<T, CommandError>;
