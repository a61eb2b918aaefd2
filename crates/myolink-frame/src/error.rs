/// Errors that can occur during command frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Fewer bytes than the fixed layout requires.
    #[error("frame truncated ({actual} bytes, need {needed})")]
    Truncated { needed: usize, actual: usize },

    /// The payload exceeds what the one-byte length field and ATT MTU allow.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// A response payload does not have the size its command defines.
    #[error("unexpected payload size ({actual} bytes, expected {expected})")]
    UnexpectedPayload { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
