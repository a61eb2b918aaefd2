/// Malformed stream bytes. Always scoped to the single unit being decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Fewer bytes than the header or declared length requires.
    #[error("stream value truncated ({actual} bytes, need {needed})")]
    Truncated { needed: usize, actual: usize },

    /// The schema byte names a layout this codec does not know.
    #[error("unsupported stream schema {0}")]
    UnsupportedSchema(u8),

    /// The source nibble is not a known stream source.
    #[error("unknown stream source {0:#x}")]
    UnknownStreamSource(u8),

    /// The compression nibble is not a known compression type.
    #[error("unknown compression type {0:#x}")]
    UnknownCompression(u8),
}

/// Caller-input errors, raised before anything is written to the device.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// Averaging window outside 1-65535.
    #[error("average samples must be 1-65535, got {0}")]
    InvalidAverageSamples(u32),

    /// Requested stream schema is not one this codec can decode.
    #[error("unsupported stream schema {0}")]
    UnsupportedStreamSchema(u8),

    /// A stream is being decoded; stop it before reconfiguring.
    #[error("cannot configure while streaming")]
    StreamActive,
}

/// Errors building a data packet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// The payload does not fit the one-byte length field.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, DecodeError>;
