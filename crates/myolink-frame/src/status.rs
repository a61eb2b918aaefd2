use std::fmt;

/// Status a device reports in the low three bits of a response's control byte.
///
/// Code 7 is unassigned; [`ResponseStatus::from_code`] returns `None` for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ResponseStatus {
    Success = 0,
    UnknownCommand = 1,
    UnsupportedSchema = 2,
    InvalidLength = 3,
    InvalidParameter = 4,
    Busy = 5,
    InternalError = 6,
}

impl ResponseStatus {
    /// Map a raw 3-bit status code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::UnknownCommand),
            2 => Some(Self::UnsupportedSchema),
            3 => Some(Self::InvalidLength),
            4 => Some(Self::InvalidParameter),
            5 => Some(Self::Busy),
            6 => Some(Self::InternalError),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn is_success(self) -> bool {
        self == Self::Success
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::UnknownCommand => "UNKNOWN_COMMAND",
            Self::UnsupportedSchema => "UNSUPPORTED_SCHEMA",
            Self::InvalidLength => "INVALID_LENGTH",
            Self::InvalidParameter => "INVALID_PARAMETER",
            Self::Busy => "BUSY",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

/// The third header byte: bit 7 marks a request, bits 0-2 carry the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlByte(u8);

impl ControlByte {
    pub const REQUEST_FLAG: u8 = 0x80;
    pub const STATUS_MASK: u8 = 0x07;

    /// Control byte for an outgoing request.
    pub const fn request() -> Self {
        Self(Self::REQUEST_FLAG)
    }

    /// Control byte for a response carrying `status`.
    pub const fn response(status: ResponseStatus) -> Self {
        Self(status as u8 & Self::STATUS_MASK)
    }

    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u8 {
        self.0
    }

    pub const fn is_request(self) -> bool {
        self.0 & Self::REQUEST_FLAG != 0
    }

    /// The raw 3-bit status field.
    pub const fn status_code(self) -> u8 {
        self.0 & Self::STATUS_MASK
    }

    /// The status field, if it is an assigned code.
    pub fn status(self) -> Option<ResponseStatus> {
        ResponseStatus::from_code(self.status_code())
    }
}
