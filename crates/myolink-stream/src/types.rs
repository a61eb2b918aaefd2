use serde::Serialize;

use crate::error::DecodeError;

/// Which signal the pod is streaming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum EmgStreamSource {
    /// Streaming disabled.
    None = 0,
    RawEmg = 1,
    ProcessedEmg = 2,
    Imu = 3,
}

impl EmgStreamSource {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::RawEmg => "RAW_EMG",
            Self::ProcessedEmg => "PROCESSED_EMG",
            Self::Imu => "IMU",
        }
    }
}

impl TryFrom<u8> for EmgStreamSource {
    type Error = DecodeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::None),
            1 => Ok(Self::RawEmg),
            2 => Ok(Self::ProcessedEmg),
            3 => Ok(Self::Imu),
            other => Err(DecodeError::UnknownStreamSource(other)),
        }
    }
}

impl std::fmt::Display for EmgStreamSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How samples are packed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum CompressionType {
    /// Big-endian f32 per sample.
    None = 0,
    /// Big-endian i16 per sample.
    Int16 = 1,
    /// Four 12-bit samples in six bytes.
    #[serde(rename = "BYTE_PACK_12BIT")]
    BytePack12Bit = 2,
    /// One signed byte per sample.
    #[serde(rename = "RES_LIMIT_8BIT")]
    ResLimit8Bit = 3,
}

impl CompressionType {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Int16 => "INT16",
            Self::BytePack12Bit => "BYTE_PACK_12BIT",
            Self::ResLimit8Bit => "RES_LIMIT_8BIT",
        }
    }

    /// Bytes per decode group and samples produced by each group.
    pub fn stride(self) -> (usize, usize) {
        match self {
            Self::None => (4, 1),
            Self::Int16 => (2, 1),
            Self::BytePack12Bit => (6, 4),
            Self::ResLimit8Bit => (1, 1),
        }
    }
}

impl TryFrom<u8> for CompressionType {
    type Error = DecodeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::None),
            1 => Ok(Self::Int16),
            2 => Ok(Self::BytePack12Bit),
            3 => Ok(Self::ResLimit8Bit),
            other => Err(DecodeError::UnknownCompression(other)),
        }
    }
}

impl std::fmt::Display for CompressionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Pack source (high nibble) and compression (low nibble) into one byte.
pub fn pack_source_compression(source: EmgStreamSource, compression: CompressionType) -> u8 {
    (source.code() << 4) | compression.code()
}

/// Split a source/compression byte. Unknown nibbles are rejected.
pub fn unpack_source_compression(
    byte: u8,
) -> Result<(EmgStreamSource, CompressionType), DecodeError> {
    let source = EmgStreamSource::try_from(byte >> 4)?;
    let compression = CompressionType::try_from(byte & 0x0F)?;
    Ok((source, compression))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nibble_packing() {
        let byte = pack_source_compression(EmgStreamSource::ProcessedEmg, CompressionType::Int16);
        assert_eq!(byte, 0x21);
        assert_eq!(
            unpack_source_compression(byte).unwrap(),
            (EmgStreamSource::ProcessedEmg, CompressionType::Int16)
        );
    }

    #[test]
    fn unknown_nibbles_fail() {
        assert_eq!(
            unpack_source_compression(0x41),
            Err(DecodeError::UnknownStreamSource(4))
        );
        assert_eq!(
            unpack_source_compression(0x1F),
            Err(DecodeError::UnknownCompression(0x0F))
        );
    }

    #[test]
    fn strides() {
        assert_eq!(CompressionType::None.stride(), (4, 1));
        assert_eq!(CompressionType::BytePack12Bit.stride(), (6, 4));
        assert_eq!(CompressionType::ResLimit8Bit.to_string(), "RES_LIMIT_8BIT");
    }
}
