//! Per-compression sample codecs.
//!
//! Decoders consume whole groups only; a trailing partial group is ignored
//! and left for the packet layer to report. All multi-byte values are
//! big-endian.

use crate::types::CompressionType;

/// Smallest and largest values a 12-bit two's-complement sample can hold.
pub const I12_MIN: i16 = -2048;
pub const I12_MAX: i16 = 2047;

pub fn decode_f32(payload: &[u8]) -> Vec<f32> {
    payload
        .chunks_exact(4)
        .map(|c| f32::from_be_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

pub fn decode_i16(payload: &[u8]) -> Vec<i16> {
    payload
        .chunks_exact(2)
        .map(|c| i16::from_be_bytes([c[0], c[1]]))
        .collect()
}

pub fn decode_i8(payload: &[u8]) -> Vec<i8> {
    payload.iter().map(|&b| b as i8).collect()
}

fn sign_extend_12(raw: u16) -> i16 {
    let value = (raw & 0x0FFF) as i16;
    if value >= 2048 {
        value - 4096
    } else {
        value
    }
}

/// Unpack 12-bit samples: every 6 bytes (three BE u16 words) hold four samples.
///
/// ```text
/// v0 = ssss_ssss ssss_tttt
/// v1 = tttt_tttt uuuu_uuuu
/// v2 = uuuu_wwww wwww_wwww
/// ```
pub fn unpack_12bit(payload: &[u8]) -> Vec<i16> {
    let mut out = Vec::with_capacity(payload.len() / 6 * 4);
    for group in payload.chunks_exact(6) {
        let v0 = u16::from_be_bytes([group[0], group[1]]);
        let v1 = u16::from_be_bytes([group[2], group[3]]);
        let v2 = u16::from_be_bytes([group[4], group[5]]);
        out.push(sign_extend_12(v0 >> 4));
        out.push(sign_extend_12(((v0 & 0x0F) << 8) | (v1 >> 8)));
        out.push(sign_extend_12(((v1 & 0xFF) << 4) | (v2 >> 12)));
        out.push(sign_extend_12(v2 & 0x0FFF));
    }
    out
}

/// Decode `payload` with `compression` and multiply each sample by `factor`.
pub fn decode_samples(compression: CompressionType, payload: &[u8], factor: f32) -> Vec<f64> {
    let factor = f64::from(factor);
    match compression {
        CompressionType::None => decode_f32(payload)
            .into_iter()
            .map(|v| f64::from(v) * factor)
            .collect(),
        CompressionType::Int16 => decode_i16(payload)
            .into_iter()
            .map(|v| f64::from(v) * factor)
            .collect(),
        CompressionType::BytePack12Bit => unpack_12bit(payload)
            .into_iter()
            .map(|v| f64::from(v) * factor)
            .collect(),
        CompressionType::ResLimit8Bit => decode_i8(payload)
            .into_iter()
            .map(|v| f64::from(v) * factor)
            .collect(),
    }
}

pub fn encode_f32(samples: &[f32]) -> Vec<u8> {
    samples.iter().flat_map(|v| v.to_be_bytes()).collect()
}

pub fn encode_i16(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|v| v.to_be_bytes()).collect()
}

pub fn encode_i8(samples: &[i8]) -> Vec<u8> {
    samples.iter().map(|&v| v as u8).collect()
}

/// Pack samples four to a 6-byte group.
///
/// Values are saturated to the 12-bit range; a trailing partial group is
/// padded with zero samples.
pub fn pack_12bit(samples: &[i16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len().div_ceil(4) * 6);
    for group in samples.chunks(4) {
        let mut s = [0u16; 4];
        for (slot, &value) in s.iter_mut().zip(group) {
            *slot = (value.clamp(I12_MIN, I12_MAX) as u16) & 0x0FFF;
        }
        let v0 = (s[0] << 4) | (s[1] >> 8);
        let v1 = ((s[1] & 0xFF) << 8) | (s[2] >> 4);
        let v2 = ((s[2] & 0x0F) << 12) | s[3];
        out.extend_from_slice(&v0.to_be_bytes());
        out.extend_from_slice(&v1.to_be_bytes());
        out.extend_from_slice(&v2.to_be_bytes());
    }
    out
}
