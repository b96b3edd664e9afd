//! Middlebury `.flo` optical flow files.
//!
//! Layout: 4 byte magic `PIEH`, little endian i32 width, little endian i32 height,
//! then `width * height` pairs of little endian f32 (x, y) displacements in row
//! major order.
use super::FlowFormatError;
use crate::dataset::common_structs::FlowField;

pub const FLO_MAGIC: &[u8; 4] = b"PIEH";
pub const FLO_HEADER_LEN: usize = 12;

pub fn decode_flo(bytes: &[u8]) -> Result<FlowField, FlowFormatError> {
    if bytes.len() < 4 {
        return Err(FlowFormatError::ShortRead {
            expected: FLO_HEADER_LEN,
            actual: bytes.len(),
        });
    }
    let magic = [bytes[0], bytes[1], bytes[2], bytes[3]];
    if &magic != FLO_MAGIC {
        return Err(FlowFormatError::InvalidHeader { found: magic });
    }
    if bytes.len() < FLO_HEADER_LEN {
        return Err(FlowFormatError::ShortRead {
            expected: FLO_HEADER_LEN,
            actual: bytes.len(),
        });
    }
    let width = read_i32_le(&bytes[4..8]);
    let height = read_i32_le(&bytes[8..12]);
    if width < 0 || height < 0 {
        return Err(FlowFormatError::NegativeDimensions { width, height });
    }
    let (width, height) = (width as usize, height as usize);
    // A size that does not fit in usize can never be satisfied by the payload
    let expected = width
        .checked_mul(height)
        .and_then(|pixels| pixels.checked_mul(2 * 4))
        .and_then(|payload| payload.checked_add(FLO_HEADER_LEN))
        .ok_or(FlowFormatError::ShortRead {
            expected: usize::MAX,
            actual: bytes.len(),
        })?;
    if bytes.len() < expected {
        return Err(FlowFormatError::ShortRead {
            expected,
            actual: bytes.len(),
        });
    }
    // Anything after the payload is ignored
    let data = bytes[FLO_HEADER_LEN..expected]
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();
    Ok(FlowField {
        width,
        height,
        data,
    })
}

/// Serializes a row major (height, width, 2) flow field
pub fn encode_flo(width: i32, height: i32, data: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(FLO_HEADER_LEN + data.len() * 4);
    bytes.extend_from_slice(FLO_MAGIC);
    bytes.extend_from_slice(&width.to_le_bytes());
    bytes.extend_from_slice(&height.to_le_bytes());
    for value in data {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

fn read_i32_le(bytes: &[u8]) -> i32 {
    i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
