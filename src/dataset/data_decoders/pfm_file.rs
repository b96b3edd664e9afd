//! Portable float map flows (`.pfm`), as written by the FlyingThings renderer.
//!
//! Only colour maps (`PF`) can carry flow: channels 0 and 1 are the (x, y)
//! displacement, channel 2 is dropped. Rows are stored bottom to top.
use super::FlowFormatError;
use crate::dataset::common_structs::FlowField;

const PFM_CHANNELS: usize = 3;

pub fn decode_pfm_flow(bytes: &[u8]) -> Result<FlowField, FlowFormatError> {
    let (identifier, rest) = next_line(bytes)?;
    match identifier {
        "PF" => {}
        "Pf" => {
            return Err(FlowFormatError::InvalidPfmHeader(
                "single channel map cannot hold flow".to_string(),
            ))
        }
        other => {
            return Err(FlowFormatError::InvalidPfmHeader(format!(
                "unknown identifier {:?}",
                other
            )))
        }
    }
    let (dimensions, rest) = next_line(rest)?;
    let mut dimensions = dimensions.split_whitespace().map(str::parse::<usize>);
    let (width, height) = match (dimensions.next(), dimensions.next(), dimensions.next()) {
        (Some(Ok(width)), Some(Ok(height)), None) => (width, height),
        _ => {
            return Err(FlowFormatError::InvalidPfmHeader(
                "expected `width height`".to_string(),
            ))
        }
    };
    let (scale, payload) = next_line(rest)?;
    let scale: f32 = scale
        .parse()
        .map_err(|_| FlowFormatError::InvalidPfmHeader(format!("bad scale {:?}", scale)))?;
    let little_endian = scale < 0.;

    let header_len = bytes.len() - payload.len();
    let oversized = FlowFormatError::ShortRead {
        expected: usize::MAX,
        actual: bytes.len(),
    };
    let row_len = width.checked_mul(PFM_CHANNELS).ok_or(oversized.clone())?;
    let expected_payload = row_len
        .checked_mul(height)
        .and_then(|values| values.checked_mul(4))
        .ok_or(oversized.clone())?;
    let expected = header_len.checked_add(expected_payload).ok_or(oversized)?;
    if bytes.len() < expected {
        return Err(FlowFormatError::ShortRead {
            expected,
            actual: bytes.len(),
        });
    }
    let values: Vec<f32> = payload[..expected_payload]
        .chunks_exact(4)
        .map(|chunk| {
            let raw = [chunk[0], chunk[1], chunk[2], chunk[3]];
            if little_endian {
                f32::from_le_bytes(raw)
            } else {
                f32::from_be_bytes(raw)
            }
        })
        .collect();

    let mut data = Vec::with_capacity(width * height * 2);
    for row in values.chunks_exact(row_len.max(1)).rev() {
        for pixel in row.chunks_exact(PFM_CHANNELS) {
            data.push(pixel[0]);
            data.push(pixel[1]);
        }
    }
    Ok(FlowField {
        width,
        height,
        data,
    })
}

/// Splits off one `\n` terminated ascii header line
fn next_line(bytes: &[u8]) -> Result<(&str, &[u8]), FlowFormatError> {
    let end = bytes
        .iter()
        .position(|b| *b == b'\n')
        .ok_or_else(|| FlowFormatError::InvalidPfmHeader("truncated header".to_string()))?;
    let line = std::str::from_utf8(&bytes[..end])
        .map_err(|_| FlowFormatError::InvalidPfmHeader("header is not ascii".to_string()))?;
    Ok((line.trim(), &bytes[end + 1..]))
}

/// Builds a `PF` file from top to bottom rows of (r, g, b) pixels
#[cfg(test)]
pub(crate) fn pfm_bytes(width: usize, height: usize, pixels: &[f32], little_endian: bool) -> Vec<u8> {
    let scale = if little_endian { "-1.0" } else { "1.0" };
    let mut bytes = format!("PF\n{} {}\n{}\n", width, height, scale).into_bytes();
    for row in pixels.chunks_exact(width * PFM_CHANNELS).rev() {
        for value in row {
            if little_endian {
                bytes.extend_from_slice(&value.to_le_bytes());
            } else {
                bytes.extend_from_slice(&value.to_be_bytes());
            }
        }
    }
    bytes
}
