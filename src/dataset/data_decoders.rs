use crate::dataset::common_structs::FlowField;
use crate::dataset::error::{read_file_bytes, DatasetError, DatasetResult};
use std::path::Path;
use thiserror::Error;

pub mod flo_file;
pub mod pfm_file;

/// Byte level failures of the flow decoders, `read_flow` attaches the path
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlowFormatError {
    #[error("invalid magic {found:?}")]
    InvalidHeader { found: [u8; 4] },
    #[error("expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },
    #[error("negative size {width}x{height}")]
    NegativeDimensions { width: i32, height: i32 },
    #[error("{0}")]
    InvalidPfmHeader(String),
}

impl FlowFormatError {
    pub fn at(self, path: &Path) -> DatasetError {
        let path = path.to_owned();
        match self {
            FlowFormatError::InvalidHeader { found } => {
                DatasetError::InvalidFlowHeader { path, found }
            }
            FlowFormatError::ShortRead { expected, actual } => DatasetError::ShortRead {
                path,
                expected,
                actual,
            },
            FlowFormatError::NegativeDimensions { width, height } => {
                DatasetError::NegativeDimensions {
                    path,
                    width,
                    height,
                }
            }
            FlowFormatError::InvalidPfmHeader(reason) => {
                DatasetError::InvalidPfmHeader { path, reason }
            }
        }
    }
}

/// Reads and decodes a flow file, the format is picked from the extension
pub fn read_flow(path: &Path) -> DatasetResult<FlowField> {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    let bytes = read_file_bytes(path)?;
    let decoded = match extension.as_str() {
        "pfm" => pfm_file::decode_pfm_flow(&bytes),
        _ => flo_file::decode_flo(&bytes),
    };
    decoded.map_err(|e| e.at(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();
        let flo_path = dir.path().join("0_1.flo");
        fs::write(&flo_path, flo_file::encode_flo(1, 1, &[0.5, -0.5])).unwrap();
        let field = read_flow(&flo_path).unwrap();
        assert_eq!(field.data, vec![0.5, -0.5]);

        let pfm_path = dir.path().join("0_1.PFM");
        fs::write(&pfm_path, pfm_file::pfm_bytes(1, 1, &[1., 2., 3.], true)).unwrap();
        let field = read_flow(&pfm_path).unwrap();
        assert_eq!(field.data, vec![1., 2.]);
    }

    #[test]
    fn errors_carry_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("0_1.flo");
        fs::write(&path, b"XXXX\x01\0\0\0\x01\0\0\0").unwrap();
        match read_flow(&path) {
            Err(DatasetError::InvalidFlowHeader { path: p, found }) => {
                assert_eq!(p, path);
                assert_eq!(&found, b"XXXX");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            read_flow(&dir.path().join("missing.flo")),
            Err(DatasetError::MissingFile { .. })
        ));
    }
}
