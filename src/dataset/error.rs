use std::path::PathBuf;
use thiserror::Error;

pub type DatasetResult<T> = Result<T, DatasetError>;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("sequence index file missing: {path:?}")]
    MissingIndex { path: PathBuf },
    #[error("flow file {path:?} does not start with PIEH, found {found:?}")]
    InvalidFlowHeader { path: PathBuf, found: [u8; 4] },
    #[error("file not found: {path:?}")]
    MissingFile { path: PathBuf },
    #[error("short read on {path:?}: expected {expected} bytes, got {actual}")]
    ShortRead {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },
    #[error("flow file {path:?} declares negative size {width}x{height}")]
    NegativeDimensions {
        path: PathBuf,
        width: i32,
        height: i32,
    },
    #[error("invalid pfm header in {path:?}: {reason}")]
    InvalidPfmHeader { path: PathBuf, reason: String },
    #[error("frame id {frame_id:?} of sequence {sequence:?} is not a frame number")]
    InvalidFrameId { sequence: String, frame_id: String },
    #[error("{path:?} has shape {found:?}, expected {expected:?}")]
    ShapeMismatch {
        path: PathBuf,
        expected: Vec<i64>,
        found: Vec<i64>,
    },
    #[error("image decode error at {path:?}: {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json parse error at {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Tensor(#[from] tch::TchError),
}

impl DatasetError {
    /// Maps a failed read of `path`, turning `NotFound` into `MissingFile`
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> DatasetError {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            DatasetError::MissingFile { path }
        } else {
            DatasetError::Io { path, source }
        }
    }
}

/// Reads the whole file at `path`
pub fn read_file_bytes(path: &std::path::Path) -> DatasetResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| DatasetError::from_io(path, e))
}
