use crate::dataset::error::{DatasetError, DatasetResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Size of every decoded frame, images are (channels, height, width)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameShape {
    pub channels: i64,
    pub height: i64,
    pub width: i64,
}

/// What to do when a frame's flow file does not exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowPadding {
    /// Abort the batch with `MissingFile`
    Strict,
    /// Substitute a zero flow field of the frame's size
    Zeros,
}

impl Default for FlowPadding {
    fn default() -> Self {
        FlowPadding::Strict
    }
}

fn default_flow_extension() -> String {
    "flo".to_string()
}

fn default_data_name() -> String {
    "data".to_string()
}

fn default_label_name() -> String {
    "label".to_string()
}

/// Constructor time settings of a `BatchedFlowIterator`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterConfig {
    pub path_root: PathBuf,
    pub batch_size: usize,
    /// Number of consecutive flow steps bundled with each frame
    pub frame_rate: usize,
    pub shuffle: bool,
    pub frame_shape: FrameShape,
    #[serde(default)]
    pub flow_padding: FlowPadding,
    #[serde(default = "default_flow_extension")]
    pub flow_extension: String,
    #[serde(default = "default_data_name")]
    pub data_name: String,
    #[serde(default = "default_label_name")]
    pub label_name: String,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl IterConfig {
    pub fn new<P: AsRef<Path>>(
        path_root: P,
        batch_size: usize,
        frame_rate: usize,
        shuffle: bool,
        frame_shape: FrameShape,
    ) -> IterConfig {
        IterConfig {
            path_root: path_root.as_ref().to_owned(),
            batch_size,
            frame_rate,
            shuffle,
            frame_shape,
            flow_padding: FlowPadding::default(),
            flow_extension: default_flow_extension(),
            data_name: default_data_name(),
            label_name: default_label_name(),
            seed: None,
        }
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> DatasetResult<IterConfig> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| DatasetError::from_io(path, e))?;
        let config: IterConfig = serde_json::from_reader(file).map_err(|e| DatasetError::Json {
            path: path.to_owned(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_flow_padding(mut self, flow_padding: FlowPadding) -> IterConfig {
        self.flow_padding = flow_padding;
        self
    }

    pub fn with_flow_extension(mut self, flow_extension: &str) -> IterConfig {
        self.flow_extension = flow_extension.to_string();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> IterConfig {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> DatasetResult<()> {
        if self.batch_size == 0 {
            return Err(DatasetError::Config("batch_size must be positive".into()));
        }
        if self.frame_rate == 0 {
            return Err(DatasetError::Config("frame_rate must be positive".into()));
        }
        let shape = self.frame_shape;
        if shape.channels != 1 && shape.channels != 3 {
            return Err(DatasetError::Config(format!(
                "frame_shape.channels must be 1 or 3, got {}",
                shape.channels
            )));
        }
        if shape.height <= 0 || shape.width <= 0 {
            return Err(DatasetError::Config(format!(
                "frame_shape must be positive, got {}x{}",
                shape.height, shape.width
            )));
        }
        match self.flow_extension.to_ascii_lowercase().as_str() {
            "flo" | "pfm" => {}
            other => {
                return Err(DatasetError::Config(format!(
                    "unsupported flow extension {:?}",
                    other
                )))
            }
        }
        if !self.path_root.is_dir() {
            return Err(DatasetError::Config(format!(
                "path_root {:?} is not a directory",
                self.path_root
            )));
        }
        Ok(())
    }
}
