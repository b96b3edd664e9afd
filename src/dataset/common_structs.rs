use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tch::Tensor;
// Frequently used structs in the provided decoders/loaders/transformers

/// Result of asking a data iterator for more data
#[derive(Debug)]
pub enum NextBatch<B> {
    Batch(B),
    EndOfData,
}

impl<B> NextBatch<B> {
    pub fn into_option(self) -> Option<B> {
        match self {
            NextBatch::Batch(batch) => Some(batch),
            NextBatch::EndOfData => None,
        }
    }

    pub fn is_end_of_data(&self) -> bool {
        matches!(self, NextBatch::EndOfData)
    }
}

/// A named tensor shape, as declared to the training loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataDesc {
    pub name: String,
    pub shape: Vec<i64>,
}

impl DataDesc {
    pub fn new(name: impl Into<String>, shape: Vec<i64>) -> DataDesc {
        DataDesc {
            name: name.into(),
            shape,
        }
    }
}

/// On-disk artifacts of a single frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameFiles {
    pub image: PathBuf,
    /// One file per flow step, in temporal order
    pub flows: Vec<PathBuf>,
    pub label: PathBuf,
}

/// A dense optical flow field, row major (height, width, 2)
#[derive(Debug, Clone, PartialEq)]
pub struct FlowField {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl FlowField {
    pub fn zeros(height: usize, width: usize) -> FlowField {
        FlowField {
            width,
            height,
            data: vec![0.; width * height * 2],
        }
    }

    /// (x, y) displacement at the given pixel
    #[cfg(test)]
    pub(crate) fn at(&self, row: usize, col: usize) -> (f32, f32) {
        let offset = (row * self.width + col) * 2;
        (self.data[offset], self.data[offset + 1])
    }
}

/// The tensors of one decoded frame
#[derive(Debug)]
pub struct FrameTensors {
    /// (channels, height, width)
    pub image: Tensor,
    /// (frame_rate, height, width, 2)
    pub flows: Tensor,
    /// (height, width)
    pub label: Tensor,
}

/// A batch of consecutive frames from one sequence
#[derive(Debug)]
pub struct FlowBatch {
    pub sequence: String,
    pub frame_ids: Vec<String>,
    /// (batch, channels, height, width)
    pub images: Tensor,
    /// (batch, frame_rate, height, width, 2)
    pub flows: Tensor,
    /// (batch, height, width)
    pub labels: Tensor,
}

impl FlowBatch {
    pub fn len(&self) -> usize {
        self.frame_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame_ids.is_empty()
    }
}
