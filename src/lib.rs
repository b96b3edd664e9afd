//! Batched image / optical flow / segmentation label loading for training loops.
//!
//! The dataset is a directory per sequence:
//!
//! ```text
//! <root>/<sequence>/files.txt
//! <root>/<sequence>/images/<id>.png
//! <root>/<sequence>/flows/<a>_<b>.flo
//! <root>/<sequence>/annot/<sequence>_<id:06>_L.png
//! ```
pub mod dataset;

pub use dataset::common_structs::{DataDesc, FlowBatch, NextBatch};
pub use dataset::config::{FlowPadding, FrameShape, IterConfig};
pub use dataset::data_loaders::image_flow_loader::{BatchedFlowIterator, CursorState};
pub use dataset::error::{DatasetError, DatasetResult};
pub use dataset::sequence_catalog::SequenceCatalog;
pub use dataset::DataIter;
