pub mod common_structs;
pub mod config;
pub mod error;
pub mod sequence_catalog;

pub mod data_decoders;
pub mod data_loaders;
pub mod data_transformers;

use self::common_structs::{DataDesc, NextBatch};

/// What a training loop needs from a batched data source.
///
/// Exhaustion is reported as [`NextBatch::EndOfData`], errors through `Err`.
pub trait DataIter {
    type Batch;
    type Error;

    /// Rewinds to the first batch of the first sequence, reshuffling if enabled
    fn reset(&mut self) -> Result<(), Self::Error>;
    /// Reads the next batch
    fn next_batch(&mut self) -> Result<NextBatch<Self::Batch>, Self::Error>;
    /// Declared shapes of the data tensors for the current batch size
    fn provide_data(&self) -> Vec<DataDesc>;
    /// Declared shapes of the label tensors for the current batch size
    fn provide_label(&self) -> Vec<DataDesc>;
}
