use crate::dataset::common_structs::{
    DataDesc, FlowBatch, FlowField, FrameFiles, FrameTensors, NextBatch,
};
use crate::dataset::config::{FlowPadding, IterConfig};
use crate::dataset::data_decoders::read_flow;
use crate::dataset::data_transformers::img2tensor::{
    ensure_shape, from_flow_to_tensor, from_img_to_tensor, from_label_to_tensor, open_image, stack,
};
use crate::dataset::error::{DatasetError, DatasetResult};
use crate::dataset::sequence_catalog::SequenceCatalog;
use crate::dataset::DataIter;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::Range;

/// Number of batches needed to cover `nb_frames` frames
pub fn batch_count(nb_frames: usize, batch_size: usize) -> usize {
    (nb_frames + batch_size - 1) / batch_size
}

/// Frame indices covered by batch `batch_index`, the last batch of a sequence may be shorter
pub fn batch_window(batch_index: usize, batch_size: usize, nb_frames: usize) -> Range<usize> {
    let start = (batch_index * batch_size).min(nb_frames);
    let end = (start + batch_size).min(nb_frames);
    start..end
}

/// Position of a `BatchedFlowIterator`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorState {
    pub sequence_index: usize,
    pub batch_index: usize,
    /// Size of the last produced batch, the configured size before the first one
    pub batch_size: usize,
}

impl CursorState {
    pub fn start(batch_size: usize) -> CursorState {
        CursorState {
            sequence_index: 0,
            batch_index: 0,
            batch_size,
        }
    }

    pub fn next_sequence(self) -> CursorState {
        CursorState {
            sequence_index: self.sequence_index + 1,
            batch_index: 0,
            ..self
        }
    }

    pub fn after_batch(self, produced: usize) -> CursorState {
        CursorState {
            batch_index: self.batch_index + 1,
            batch_size: produced,
            ..self
        }
    }
}

/// Walks the catalog sequence by sequence, yielding (images, flows, labels) batches.
///
/// Every batch holds consecutive frames of a single sequence. Files are read and
/// decoded on demand, nothing is cached between passes.
pub struct BatchedFlowIterator<R: Rng = StdRng> {
    config: IterConfig,
    catalog: SequenceCatalog,
    rng: R,
    cursor: CursorState,
    /// Frame ids of the sequence under the cursor, `None` until loaded
    frame_ids: Option<Vec<String>>,
}

impl BatchedFlowIterator<StdRng> {
    pub fn new(config: IterConfig) -> DatasetResult<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        BatchedFlowIterator::with_rng(config, rng)
    }
}

impl<R: Rng> BatchedFlowIterator<R> {
    pub fn with_rng(config: IterConfig, rng: R) -> DatasetResult<Self> {
        config.validate()?;
        let catalog = SequenceCatalog::scan(&config.path_root)?;
        let mut iterator = BatchedFlowIterator {
            cursor: CursorState::start(config.batch_size),
            config,
            catalog,
            rng,
            frame_ids: None,
        };
        iterator.reset()?;
        Ok(iterator)
    }

    pub fn config(&self) -> &IterConfig {
        &self.config
    }

    pub fn cursor(&self) -> CursorState {
        self.cursor
    }

    /// Sequence names in the order of the current pass
    pub fn sequences(&self) -> &[String] {
        self.catalog.sequences()
    }

    pub fn reset(&mut self) -> DatasetResult<()> {
        if self.config.shuffle {
            self.catalog.shuffle(&mut self.rng);
        }
        self.cursor = CursorState::start(self.config.batch_size);
        self.frame_ids = None;
        info!(
            "Reset over {} sequences (shuffle: {})",
            self.catalog.len(),
            self.config.shuffle
        );
        self.load_current_frame_ids()?;
        Ok(())
    }

    pub fn next_batch(&mut self) -> DatasetResult<NextBatch<FlowBatch>> {
        let (sequence, window) = loop {
            let sequence = match self.catalog.sequences().get(self.cursor.sequence_index) {
                Some(sequence) => sequence.clone(),
                None => return Ok(NextBatch::EndOfData),
            };
            let nb_frames = self.load_current_frame_ids()?.len();
            if self.cursor.batch_index < batch_count(nb_frames, self.config.batch_size) {
                let window =
                    batch_window(self.cursor.batch_index, self.config.batch_size, nb_frames);
                break (sequence, window);
            }
            debug!("Done with sequence {}", sequence);
            self.cursor = self.cursor.next_sequence();
            self.frame_ids = None;
        };
        let frame_ids = self.frame_ids.as_deref().unwrap_or(&[])[window.clone()].to_vec();
        debug!(
            "Reading batch {} of {} (frames {:?})",
            self.cursor.batch_index, sequence, window
        );

        let mut images = Vec::with_capacity(frame_ids.len());
        let mut flows = Vec::with_capacity(frame_ids.len());
        let mut labels = Vec::with_capacity(frame_ids.len());
        for frame_id in &frame_ids {
            let files = self.catalog.frame_files(
                &sequence,
                frame_id,
                self.config.frame_rate,
                &self.config.flow_extension,
            )?;
            let frame = self.load_frame(&files)?;
            images.push(frame.image);
            flows.push(frame.flows);
            labels.push(frame.label);
        }
        let batch = FlowBatch {
            sequence,
            frame_ids,
            images: stack(&images)?,
            flows: stack(&flows)?,
            labels: stack(&labels)?,
        };
        self.cursor = self.cursor.after_batch(batch.len());
        Ok(NextBatch::Batch(batch))
    }

    /// (batch, channels, height, width) and (batch, frame_rate, height, width, 2)
    pub fn provide_data(&self) -> Vec<DataDesc> {
        let shape = self.config.frame_shape;
        let batch_size = self.cursor.batch_size as i64;
        vec![
            DataDesc::new(
                format!("{}_images", self.config.data_name),
                vec![batch_size, shape.channels, shape.height, shape.width],
            ),
            DataDesc::new(
                format!("{}_flows", self.config.data_name),
                vec![
                    batch_size,
                    self.config.frame_rate as i64,
                    shape.height,
                    shape.width,
                    2,
                ],
            ),
        ]
    }

    /// (batch, height, width)
    pub fn provide_label(&self) -> Vec<DataDesc> {
        let shape = self.config.frame_shape;
        vec![DataDesc::new(
            self.config.label_name.clone(),
            vec![self.cursor.batch_size as i64, shape.height, shape.width],
        )]
    }

    fn load_current_frame_ids(&mut self) -> DatasetResult<&[String]> {
        if self.frame_ids.is_none() {
            if let Some(sequence) = self.catalog.sequences().get(self.cursor.sequence_index) {
                let ids = self.catalog.load_frame_ids(sequence)?;
                debug!("Sequence {} has {} frames", sequence, ids.len());
                self.frame_ids = Some(ids);
            }
        }
        Ok(self.frame_ids.as_deref().unwrap_or(&[]))
    }

    fn load_frame(&self, files: &FrameFiles) -> DatasetResult<FrameTensors> {
        let shape = self.config.frame_shape;

        let image = from_img_to_tensor(&open_image(&files.image)?, shape.channels);
        ensure_shape(&files.image, &image, &[shape.channels, shape.height, shape.width])?;

        let mut steps = Vec::with_capacity(files.flows.len());
        for flow_path in &files.flows {
            let field = match read_flow(flow_path) {
                Ok(field) => field,
                Err(DatasetError::MissingFile { path })
                    if self.config.flow_padding == FlowPadding::Zeros =>
                {
                    warn!("Flow {:?} missing, padding with zeros", path);
                    FlowField::zeros(shape.height as usize, shape.width as usize)
                }
                Err(e) => return Err(e),
            };
            // checked before building the tensor, the header sizes are untrusted
            if (field.height, field.width) != (shape.height as usize, shape.width as usize) {
                return Err(DatasetError::ShapeMismatch {
                    path: flow_path.to_owned(),
                    expected: vec![shape.height, shape.width, 2],
                    found: vec![field.height as i64, field.width as i64, 2],
                });
            }
            steps.push(from_flow_to_tensor(&field));
        }

        let label = from_label_to_tensor(&open_image(&files.label)?);
        ensure_shape(&files.label, &label, &[shape.height, shape.width])?;

        Ok(FrameTensors {
            image,
            flows: stack(&steps)?,
            label,
        })
    }
}

impl<R: Rng> DataIter for BatchedFlowIterator<R> {
    type Batch = FlowBatch;
    type Error = DatasetError;

    fn reset(&mut self) -> DatasetResult<()> {
        BatchedFlowIterator::reset(self)
    }

    fn next_batch(&mut self) -> DatasetResult<NextBatch<FlowBatch>> {
        BatchedFlowIterator::next_batch(self)
    }

    fn provide_data(&self) -> Vec<DataDesc> {
        BatchedFlowIterator::provide_data(self)
    }

    fn provide_label(&self) -> Vec<DataDesc> {
        BatchedFlowIterator::provide_label(self)
    }
}

impl<R: Rng> Iterator for BatchedFlowIterator<R> {
    type Item = DatasetResult<FlowBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_batch().map(NextBatch::into_option).transpose()
    }
}
