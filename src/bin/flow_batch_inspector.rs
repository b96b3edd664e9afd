use anyhow::{bail, Context};
use clap::Parser;
use flow_dataset::{BatchedFlowIterator, FlowPadding, FrameShape, IterConfig};
use log::info;
use std::path::PathBuf;

/// Walks an image/flow/label dataset and logs the shape of every batch
#[derive(Parser, Debug)]
#[command(name = "flow_batch_inspector")]
struct Args {
    /// JSON iterator configuration, overrides every other dataset flag
    #[arg(long)]
    config: Option<PathBuf>,
    /// Dataset root holding one directory per sequence
    #[arg(long)]
    root: Option<PathBuf>,
    #[arg(long, default_value_t = 4)]
    batch_size: usize,
    #[arg(long, default_value_t = 1)]
    frame_rate: usize,
    #[arg(long, default_value_t = 3)]
    channels: i64,
    #[arg(long)]
    height: Option<i64>,
    #[arg(long)]
    width: Option<i64>,
    #[arg(long)]
    shuffle: bool,
    #[arg(long)]
    seed: Option<u64>,
    /// Pad missing flow steps with zeros instead of failing
    #[arg(long)]
    zero_pad_flows: bool,
    #[arg(long, default_value_t = 1)]
    epochs: usize,
}

impl Args {
    fn iter_config(&self) -> anyhow::Result<IterConfig> {
        if let Some(path) = &self.config {
            return IterConfig::from_json_file(path)
                .with_context(|| format!("loading iterator config {:?}", path));
        }
        let root = match &self.root {
            Some(root) => root,
            None => bail!("either --config or --root is required"),
        };
        let (height, width) = match (self.height, self.width) {
            (Some(height), Some(width)) => (height, width),
            _ => bail!("--height and --width are required without --config"),
        };
        let frame_shape = FrameShape {
            channels: self.channels,
            height,
            width,
        };
        let mut config = IterConfig::new(
            root,
            self.batch_size,
            self.frame_rate,
            self.shuffle,
            frame_shape,
        );
        if self.zero_pad_flows {
            config = config.with_flow_padding(FlowPadding::Zeros);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = args.iter_config()?;
    let mut iterator = BatchedFlowIterator::new(config).context("opening dataset")?;

    for epoch in 0..args.epochs {
        if epoch > 0 {
            iterator.reset()?;
        }
        let start_epoch = std::time::Instant::now();
        let mut done_batches = 0;
        let mut done_frames = 0;
        while let Some(batch) = iterator
            .next_batch()
            .with_context(|| format!("reading batch {} of epoch {}", done_batches, epoch))?
            .into_option()
        {
            info!(
                "{} {:?}: images {:?} flows {:?} labels {:?}",
                batch.sequence,
                batch.frame_ids,
                batch.images.size(),
                batch.flows.size(),
                batch.labels.size()
            );
            done_batches += 1;
            done_frames += batch.len();
        }
        info!(
            "Epoch {} of {}: {} batches, {} frames in {} s",
            epoch + 1,
            args.epochs,
            done_batches,
            done_frames,
            start_epoch.elapsed().as_secs_f32()
        );
    }
    Ok(())
}
