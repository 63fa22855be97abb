use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::info;
use relay_pipeline::{Pipeline, PipelineConfig};

/// Simulated sensor readings relayed through a bounded blocking queue.
#[derive(Debug, Parser)]
#[clap(name = "relay", version)]
struct Opt {
    /// TOML file with pipeline settings; flags below override it
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Queue capacity
    #[clap(long)]
    capacity: Option<usize>,

    /// Milliseconds between produced readings
    #[clap(long = "produce-ms")]
    produce_ms: Option<u64>,

    /// Milliseconds between consumed readings
    #[clap(long = "consume-ms")]
    consume_ms: Option<u64>,

    /// Scale factor applied by the consumer
    #[clap(long, allow_negative_numbers = true)]
    gain: Option<f64>,

    /// Offset added after scaling
    #[clap(long, allow_negative_numbers = true)]
    offset: Option<f64>,

    /// Seed for the simulated sensor
    #[clap(long)]
    seed: Option<u64>,

    /// Stop after producing this many readings
    #[clap(short = 'n', long)]
    count: Option<u64>,

    /// Shut down after this many seconds
    #[clap(long = "run-for")]
    run_for: Option<f64>,

    /// Abandon queued readings on shutdown instead of draining them
    #[clap(long)]
    no_drain: bool,
}

impl Opt {
    fn apply(&self, config: &mut PipelineConfig) {
        if let Some(capacity) = self.capacity {
            config.capacity = capacity;
        }
        if let Some(ms) = self.produce_ms {
            config.produce_interval_ms = ms;
        }
        if let Some(ms) = self.consume_ms {
            config.consume_interval_ms = ms;
        }
        if let Some(gain) = self.gain {
            config.gain = gain;
        }
        if let Some(offset) = self.offset {
            config.offset = offset;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.count.is_some() {
            config.count = self.count;
        }
        if self.run_for.is_some() {
            config.run_for_secs = self.run_for;
        }
        if self.no_drain {
            config.drain_on_shutdown = false;
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::parse();

    let mut config = match &opt.config {
        Some(path) => PipelineConfig::from_toml_file(path)?,
        None => PipelineConfig::default(),
    };
    opt.apply(&mut config);
    config.validate().context("invalid pipeline configuration")?;
    info!("{config:?}");

    let pipeline = Pipeline::start_simulated(&config).context("failed to start pipeline")?;

    if let Some(run_for) = config.run_for() {
        pipeline.shutdown_handle().sleep(run_for);
        pipeline.shutdown();
    }

    let report = pipeline.join()?;
    println!("{report}");
    Ok(())
}
