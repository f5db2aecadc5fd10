use anyhow::Result;
use clap::Parser;
use tracing::info;

mod audio;
mod color;
mod config;
mod display;
mod renderer;

use config::{Config, GainPolicy, NormalizationMode};

#[derive(Parser, Debug)]
#[command(name = "fftscope")]
#[command(author, version, about = "Real-time microphone spectrum visualizer")]
pub struct Args {
    /// Config file path (default: ~/.config/fftscope/config.toml)
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Capture source name (use --list-sources to enumerate)
    #[arg(short, long)]
    device: Option<String>,

    /// Sample rate in Hz
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Samples per block
    #[arg(short, long)]
    block_size: Option<usize>,

    /// Linear gain applied to captured samples
    #[arg(short, long)]
    gain: Option<f32>,

    /// Overflow handling when gain exceeds the 16-bit range
    #[arg(long, value_enum)]
    gain_policy: Option<GainPolicy>,

    /// Play the gain-adjusted signal back out while visualizing
    #[arg(short, long)]
    passthrough: bool,

    /// Lower frequency cutoff in Hz
    #[arg(long)]
    freq_min: Option<f32>,

    /// Upper frequency cutoff in Hz
    #[arg(long)]
    freq_max: Option<f32>,

    /// Normalization policy: log or linear
    #[arg(short, long, value_enum)]
    normalization: Option<NormalizationMode>,

    /// Magnitude divisor for linear normalization
    #[arg(long)]
    scale: Option<f32>,

    /// Canvas width in pixels
    #[arg(long)]
    width: Option<usize>,

    /// Canvas height in pixels
    #[arg(long)]
    height: Option<usize>,

    /// Draw frequency-axis labels
    #[arg(short, long)]
    labels: bool,

    /// Label spacing in Hz
    #[arg(long)]
    label_step: Option<f32>,

    /// Bar color scheme: mono, spectrum, fire
    #[arg(long)]
    colors: Option<String>,

    /// List available capture sources and exit
    #[arg(long)]
    list_sources: bool,

    /// Write a default config file and exit
    #[arg(long)]
    init_config: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fftscope=info".parse()?),
        )
        .init();

    let args = Args::parse();

    if args.list_sources {
        for (name, state) in audio::list_sources()? {
            println!("{}\t{}", name, state);
        }
        return Ok(());
    }

    if args.init_config {
        let path = Config::init_default_config()?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    // Load or create config, then fold in CLI overrides
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_from_default_path().unwrap_or_default(),
    };
    config.merge_args(&args);
    config.sanitize();

    info!(
        "Starting fftscope: {} Hz, {} samples/block, gain {}",
        config.audio.sample_rate, config.audio.block_size, config.audio.gain
    );

    display::terminal::run(config)
}
