use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::color::ColorScheme;

/// What happens when gain pushes a sample outside the 16-bit range.
///
/// `Wrap` is the default and reproduces a truncating integer cast:
/// 32000 * 2.0 comes back as -1536. `Saturate` pins to the i16 bounds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, ValueEnum, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum GainPolicy {
    #[default]
    Wrap,
    Saturate,
}

/// How raw magnitudes are mapped into [0, 1] for display.
///
/// `Log` scales each frame so its loudest bin is exactly 1.0, adapting to
/// loudness at the cost of frame-to-frame comparability. `Linear` divides by
/// a fixed scale constant and clips, keeping absolute level comparable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, ValueEnum, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum NormalizationMode {
    #[default]
    Log,
    Linear,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub analyzer: AnalyzerConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub device: Option<String>,
    pub sample_rate: u32,
    pub block_size: usize,
    pub gain: f32,
    pub gain_policy: GainPolicy,
    pub passthrough: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: 44100,
            block_size: 1024,
            gain: 1.0,
            gain_policy: GainPolicy::Wrap,
            passthrough: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub freq_min: f32,
    pub freq_max: f32,
    pub normalization: NormalizationMode,
    /// Divisor for linear normalization; ignored in log mode.
    pub scale: f32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            freq_min: 20.0,
            freq_max: 20000.0,
            normalization: NormalizationMode::Log,
            scale: 250.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: usize,
    pub height: usize,
    pub labels: bool,
    pub label_step_hz: f32,
    pub color_scheme: ColorScheme,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 500,
            labels: false,
            label_step_hz: 1000.0,
            color_scheme: ColorScheme::Mono,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Get the default XDG config path (~/.config/fftscope/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("fftscope").join("config.toml"))
    }

    /// Load config from the default XDG path if it exists
    /// Returns None if file doesn't exist, logs warning on parse errors
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            match Self::load(&path) {
                Ok(config) => Some(config),
                Err(e) => {
                    eprintln!(
                        "Warning: Failed to parse config at {}: {}\nUsing defaults.",
                        path.display(),
                        e
                    );
                    None
                }
            }
        } else {
            None
        }
    }

    /// Initialize default config file at XDG path, returns the path
    pub fn init_default_config() -> Result<PathBuf> {
        let path = Self::default_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template = Self::generate_config_template();
        std::fs::write(&path, template)?;

        Ok(path)
    }

    /// Generate a commented TOML config template
    pub fn generate_config_template() -> String {
        r#"# fftscope Configuration
# This file is auto-generated. Edit as needed.

[audio]
# Capture source (null = default). Use --list-sources to enumerate.
# device = "alsa_input.pci-0000_00_1f.3.analog-stereo"
# Sample rate in Hz
sample_rate = 44100
# Samples per block (1024 is responsive; 8192 gives finer frequency resolution)
block_size = 1024
# Linear gain applied to captured samples
gain = 1.0
# Overflow handling when gain exceeds the 16-bit range: "wrap" or "saturate"
gain_policy = "wrap"
# Play the gain-adjusted signal back out while visualizing
passthrough = false

[analyzer]
# Displayed frequency range in Hz
freq_min = 20.0
freq_max = 20000.0
# Normalization: "log" (tallest bar always full height) or "linear" (fixed scale)
normalization = "log"
# Magnitude divisor for linear normalization
scale = 250.0

[render]
# Canvas dimensions in pixels
width = 1000
height = 500
# Draw frequency-axis labels
labels = false
# Label spacing in Hz
label_step_hz = 1000.0
# Bar color scheme: "mono", "spectrum", "fire"
color_scheme = "mono"
"#
        .to_string()
    }

    /// Clamp out-of-range values so the pipeline never sees a degenerate
    /// configuration at runtime.
    pub fn sanitize(&mut self) {
        self.audio.block_size = self.audio.block_size.max(2);
        self.audio.sample_rate = self.audio.sample_rate.max(1);
        self.audio.gain = self.audio.gain.max(0.0);
        if self.analyzer.freq_max < self.analyzer.freq_min {
            std::mem::swap(&mut self.analyzer.freq_min, &mut self.analyzer.freq_max);
        }
        self.analyzer.scale = self.analyzer.scale.max(f32::EPSILON);
        self.render.width = self.render.width.max(1);
        self.render.height = self.render.height.max(1);
        self.render.label_step_hz = self.render.label_step_hz.max(1.0);
    }

    /// Merge CLI arguments into config (CLI takes priority)
    pub fn merge_args(&mut self, args: &crate::Args) {
        if let Some(ref device) = args.device {
            self.audio.device = Some(device.clone());
        }
        if let Some(rate) = args.sample_rate {
            self.audio.sample_rate = rate;
        }
        if let Some(size) = args.block_size {
            self.audio.block_size = size;
        }
        if let Some(gain) = args.gain {
            self.audio.gain = gain;
        }
        if let Some(policy) = args.gain_policy {
            self.audio.gain_policy = policy;
        }
        if args.passthrough {
            self.audio.passthrough = true;
        }

        if let Some(freq) = args.freq_min {
            self.analyzer.freq_min = freq;
        }
        if let Some(freq) = args.freq_max {
            self.analyzer.freq_max = freq;
        }
        if let Some(mode) = args.normalization {
            self.analyzer.normalization = mode;
        }
        if let Some(scale) = args.scale {
            self.analyzer.scale = scale;
        }

        if let Some(width) = args.width {
            self.render.width = width;
        }
        if let Some(height) = args.height {
            self.render.height = height;
        }
        if args.labels {
            self.render.labels = true;
        }
        if let Some(step) = args.label_step {
            self.render.label_step_hz = step;
        }
        if let Some(ref scheme) = args.colors {
            self.render.color_scheme = scheme.parse().unwrap_or(self.render.color_scheme);
        }
    }
}
