use anyhow::{anyhow, Result};
use libpulse_binding as pulse;
use libpulse_simple_binding as psimple;
use pulse::error::PAErr;
use pulse::sample::{Format, Spec};
use pulse::stream::Direction;
use thiserror::Error;
use tracing::info;

use crate::config::AudioConfig;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("invalid sample spec: {rate} Hz mono s16")]
    InvalidSpec { rate: u32 },
    #[error("failed to open audio device: {0}")]
    DeviceOpen(PAErr),
    #[error("audio device I/O failed: {0}")]
    DeviceIo(PAErr),
}

/// Blocking capture (and optional playback) stream over the PulseAudio
/// simple API. One fixed-size block in or out per call.
///
/// Capture overruns are absorbed server-side: the daemon drops stale data
/// and the next read still delivers a full block, so an overflow never
/// surfaces as an error here. Any error the simple API does report is a
/// real I/O failure and ends the session.
///
/// The connection is closed when the stream is dropped, on every exit path.
pub struct AudioStream {
    record: psimple::Simple,
    playback: Option<psimple::Simple>,
}

impl AudioStream {
    pub fn open(config: &AudioConfig) -> Result<Self, AudioError> {
        let spec = Spec {
            format: Format::S16NE,
            channels: 1,
            rate: config.sample_rate,
        };

        if !spec.is_valid() {
            return Err(AudioError::InvalidSpec { rate: config.sample_rate });
        }

        info!(
            "Opening audio device: {} ({} Hz, {} samples/block)",
            config.device.as_deref().unwrap_or("default"),
            config.sample_rate,
            config.block_size
        );

        let record = psimple::Simple::new(
            None,                // Use default server
            "fftscope",          // Application name
            Direction::Record,   // Recording stream
            config.device.as_deref(),
            "spectrum-capture",  // Stream description
            &spec,
            None,                // Default channel map
            None,                // Default buffering attributes
        )
        .map_err(AudioError::DeviceOpen)?;

        let playback = if config.passthrough {
            info!("Pass-through enabled, opening playback stream");
            Some(
                psimple::Simple::new(
                    None,
                    "fftscope",
                    Direction::Playback,
                    None, // Default sink
                    "pass-through",
                    &spec,
                    None,
                    None,
                )
                .map_err(AudioError::DeviceOpen)?,
            )
        } else {
            None
        };

        Ok(Self { record, playback })
    }

    /// Block until `block.len()` samples have been captured.
    pub fn read_block(&self, block: &mut [i16]) -> Result<(), AudioError> {
        let bytes = unsafe {
            std::slice::from_raw_parts_mut(
                block.as_mut_ptr() as *mut u8,
                std::mem::size_of_val(block),
            )
        };
        self.record.read(bytes).map_err(AudioError::DeviceIo)
    }

    /// Block until the device accepts `block` for playback.
    /// No-op when pass-through was not requested at open time.
    pub fn write_block(&self, block: &[i16]) -> Result<(), AudioError> {
        let Some(playback) = &self.playback else {
            return Ok(());
        };
        let bytes = unsafe {
            std::slice::from_raw_parts(block.as_ptr() as *const u8, std::mem::size_of_val(block))
        };
        playback.write(bytes).map_err(AudioError::DeviceIo)
    }
}

/// List available PulseAudio/PipeWire sources.
///
/// Returns a list of `(name, state)` tuples parsed from `pactl list short sources`.
pub fn list_sources() -> Result<Vec<(String, String)>> {
    let output = std::process::Command::new("pactl")
        .args(["list", "short", "sources"])
        .output()
        .map_err(|e| anyhow!("Failed to run pactl: {}", e))?;

    if !output.status.success() {
        return Err(anyhow!("pactl list short sources failed"));
    }

    let text = String::from_utf8_lossy(&output.stdout);
    let mut sources = Vec::new();
    for line in text.lines() {
        // Format: <id>\t<name>\t<module>\t<sample_spec>\t<state>
        let cols: Vec<&str> = line.split('\t').collect();
        if cols.len() >= 5 {
            sources.push((cols[1].to_string(), cols[4].to_string()));
        }
    }
    Ok(sources)
}
