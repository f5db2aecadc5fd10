use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::config::{Config, GainPolicy, NormalizationMode};

/// Inclusive range of FFT bin indices retained for display.
///
/// Computed once at startup from the block size, sample rate and the
/// configured frequency cutoffs. Invariant: `0 <= min <= max < N/2 + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinRange {
    pub min: usize,
    pub max: usize,
}

impl BinRange {
    pub fn compute(block_size: usize, sample_rate: u32, freq_min: f32, freq_max: f32) -> Self {
        let total_bins = block_size / 2 + 1;
        let hz_per_bin = sample_rate as f32 / block_size as f32;

        // First bin strictly above the lower cutoff.
        let min = (0..total_bins)
            .find(|&i| i as f32 * hz_per_bin > freq_min)
            .unwrap_or(total_bins - 1);

        // First bin at or above the upper cutoff, or the last valid bin when
        // the cutoff sits beyond Nyquist.
        let max = (0..total_bins)
            .find(|&i| i as f32 * hz_per_bin >= freq_max)
            .unwrap_or(total_bins - 1);

        // A degenerate slice would leave nothing to draw; keep at least one bin.
        Self { min, max: max.max(min) }
    }

    /// Number of retained bins; at least 1 by construction.
    pub fn len(&self) -> usize {
        self.max - self.min + 1
    }
}

/// Frequency in Hz of FFT bin `index` for the given transform parameters.
pub fn bin_frequency(index: usize, block_size: usize, sample_rate: u32) -> f32 {
    index as f32 * sample_rate as f32 / block_size as f32
}

pub struct SpectrumAnalyzer {
    block_size: usize,
    gain: f32,
    gain_policy: GainPolicy,
    normalization: NormalizationMode,
    scale: f32,
    range: BinRange,
    fft: Arc<dyn Fft<f32>>,
    buffer: Vec<Complex<f32>>,
}

impl SpectrumAnalyzer {
    pub fn new(config: &Config) -> Self {
        let block_size = config.audio.block_size;
        let range = BinRange::compute(
            block_size,
            config.audio.sample_rate,
            config.analyzer.freq_min,
            config.analyzer.freq_max,
        );

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(block_size);

        Self {
            block_size,
            gain: config.audio.gain,
            gain_policy: config.audio.gain_policy,
            normalization: config.analyzer.normalization,
            scale: config.analyzer.scale,
            range,
            fft,
            buffer: vec![Complex::new(0.0, 0.0); block_size],
        }
    }

    pub fn range(&self) -> BinRange {
        self.range
    }

    /// Multiply each sample by the configured gain and convert back to i16.
    ///
    /// Wrap reproduces a truncating integer cast (64000 becomes -1536);
    /// Saturate pins out-of-range results to the i16 bounds.
    pub fn apply_gain(&self, input: &[i16], output: &mut Vec<i16>) {
        output.clear();
        output.extend(input.iter().map(|&s| {
            let v = s as f32 * self.gain;
            match self.gain_policy {
                GainPolicy::Wrap => (v as i64) as i16,
                GainPolicy::Saturate => v as i16,
            }
        }));
    }

    /// Magnitude spectrum of an already gain-adjusted block, sliced to the
    /// retained bin range and normalized into [0, 1].
    pub fn magnitudes(&mut self, samples: &[i16]) -> Vec<f32> {
        for (slot, &sample) in self.buffer.iter_mut().zip(samples) {
            *slot = Complex::new(sample as f32, 0.0);
        }
        for slot in self.buffer.iter_mut().skip(samples.len()) {
            *slot = Complex::new(0.0, 0.0);
        }

        self.fft.process(&mut self.buffer);

        // Scale by 2/N so magnitudes are amplitude-comparable across block sizes.
        let scale = 2.0 / self.block_size as f32;
        let raw: Vec<f32> = (self.range.min..=self.range.max)
            .map(|i| self.buffer[i].norm() * scale)
            .collect();

        self.normalize(raw)
    }

    /// Full pipeline for one block: gain, transform, slice, normalize.
    pub fn process(&mut self, block: &[i16]) -> Vec<f32> {
        let mut gained = Vec::with_capacity(block.len());
        self.apply_gain(block, &mut gained);
        self.magnitudes(&gained)
    }

    fn normalize(&self, raw: Vec<f32>) -> Vec<f32> {
        match self.normalization {
            NormalizationMode::Log => {
                let peak = raw.iter().fold(0.0f32, |a, &b| a.max(b));
                if peak <= 0.0 {
                    // Silence: a zero peak would divide by zero.
                    return vec![0.0; raw.len()];
                }
                let denom = peak.ln_1p();
                raw.iter().map(|m| m.ln_1p() / denom).collect()
            }
            NormalizationMode::Linear => raw
                .iter()
                .map(|m| (m / self.scale).clamp(0.0, 1.0))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.audio.block_size = 1024;
        config.audio.sample_rate = 44100;
        config
    }

    fn sine_block(freq: f32, amplitude: f32, block_size: usize, sample_rate: u32) -> Vec<i16> {
        (0..block_size)
            .map(|n| {
                let t = n as f32 / sample_rate as f32;
                (amplitude * (2.0 * std::f32::consts::PI * freq * t).sin()) as i16
            })
            .collect()
    }

    #[test]
    fn bin_range_invariants() {
        for &block_size in &[256usize, 1024, 4096, 8192] {
            for &rate in &[22050u32, 44100, 48000] {
                let range = BinRange::compute(block_size, rate, 20.0, 20000.0);
                let total_bins = block_size / 2 + 1;
                assert!(range.min <= range.max);
                assert!(range.max < total_bins);
            }
        }
    }

    #[test]
    fn bin_range_excludes_dc() {
        // Bin 0 is 0 Hz and never strictly exceeds a positive cutoff.
        let range = BinRange::compute(1024, 44100, 20.0, 20000.0);
        assert_eq!(range.min, 1);
    }

    #[test]
    fn bin_range_cutoff_beyond_nyquist_clamps_to_last_bin() {
        let range = BinRange::compute(1024, 44100, 60.0, 1_000_000.0);
        assert_eq!(range.max, 1024 / 2);
    }

    #[test]
    fn bin_range_degenerate_keeps_one_bin() {
        // Upper cutoff below the lower one still yields a non-empty slice.
        let range = BinRange::compute(1024, 44100, 5000.0, 100.0);
        assert!(range.max >= range.min);
        assert!(range.len() >= 1);
    }

    #[test]
    fn sine_peaks_at_expected_bin() {
        let config = test_config();
        let mut analyzer = SpectrumAnalyzer::new(&config);
        let block = sine_block(440.0, 10000.0, 1024, 44100);

        let spectrum = analyzer.process(&block);
        let range = analyzer.range();

        let peak_offset = spectrum
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .map(|(i, _)| i)
            .unwrap();

        // round(440 * 1024 / 44100) = 10
        assert_eq!(range.min + peak_offset, 10);
    }

    #[test]
    fn log_normalization_peaks_at_one() {
        let config = test_config();
        let mut analyzer = SpectrumAnalyzer::new(&config);
        let block = sine_block(440.0, 10000.0, 1024, 44100);

        let spectrum = analyzer.process(&block);
        let peak = spectrum.iter().fold(0.0f32, |a, &b| a.max(b));
        assert!((peak - 1.0).abs() < 1e-6);
    }

    #[test]
    fn log_normalization_of_silence_is_all_zero() {
        let config = test_config();
        let mut analyzer = SpectrumAnalyzer::new(&config);
        let block = vec![0i16; 1024];

        let spectrum = analyzer.process(&block);
        assert!(spectrum.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn linear_normalization_of_silence_is_all_zero() {
        let mut config = test_config();
        config.analyzer.normalization = NormalizationMode::Linear;
        let mut analyzer = SpectrumAnalyzer::new(&config);
        let block = vec![0i16; 1024];

        let spectrum = analyzer.process(&block);
        assert!(spectrum.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn linear_normalization_stays_in_unit_range() {
        let mut config = test_config();
        config.analyzer.normalization = NormalizationMode::Linear;
        config.analyzer.scale = 250.0;
        let mut analyzer = SpectrumAnalyzer::new(&config);
        let block = sine_block(440.0, 30000.0, 1024, 44100);

        let spectrum = analyzer.process(&block);
        assert!(spectrum.iter().all(|&v| (0.0..=1.0).contains(&v)));
        // Amplitude 30000 drives the peak bin well past the scale constant.
        let peak = spectrum.iter().fold(0.0f32, |a, &b| a.max(b));
        assert_eq!(peak, 1.0);
    }

    #[test]
    fn identical_blocks_produce_identical_spectra() {
        let config = test_config();
        let mut analyzer = SpectrumAnalyzer::new(&config);
        let block = sine_block(1234.0, 8000.0, 1024, 44100);

        let first = analyzer.process(&block);
        let second = analyzer.process(&block);
        assert_eq!(first, second);
    }

    #[test]
    fn gain_wrap_reproduces_truncating_cast() {
        let mut config = test_config();
        config.audio.gain = 2.0;
        let analyzer = SpectrumAnalyzer::new(&config);

        let mut out = Vec::new();
        analyzer.apply_gain(&[32000], &mut out);
        // 64000 wraps modulo 2^16: 64000 - 65536 = -1536
        assert_eq!(out, vec![-1536]);
    }

    #[test]
    fn gain_saturate_pins_to_i16_bounds() {
        let mut config = test_config();
        config.audio.gain = 2.0;
        config.audio.gain_policy = GainPolicy::Saturate;
        let analyzer = SpectrumAnalyzer::new(&config);

        let mut out = Vec::new();
        analyzer.apply_gain(&[32000, -32000], &mut out);
        assert_eq!(out, vec![i16::MAX, i16::MIN]);
    }

    #[test]
    fn unity_gain_is_identity() {
        let config = test_config();
        let analyzer = SpectrumAnalyzer::new(&config);

        let input = vec![0, 1, -1, i16::MAX, i16::MIN];
        let mut out = Vec::new();
        analyzer.apply_gain(&input, &mut out);
        assert_eq!(out, input);
    }

    #[test]
    fn bin_frequency_matches_resolution() {
        assert_eq!(bin_frequency(0, 1024, 44100), 0.0);
        let hz_per_bin = 44100.0 / 1024.0;
        assert!((bin_frequency(10, 1024, 44100) - 10.0 * hz_per_bin).abs() < 1e-3);
    }
}
