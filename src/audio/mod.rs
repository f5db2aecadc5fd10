mod analyzer;
mod stream;

pub use analyzer::{bin_frequency, BinRange, SpectrumAnalyzer};
pub use stream::{list_sources, AudioError, AudioStream};
