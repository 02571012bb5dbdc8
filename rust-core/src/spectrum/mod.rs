//! Windowed spectral analysis with FFT

pub mod fft;
pub mod windowing;
pub mod result;
pub mod analysis;

pub use fft::FftEngine;
pub use windowing::{apply_window, WindowingFunction};
pub use result::SpectrumResult;
pub use analysis::{
    AnalyzerConfig, AnalyzerState, BufferConfig, ReconfigurePolicy, SpectralAnalyzer,
    WindowConfig,
};
