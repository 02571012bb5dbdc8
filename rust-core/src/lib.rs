//! Acoustic Visualization Core - Streaming Spectral Analysis
//!
//! Buffers streamed acoustic samples, runs a windowed FFT on a rolling
//! window and hands amplitude/phase spectra to plot consumers. Optional
//! Python bindings expose the analyzer to the desktop GUI.

// Suppress PyO3 non-local impl warnings (harmless macro-generated code)
#![cfg_attr(feature = "python", allow(non_local_definitions))]

pub mod audio;
pub mod config;
pub mod error;
pub mod plot;
pub mod spectrum;

#[cfg(feature = "python")]
pub mod python_bindings;

pub use audio::{AcousticHandler, ArrayGeometry, SensorId, WindowBuffer};
pub use config::AppConfig;
pub use error::{AcousticError, Result};
pub use spectrum::{AnalyzerConfig, SpectralAnalyzer, SpectrumResult, WindowingFunction};
