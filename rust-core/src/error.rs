//! Error types for the acoustic visualization core

use thiserror::Error;

/// Errors raised by the buffering, analysis and ingestion layers
#[derive(Debug, Error)]
pub enum AcousticError {
    /// Invalid or missing configuration (sample rate, window length, overlap)
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A window or hop was requested before enough samples were buffered.
    /// Indicates a logic bug in the caller, never a runtime condition.
    #[error("precondition violated: requested {requested} samples but only {available} are buffered")]
    Precondition { requested: usize, available: usize },

    /// A raw sample block did not match the configured sensor array
    #[error("sample block shape mismatch: expected ({expected_lines}, {expected_sensors}, *) but got {actual:?}")]
    ShapeMismatch {
        expected_lines: usize,
        expected_sensors: usize,
        actual: Vec<usize>,
    },

    /// Feature is stubbed out and intentionally not implemented
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// Ring buffer is full and configured to reject new samples
    #[error("sample buffer overflow: {incoming} incoming samples but only {free} free slots")]
    BufferOverflow { incoming: usize, free: usize },

    /// Sensor index outside of the configured array
    #[error("sensor ({line}, {sensor}) does not exist, array bounds are ({lines}, {sensors_per_line})")]
    SensorOutOfRange {
        line: usize,
        sensor: usize,
        lines: usize,
        sensors_per_line: usize,
    },

    /// X and Y series of different lengths
    #[error("series length mismatch: x has {x} points, y has {y}")]
    LengthMismatch { x: usize, y: usize },

    #[error("FFT processing failed: {0}")]
    Fft(#[from] realfft::FftError),

    #[error("array error: {0}")]
    Array(#[from] ndarray::ShapeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, AcousticError>;
