//! Windowing functions for spectral analysis
//!
//! Tapers applied to a window of samples before the FFT to reduce spectral
//! leakage. Coefficient formulas are the symmetric forms used by numpy.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::error::AcousticError;

/// Windowing function applied before the transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowingFunction {
    /// w[n] = 1 (identity, no tapering)
    #[default]
    Rectangular,

    /// w[n] = 0.54 - 0.46*cos(2πn/(M-1))
    Hamming,

    /// w[n] = 0.5 - 0.5*cos(2πn/(M-1))
    #[serde(alias = "hann")]
    Hanning,

    /// w[n] = 1 - |2n/(M-1) - 1| (triangular, zero endpoints)
    Bartlett,

    /// w[n] = 0.42 - 0.5*cos(2πn/(M-1)) + 0.08*cos(4πn/(M-1))
    Blackman,
}

impl WindowingFunction {
    /// All supported functions, in display order
    pub const ALL: [WindowingFunction; 5] = [
        WindowingFunction::Rectangular,
        WindowingFunction::Hamming,
        WindowingFunction::Hanning,
        WindowingFunction::Bartlett,
        WindowingFunction::Blackman,
    ];

    /// Generate window coefficients
    ///
    /// # Arguments
    /// * `length` - Number of samples (M)
    ///
    /// # Returns
    /// Vector of coefficients w[n] for n = 0..M-1. A length of 1 yields `[1.0]`.
    pub fn generate(self, length: usize) -> Vec<f64> {
        if length == 0 {
            return Vec::new();
        }
        if length == 1 {
            return vec![1.0];
        }

        let denom = (length - 1) as f64;

        match self {
            WindowingFunction::Rectangular => vec![1.0; length],

            WindowingFunction::Hamming => (0..length)
                .map(|n| 0.54 - 0.46 * (2.0 * PI * n as f64 / denom).cos())
                .collect(),

            WindowingFunction::Hanning => (0..length)
                .map(|n| 0.5 - 0.5 * (2.0 * PI * n as f64 / denom).cos())
                .collect(),

            WindowingFunction::Bartlett => (0..length)
                .map(|n| 1.0 - (2.0 * n as f64 / denom - 1.0).abs())
                .collect(),

            WindowingFunction::Blackman => (0..length)
                .map(|n| {
                    let angle = 2.0 * PI * n as f64 / denom;
                    // Clamp tiny negative endpoints produced by rounding
                    (0.42 - 0.5 * angle.cos() + 0.08 * (2.0 * angle).cos()).max(0.0)
                })
                .collect(),
        }
    }

    /// Lowercase name, as accepted by `FromStr` and the YAML configuration
    pub fn name(self) -> &'static str {
        match self {
            WindowingFunction::Rectangular => "rectangular",
            WindowingFunction::Hamming => "hamming",
            WindowingFunction::Hanning => "hanning",
            WindowingFunction::Bartlett => "bartlett",
            WindowingFunction::Blackman => "blackman",
        }
    }
}

impl fmt::Display for WindowingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WindowingFunction {
    type Err = AcousticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rectangular" | "rect" | "none" => Ok(WindowingFunction::Rectangular),
            "hamming" => Ok(WindowingFunction::Hamming),
            "hanning" | "hann" => Ok(WindowingFunction::Hanning),
            "bartlett" | "triangular" => Ok(WindowingFunction::Bartlett),
            "blackman" => Ok(WindowingFunction::Blackman),
            other => Err(AcousticError::Configuration(format!(
                "unknown windowing function '{}'",
                other
            ))),
        }
    }
}

/// Multiply a window of samples by precomputed coefficients
///
/// Both slices are expected to have the same length; extra samples on
/// either side are ignored.
pub fn apply_window(signal: &[f64], coefficients: &[f64]) -> Vec<f64> {
    signal
        .iter()
        .zip(coefficients.iter())
        .map(|(&s, &w)| s * w)
        .collect()
}
