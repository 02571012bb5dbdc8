//! Output of one analysis step

use num_complex::Complex64;
use std::f64::consts::PI;

/// Amplitude and phase spectra of one window, sharing a frequency axis
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumResult {
    /// Bin center frequencies in Hz, FFT ordered
    pub frequency_axis: Vec<f64>,

    /// |X[k]|
    pub amplitude: Vec<f64>,

    /// arg X[k] in radians, range (-π, π]
    pub phase: Vec<f64>,

    /// Zero-based index of this spectrum within its analyzer's output
    pub sequence: u64,
}

impl SpectrumResult {
    /// Derive amplitude and phase from complex FFT bins
    pub fn from_bins(frequency_axis: Vec<f64>, bins: &[Complex64], sequence: u64) -> Self {
        let amplitude = bins.iter().map(|c| c.norm()).collect();
        let phase = bins.iter().map(|c| wrap_phase(c.arg())).collect();

        Self {
            frequency_axis,
            amplitude,
            phase,
            sequence,
        }
    }

    /// (x, y) pair for an amplitude plot
    pub fn amplitude_series(&self) -> (&[f64], &[f64]) {
        (&self.frequency_axis, &self.amplitude)
    }

    /// (x, y) pair for a phase plot
    pub fn phase_series(&self) -> (&[f64], &[f64]) {
        (&self.frequency_axis, &self.phase)
    }

    /// Number of bins
    pub fn len(&self) -> usize {
        self.amplitude.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amplitude.is_empty()
    }

    /// Bin index with the largest amplitude. A real input produces mirrored
    /// bins of equal amplitude; ties resolve to the lowest index.
    pub fn peak_bin(&self) -> Option<usize> {
        self.amplitude
            .iter()
            .enumerate()
            .rev()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(k, _)| k)
    }

    /// Frequency (Hz) and amplitude of the strongest bin
    pub fn peak(&self) -> Option<(f64, f64)> {
        self.peak_bin()
            .map(|k| (self.frequency_axis[k], self.amplitude[k]))
    }
}

/// Map atan2 output onto (-π, π]. atan2(-0.0, x < 0) returns -π.
pub fn wrap_phase(phase: f64) -> f64 {
    if phase <= -PI {
        PI
    } else {
        phase
    }
}
