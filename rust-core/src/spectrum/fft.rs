//! FFT engine using realfft for real-valued signals
//!
//! Produces the full N-bin spectrum in standard FFT order (DC, positive
//! frequencies, then negative frequencies) from a half-length real transform.

use num_complex::Complex64;
use realfft::{RealFftPlanner, RealToComplex};
use std::sync::Arc;

use crate::error::Result;

/// FFT engine for real-valued windows of a fixed length
pub struct FftEngine {
    /// FFT size (number of samples)
    fft_size: usize,

    /// Real FFT processor
    r2c: Arc<dyn RealToComplex<f64>>,

    /// Reusable input buffer (the transform uses it as scratch)
    input_buffer: Vec<f64>,

    /// Reusable half-spectrum buffer, fft_size/2 + 1 bins
    half_spectrum: Vec<Complex64>,
}

impl FftEngine {
    /// Create new FFT engine
    ///
    /// # Arguments
    /// * `fft_size` - FFT size (number of samples), any length ≥ 1
    pub fn new(fft_size: usize) -> Self {
        let mut planner = RealFftPlanner::<f64>::new();
        let r2c = planner.plan_fft_forward(fft_size);

        let input_buffer = r2c.make_input_vec();
        let half_spectrum = r2c.make_output_vec();

        Self {
            fft_size,
            r2c,
            input_buffer,
            half_spectrum,
        }
    }

    /// Compute the complex spectrum of a window
    ///
    /// # Arguments
    /// * `signal` - Input window (zero-padded or truncated to fft_size)
    ///
    /// # Returns
    /// `fft_size` complex bins X[k] in FFT order. Bins above Nyquist are
    /// reconstructed as X[N-k] conjugated, which holds exactly for real input.
    pub fn transform(&mut self, signal: &[f64]) -> Result<Vec<Complex64>> {
        let copy_len = signal.len().min(self.fft_size);
        self.input_buffer[..copy_len].copy_from_slice(&signal[..copy_len]);
        self.input_buffer[copy_len..].fill(0.0);

        self.r2c
            .process(&mut self.input_buffer, &mut self.half_spectrum)?;

        let n = self.fft_size;
        let mut spectrum = Vec::with_capacity(n);
        spectrum.extend_from_slice(&self.half_spectrum[..self.half_spectrum.len().min(n)]);
        for k in spectrum.len()..n {
            spectrum.push(self.half_spectrum[n - k].conj());
        }

        Ok(spectrum)
    }

    /// Get FFT size
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }
}

/// Frequency of every FFT bin in Hz, FFT ordered
///
/// Bin k maps to `k * Sr / N` for `k < ceil(N/2)` and `(k - N) * Sr / N`
/// otherwise, the same layout as numpy's `fftfreq`.
pub fn frequency_axis(fft_size: usize, sample_rate: f64) -> Vec<f64> {
    let n = fft_size as f64;
    let positive = (fft_size + 1) / 2;
    (0..fft_size)
        .map(|k| {
            if k < positive {
                k as f64 * sample_rate / n
            } else {
                (k as f64 - n) * sample_rate / n
            }
        })
        .collect()
}

/// Time offset of every sample in a window, in seconds from its start
pub fn time_axis(window_length: usize, sample_rate: f64) -> Vec<f64> {
    (0..window_length)
        .map(|i| i as f64 / sample_rate)
        .collect()
}
