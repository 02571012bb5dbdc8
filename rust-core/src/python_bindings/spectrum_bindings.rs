//! Python bindings for spectrum analysis

use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use std::sync::mpsc;

use super::windowing_bindings::PyWindowingFunction;
use crate::spectrum::{AnalyzerConfig, SpectralAnalyzer, SpectrumResult, WindowConfig};

/// (frequency_axis, amplitude, phase) as numpy arrays
pub(crate) type PySpectrum<'py> = (&'py PyArray1<f64>, &'py PyArray1<f64>, &'py PyArray1<f64>);

pub(crate) fn spectrum_to_py<'py>(py: Python<'py>, spectrum: SpectrumResult) -> PySpectrum<'py> {
    (
        PyArray1::from_vec(py, spectrum.frequency_axis),
        PyArray1::from_vec(py, spectrum.amplitude),
        PyArray1::from_vec(py, spectrum.phase),
    )
}

pub(crate) fn readonly_slice<'a>(signal: &'a PyReadonlyArray1<f64>) -> PyResult<&'a [f64]> {
    signal
        .as_slice()
        .map_err(|e| PyValueError::new_err(format!("signal must be contiguous: {}", e)))
}

/// Streaming spectral analyzer exposed to Python
///
/// Spectra are queued internally; the GUI drains them with `take_spectra`.
#[pyclass(name = "SpectralAnalyzer")]
pub struct PySpectralAnalyzer {
    analyzer: SpectralAnalyzer,
    spectra: mpsc::Receiver<SpectrumResult>,
}

#[pymethods]
impl PySpectralAnalyzer {
    /// Create a new spectral analyzer
    ///
    /// Args:
    ///     sample_rate: Sample rate in Hz
    ///     window_length_ms: Window length in milliseconds
    ///     window_overlap: Hop length as a fraction of the window length
    ///     windowing_function: Taper applied before the FFT
    #[new]
    #[pyo3(signature = (sample_rate, window_length_ms=100, window_overlap=0.75, windowing_function=PyWindowingFunction::Rectangular))]
    fn new(
        sample_rate: f64,
        window_length_ms: u32,
        window_overlap: f64,
        windowing_function: PyWindowingFunction,
    ) -> PyResult<Self> {
        let config = AnalyzerConfig {
            window: WindowConfig {
                sample_rate_hz: sample_rate,
                window_length_ms,
                window_overlap_ratio: window_overlap,
                windowing_function: windowing_function.into(),
            },
            ..AnalyzerConfig::default()
        };

        let mut analyzer = SpectralAnalyzer::new(config)?;
        let spectra = analyzer.subscribe();
        Ok(Self { analyzer, spectra })
    }

    /// Add samples; runs at most one FFT step
    ///
    /// Returns:
    ///     True if a new spectrum is available
    fn add_signal(&mut self, signal: PyReadonlyArray1<f64>) -> PyResult<bool> {
        let samples = readonly_slice(&signal)?;
        Ok(self.analyzer.add_signal(samples)?)
    }

    /// Drain queued spectra
    ///
    /// Returns:
    ///     List of (frequency_axis, amplitude, phase) numpy array tuples
    fn take_spectra<'py>(&mut self, py: Python<'py>) -> Vec<PySpectrum<'py>> {
        self.spectra
            .try_iter()
            .map(|spectrum| spectrum_to_py(py, spectrum))
            .collect()
    }

    /// Set window length in milliseconds
    fn set_window_length(&mut self, window_length_ms: u32) -> PyResult<()> {
        Ok(self.analyzer.set_window_length(window_length_ms)?)
    }

    /// Set overlap ratio
    fn set_window_overlap(&mut self, window_overlap: f64) -> PyResult<()> {
        Ok(self.analyzer.set_window_overlap(window_overlap)?)
    }

    /// Set windowing function
    fn set_windowing_function(&mut self, windowing_function: PyWindowingFunction) {
        self.analyzer.set_windowing_function(windowing_function.into());
    }

    /// Frequency axis in Hz, FFT ordered
    fn frequency_axis<'py>(&self, py: Python<'py>) -> &'py PyArray1<f64> {
        PyArray1::from_slice(py, self.analyzer.frequency_axis())
    }

    /// Time axis of one window in seconds
    fn time_axis<'py>(&self, py: Python<'py>) -> &'py PyArray1<f64> {
        PyArray1::from_slice(py, self.analyzer.time_axis())
    }

    #[getter]
    fn window_length_samples(&self) -> usize {
        self.analyzer.window_length_samples()
    }

    #[getter]
    fn hop_length_samples(&self) -> usize {
        self.analyzer.hop_length_samples()
    }

    #[getter]
    fn sample_rate(&self) -> f64 {
        self.analyzer.sample_rate_hz()
    }

    #[getter]
    fn buffered_samples(&self) -> usize {
        self.analyzer.buffered_samples()
    }
}
