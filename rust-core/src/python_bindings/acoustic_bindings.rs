//! Python bindings for multi-sensor acoustic data

use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::prelude::*;
use std::sync::mpsc;

use super::spectrum_bindings::{readonly_slice, spectrum_to_py, PySpectrum};
use crate::audio::{AcousticHandler, ArrayGeometry, SensorId};
use crate::config::AppConfig;
use crate::spectrum::SpectrumResult;

/// Acoustic handler exposed to Python
///
/// Receives whole array messages, keeps the raw cache and analyses the
/// active sensor.
#[pyclass(name = "AcousticHandler")]
pub struct PyAcousticHandler {
    handler: AcousticHandler,
    spectra: mpsc::Receiver<SpectrumResult>,
}

impl PyAcousticHandler {
    fn from_config(config: AppConfig) -> PyResult<Self> {
        config.validate()?;
        let mut handler = AcousticHandler::new(config.array, config.analyzer)?;
        handler.set_active_sensor(config.active_sensor)?;
        let spectra = handler.analyzer_mut().subscribe();
        Ok(Self { handler, spectra })
    }
}

#[pymethods]
impl PyAcousticHandler {
    /// Create a new acoustic handler
    ///
    /// Args:
    ///     sample_rate: Sample rate in Hz
    ///     lines: Number of sensor lines
    ///     lf_channels: Low-frequency channels per group
    ///     hf_channels: High-frequency channels per line
    #[new]
    #[pyo3(signature = (sample_rate=5120.0, lines=2, lf_channels=40, hf_channels=32))]
    fn new(sample_rate: f64, lines: usize, lf_channels: usize, hf_channels: usize) -> PyResult<Self> {
        let mut config = AppConfig::default();
        config.analyzer.window.sample_rate_hz = sample_rate;
        config.array = ArrayGeometry {
            lines,
            lf_channels_per_line: lf_channels,
            hf_channels_per_line: hf_channels,
        };
        Self::from_config(config)
    }

    /// Load handler settings from a YAML configuration file
    #[staticmethod]
    fn from_yaml_file(path: &str) -> PyResult<Self> {
        Self::from_config(AppConfig::from_file(path)?)
    }

    /// Handle one acoustic data message (flat, row-major array block)
    ///
    /// Returns:
    ///     True if the active sensor produced a new spectrum
    fn retrieve_acoustic_data(&mut self, data: PyReadonlyArray1<f64>) -> PyResult<bool> {
        let samples = readonly_slice(&data)?;
        Ok(self.handler.ingest(samples)?)
    }

    /// Select the sensor used for FFTs
    fn set_active_sensor(&mut self, line: usize, sensor: usize) -> PyResult<()> {
        Ok(self.handler.set_active_sensor(SensorId::new(line, sensor))?)
    }

    /// Cached time series of one sensor
    fn get_channel_data<'py>(
        &self,
        py: Python<'py>,
        line: usize,
        sensor: usize,
    ) -> PyResult<&'py PyArray1<f64>> {
        let channel = self.handler.cache().channel(SensorId::new(line, sensor))?;
        Ok(PyArray1::from_vec(py, channel.to_vec()))
    }

    /// Export cached data (not implemented, always raises)
    fn export_cached_acoustic_data(&self, path: &str) -> PyResult<()> {
        Ok(self.handler.cache().export(path)?)
    }

    /// Drain queued spectra of the active sensor
    fn take_spectra<'py>(&mut self, py: Python<'py>) -> Vec<PySpectrum<'py>> {
        self.spectra
            .try_iter()
            .map(|spectrum| spectrum_to_py(py, spectrum))
            .collect()
    }

    /// Window length in milliseconds of the active sensor's analyzer
    fn set_window_length(&mut self, window_length_ms: u32) -> PyResult<()> {
        Ok(self.handler.analyzer_mut().set_window_length(window_length_ms)?)
    }

    #[getter]
    fn samples_per_channel(&self) -> usize {
        self.handler.cache().samples_per_channel()
    }
}
