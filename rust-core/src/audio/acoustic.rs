//! Multi-sensor acoustic data handling
//!
//! Receives interleaved sample blocks from the sensor array, reshapes them
//! into per-sensor time series, caches them, and feeds the active sensor to
//! a spectral analyzer.

use log::{debug, trace};
use ndarray::{s, Array3};
use serde::{Deserialize, Serialize};

use super::cache::RawChannelCache;
use crate::error::{AcousticError, Result};
use crate::spectrum::{AnalyzerConfig, SpectralAnalyzer};

/// Low-frequency channels on each side of a line
pub const NUMBER_LF_CHANNELS_PER_LINE: usize = 40;

/// High-frequency channels in the middle of a line
pub const NUMBER_HF_CHANNELS_PER_LINE: usize = 32;

/// Hydrophone lines in the array
pub const DEFAULT_NUMBER_LINES: usize = 2;

/// Layout of the sensor array
///
/// Each line carries a low-frequency group, a high-frequency group, then a
/// second low-frequency group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrayGeometry {
    pub lines: usize,
    pub lf_channels_per_line: usize,
    pub hf_channels_per_line: usize,
}

impl Default for ArrayGeometry {
    fn default() -> Self {
        Self {
            lines: DEFAULT_NUMBER_LINES,
            lf_channels_per_line: NUMBER_LF_CHANNELS_PER_LINE,
            hf_channels_per_line: NUMBER_HF_CHANNELS_PER_LINE,
        }
    }
}

impl ArrayGeometry {
    /// lf + hf + lf
    pub fn sensors_per_line(&self) -> usize {
        2 * self.lf_channels_per_line + self.hf_channels_per_line
    }

    /// Sensors across all lines
    pub fn total_sensors(&self) -> usize {
        self.lines * self.sensors_per_line()
    }

    pub fn contains(&self, sensor: SensorId) -> bool {
        sensor.line < self.lines && sensor.sensor < self.sensors_per_line()
    }

    pub fn validate(&self) -> Result<()> {
        if self.total_sensors() == 0 {
            return Err(AcousticError::Configuration(format!(
                "sensor array must have at least one sensor, got {:?}",
                self
            )));
        }
        Ok(())
    }
}

/// Position of one sensor in the array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SensorId {
    pub line: usize,
    pub sensor: usize,
}

impl SensorId {
    pub fn new(line: usize, sensor: usize) -> Self {
        Self { line, sensor }
    }
}

/// Reshape a flat block into `(lines, sensors_per_line, samples)`
///
/// The flat layout is row-major: all samples of line 0 sensor 0, then line 0
/// sensor 1, and so on.
pub fn deinterleave(samples: &[f64], geometry: &ArrayGeometry) -> Result<Array3<f64>> {
    let lines = geometry.lines;
    let sensors = geometry.sensors_per_line();
    let per_block = lines * sensors;

    if per_block == 0 || samples.len() % per_block != 0 {
        return Err(AcousticError::ShapeMismatch {
            expected_lines: lines,
            expected_sensors: sensors,
            actual: vec![samples.len()],
        });
    }

    let time = samples.len() / per_block;
    Ok(Array3::from_shape_vec((lines, sensors, time), samples.to_vec())?)
}

/// Routes array data into the raw cache and the active sensor's analyzer
pub struct AcousticHandler {
    geometry: ArrayGeometry,
    cache: RawChannelCache,
    analyzer: SpectralAnalyzer,
    active_sensor: SensorId,
}

impl AcousticHandler {
    /// Create new acoustic handler with sensor (0, 0) active
    pub fn new(geometry: ArrayGeometry, analyzer_config: AnalyzerConfig) -> Result<Self> {
        geometry.validate()?;
        let analyzer = SpectralAnalyzer::new(analyzer_config)?;

        Ok(Self {
            cache: RawChannelCache::new(geometry.lines, geometry.sensors_per_line()),
            geometry,
            analyzer,
            active_sensor: SensorId::default(),
        })
    }

    /// Handle one acoustic data message
    ///
    /// The analyzer sees the message before the cache does, so a message it
    /// rejects leaves both untouched.
    ///
    /// # Returns
    /// `true` if the active sensor's samples completed a spectrum
    pub fn ingest(&mut self, samples: &[f64]) -> Result<bool> {
        let block = deinterleave(samples, &self.geometry)?;

        let SensorId { line, sensor } = self.active_sensor;
        let channel = block.slice(s![line, sensor, ..]).to_vec();
        trace!(
            "Forwarding {} samples from sensor ({}, {})",
            channel.len(),
            line,
            sensor
        );

        let emitted = self.analyzer.add_signal(&channel)?;
        self.cache.append(block.view())?;
        Ok(emitted)
    }

    /// Select the sensor whose samples feed the analyzer
    pub fn set_active_sensor(&mut self, sensor: SensorId) -> Result<()> {
        if !self.geometry.contains(sensor) {
            return Err(AcousticError::SensorOutOfRange {
                line: sensor.line,
                sensor: sensor.sensor,
                lines: self.geometry.lines,
                sensors_per_line: self.geometry.sensors_per_line(),
            });
        }

        if sensor != self.active_sensor {
            debug!(
                "Active sensor changed to ({}, {}), flushing analyzer",
                sensor.line, sensor.sensor
            );
            self.analyzer.flush();
        }
        self.active_sensor = sensor;
        Ok(())
    }

    pub fn active_sensor(&self) -> SensorId {
        self.active_sensor
    }

    pub fn geometry(&self) -> &ArrayGeometry {
        &self.geometry
    }

    pub fn cache(&self) -> &RawChannelCache {
        &self.cache
    }

    pub fn analyzer(&self) -> &SpectralAnalyzer {
        &self.analyzer
    }

    pub fn analyzer_mut(&mut self) -> &mut SpectralAnalyzer {
        &mut self.analyzer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::buffer::OverflowPolicy;
    use crate::audio::generator::sensor_ramp_block;

    fn small_geometry() -> ArrayGeometry {
        ArrayGeometry {
            lines: 2,
            lf_channels_per_line: 1,
            hf_channels_per_line: 1,
        }
    }

    #[test]
    fn test_default_geometry() {
        let geometry = ArrayGeometry::default();
        assert_eq!(geometry.sensors_per_line(), 112);
        assert_eq!(geometry.total_sensors(), 224);
    }

    #[test]
    fn test_deinterleave_layout() {
        let geometry = small_geometry();
        let flat: Vec<f64> = (0..12).map(|i| i as f64).collect();
        let block = deinterleave(&flat, &geometry).unwrap();

        assert_eq!(block.dim(), (2, 3, 2));
        assert_eq!(block[[0, 0, 0]], 0.0);
        assert_eq!(block[[0, 0, 1]], 1.0);
        assert_eq!(block[[0, 1, 0]], 2.0);
        assert_eq!(block[[1, 0, 0]], 6.0);
        assert_eq!(block[[1, 2, 1]], 11.0);
    }

    #[test]
    fn test_deinterleave_rejects_partial_block() {
        let geometry = small_geometry();
        let err = deinterleave(&[0.0; 7], &geometry).unwrap_err();
        assert!(matches!(err, AcousticError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_ingest_caches_and_forwards_active_sensor() {
        let geometry = ArrayGeometry::default();
        let mut handler = AcousticHandler::new(geometry, AnalyzerConfig::default()).unwrap();
        handler.set_active_sensor(SensorId::new(1, 5)).unwrap();

        // One second of data per sensor at 5120 Hz, sensor i carries value i
        let samples = sensor_ramp_block(&geometry, 5120);
        assert!(handler.ingest(&samples).unwrap());

        assert_eq!(handler.cache().shape(), (2, 112, 5120));
        let channel = handler.cache().channel(SensorId::new(1, 5)).unwrap();
        assert!(channel.iter().all(|&v| v == 5.0));
        assert_eq!(handler.analyzer().spectra_emitted(), 1);

        // Constant input: all energy in the DC bin, 512 * 5
        let receiver = handler.analyzer_mut().subscribe();
        assert!(handler.ingest(&samples).unwrap());
        let spectrum = receiver.try_recv().unwrap();
        assert_eq!(spectrum.peak_bin(), Some(0));
        assert!((spectrum.amplitude[0] - 2560.0).abs() < 1e-6);
    }

    #[test]
    fn test_set_active_sensor_bounds() {
        let mut handler =
            AcousticHandler::new(small_geometry(), AnalyzerConfig::default()).unwrap();

        let err = handler.set_active_sensor(SensorId::new(0, 3)).unwrap_err();
        assert!(matches!(err, AcousticError::SensorOutOfRange { sensors_per_line: 3, .. }));
        assert!(handler.set_active_sensor(SensorId::new(2, 0)).is_err());
        assert_eq!(handler.active_sensor(), SensorId::new(0, 0));

        handler.set_active_sensor(SensorId::new(1, 2)).unwrap();
        assert_eq!(handler.active_sensor(), SensorId::new(1, 2));
    }

    #[test]
    fn test_switching_sensor_flushes_analyzer() {
        let mut handler =
            AcousticHandler::new(small_geometry(), AnalyzerConfig::default()).unwrap();

        handler.ingest(&vec![1.0; 3 * 2 * 100]).unwrap();
        assert_eq!(handler.analyzer().buffered_samples(), 100);

        handler.set_active_sensor(SensorId::new(0, 0)).unwrap();
        assert_eq!(handler.analyzer().buffered_samples(), 100);

        handler.set_active_sensor(SensorId::new(0, 1)).unwrap();
        assert_eq!(handler.analyzer().buffered_samples(), 0);
    }

    #[test]
    fn test_bad_block_is_rejected_without_side_effects() {
        let mut handler =
            AcousticHandler::new(small_geometry(), AnalyzerConfig::default()).unwrap();
        assert!(handler.ingest(&[0.0; 5]).is_err());
        assert!(handler.cache().is_empty());
        assert_eq!(handler.analyzer().buffered_samples(), 0);
    }

    #[test]
    fn test_rejected_message_leaves_cache_unchanged() {
        let mut config = AnalyzerConfig::default();
        config.buffer.max_buffered_windows = 2;
        config.buffer.overflow = OverflowPolicy::Reject;
        let geometry = small_geometry();
        let mut handler = AcousticHandler::new(geometry, config).unwrap();

        // 2000 samples per sensor against a 1024-sample analyzer buffer
        let oversized = sensor_ramp_block(&geometry, 2000);
        let err = handler.ingest(&oversized).unwrap_err();
        assert!(matches!(err, AcousticError::BufferOverflow { incoming: 2000, free: 1024 }));
        assert!(handler.cache().is_empty());
        assert_eq!(handler.analyzer().buffered_samples(), 0);

        // Retrying with a message that fits caches it exactly once
        handler.ingest(&sensor_ramp_block(&geometry, 600)).unwrap();
        assert_eq!(handler.cache().samples_per_channel(), 600);
        assert_eq!(handler.analyzer().buffered_samples(), 600 - 384);
    }
}
