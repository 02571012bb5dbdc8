//! Cache of raw multi-sensor samples
//!
//! Holds every received block as one `(lines, sensors_per_line, samples)`
//! array, grown along the time axis.

use log::debug;
use ndarray::{concatenate, s, Array3, ArrayView1, ArrayView3, Axis};
use std::path::Path;

use super::acoustic::SensorId;
use crate::error::{AcousticError, Result};

/// Growing raw sample cache
#[derive(Debug, Clone)]
pub struct RawChannelCache {
    lines: usize,
    sensors_per_line: usize,
    data: Array3<f64>,
}

impl RawChannelCache {
    /// Create an empty cache for an array of `lines` x `sensors_per_line`
    pub fn new(lines: usize, sensors_per_line: usize) -> Self {
        Self {
            lines,
            sensors_per_line,
            data: Array3::zeros((lines, sensors_per_line, 0)),
        }
    }

    /// Append a block of shape `(lines, sensors_per_line, n)`
    ///
    /// A block with any other leading dimensions is rejected and the cache
    /// is left unchanged.
    pub fn append(&mut self, block: ArrayView3<'_, f64>) -> Result<()> {
        let shape = block.shape();
        if shape[0] != self.lines || shape[1] != self.sensors_per_line {
            return Err(AcousticError::ShapeMismatch {
                expected_lines: self.lines,
                expected_sensors: self.sensors_per_line,
                actual: shape.to_vec(),
            });
        }

        let grown = concatenate(Axis(2), &[self.data.view(), block.view()])?;
        self.data = grown;
        debug!(
            "Cached {} samples per channel ({} total)",
            block.len_of(Axis(2)),
            self.samples_per_channel()
        );
        Ok(())
    }

    /// Full time series of one sensor
    pub fn channel(&self, sensor: SensorId) -> Result<ArrayView1<'_, f64>> {
        self.check_sensor(sensor)?;
        Ok(self.data.slice(s![sensor.line, sensor.sensor, ..]))
    }

    fn check_sensor(&self, sensor: SensorId) -> Result<()> {
        if sensor.line >= self.lines || sensor.sensor >= self.sensors_per_line {
            return Err(AcousticError::SensorOutOfRange {
                line: sensor.line,
                sensor: sensor.sensor,
                lines: self.lines,
                sensors_per_line: self.sensors_per_line,
            });
        }
        Ok(())
    }

    /// Export cached samples to a file. Not implemented yet.
    pub fn export<P: AsRef<Path>>(&self, _path: P) -> Result<()> {
        Err(AcousticError::Unsupported("raw channel export"))
    }

    /// Number of samples cached for each sensor
    pub fn samples_per_channel(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    /// (lines, sensors_per_line, samples)
    pub fn shape(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Read-only view of the whole cache
    pub fn data(&self) -> ArrayView3<'_, f64> {
        self.data.view()
    }

    pub fn is_empty(&self) -> bool {
        self.samples_per_channel() == 0
    }

    /// Drop all cached samples
    pub fn clear(&mut self) {
        self.data = Array3::zeros((self.lines, self.sensors_per_line, 0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(lines: usize, sensors: usize, n: usize, offset: f64) -> Array3<f64> {
        Array3::from_shape_fn((lines, sensors, n), |(l, c, t)| {
            offset + (l * 1000 + c * 10) as f64 + t as f64
        })
    }

    #[test]
    fn test_append_grows_time_axis() {
        let mut cache = RawChannelCache::new(2, 4);
        assert!(cache.is_empty());

        cache.append(block(2, 4, 3, 0.0).view()).unwrap();
        cache.append(block(2, 4, 2, 100.0).view()).unwrap();

        assert_eq!(cache.shape(), (2, 4, 5));
        let channel = cache.channel(SensorId::new(1, 2)).unwrap();
        assert_eq!(
            channel.to_vec(),
            vec![1020.0, 1021.0, 1022.0, 1120.0, 1121.0]
        );
    }

    #[test]
    fn test_shape_rejection_leaves_cache_unchanged() {
        let mut cache = RawChannelCache::new(2, 71);
        cache.append(block(2, 71, 4, 0.0).view()).unwrap();
        let before = cache.data().to_owned();

        let err = cache.append(block(2, 3, 10, 0.0).view()).unwrap_err();
        match err {
            AcousticError::ShapeMismatch {
                expected_lines,
                expected_sensors,
                actual,
            } => {
                assert_eq!((expected_lines, expected_sensors), (2, 71));
                assert_eq!(actual, vec![2, 3, 10]);
            }
            other => panic!("expected shape mismatch, got {:?}", other),
        }

        assert_eq!(cache.data(), before.view());
    }

    #[test]
    fn test_channel_out_of_range() {
        let cache = RawChannelCache::new(2, 4);
        assert!(matches!(
            cache.channel(SensorId::new(2, 0)),
            Err(AcousticError::SensorOutOfRange { .. })
        ));
        assert!(cache.channel(SensorId::new(0, 4)).is_err());
        assert_eq!(cache.channel(SensorId::new(1, 3)).unwrap().len(), 0);
    }

    #[test]
    fn test_export_is_unsupported() {
        let cache = RawChannelCache::new(1, 1);
        assert!(matches!(
            cache.export("out.bin"),
            Err(AcousticError::Unsupported(_))
        ));
    }

    #[test]
    fn test_clear() {
        let mut cache = RawChannelCache::new(1, 2);
        cache.append(block(1, 2, 8, 0.0).view()).unwrap();
        cache.clear();
        assert_eq!(cache.shape(), (1, 2, 0));
    }
}
