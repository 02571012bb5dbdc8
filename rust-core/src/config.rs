//! Application configuration
//!
//! Groups analyzer and sensor array settings into one structure that can be
//! stored as YAML. Missing fields fall back to their defaults.
//!
//! ```yaml
//! analyzer:
//!   window:
//!     sample_rate_hz: 5120.0
//!     window_length_ms: 100
//!     window_overlap_ratio: 0.75
//!     windowing_function: hanning
//!   buffer:
//!     max_buffered_windows: 8
//!     overflow: drop_oldest
//!   reconfigure: keep_buffered
//! array:
//!   lines: 2
//!   lf_channels_per_line: 40
//!   hf_channels_per_line: 32
//! active_sensor:
//!   line: 0
//!   sensor: 0
//! ```

use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::audio::acoustic::{ArrayGeometry, SensorId};
use crate::error::{AcousticError, Result};
use crate::spectrum::AnalyzerConfig;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Spectral analyzer settings
    pub analyzer: AnalyzerConfig,

    /// Sensor array layout
    pub array: ArrayGeometry,

    /// Sensor routed to the analyzer
    pub active_sensor: SensorId,
}

impl AppConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = serde_yml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading configuration from {:?}", path);
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Serialize to YAML
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yml::to_string(self)?)
    }

    /// Save the configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = self.to_yaml_string()?;
        fs::write(path.as_ref(), yaml)?;
        debug!("Configuration written to {:?}", path.as_ref());
        Ok(())
    }

    /// Check the analyzer settings and that the active sensor exists
    pub fn validate(&self) -> Result<()> {
        self.analyzer.validate()?;
        self.array.validate()?;

        if !self.array.contains(self.active_sensor) {
            return Err(AcousticError::Configuration(format!(
                "active sensor ({}, {}) is outside the {} x {} array",
                self.active_sensor.line,
                self.active_sensor.sensor,
                self.array.lines,
                self.array.sensors_per_line()
            )));
        }
        Ok(())
    }
}
