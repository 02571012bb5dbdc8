//! Streaming short-time spectrum analyzer
//!
//! Buffers an incoming sample stream and, once a full window is available,
//! runs one windowed FFT per `add_signal` call, emits the amplitude and
//! phase spectra to every registered listener, then hops the stream forward.

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use std::sync::mpsc;

use super::fft::{frequency_axis, time_axis, FftEngine};
use super::result::SpectrumResult;
use super::windowing::{apply_window, WindowingFunction};
use crate::audio::buffer::{OverflowPolicy, WindowBuffer};
use crate::error::{AcousticError, Result};

/// Milliseconds per second
pub const MS_IN_S: f64 = 1000.0;

/// Default sample rate of the high-frequency sensors
pub const DEFAULT_SAMPLE_RATE_HZ: f64 = 5120.0;

/// Default window length in milliseconds
pub const DEFAULT_WINDOW_LENGTH_MS: u32 = 100;

/// Default ratio used to derive the hop from the window length
pub const DEFAULT_WINDOW_OVERLAP: f64 = 0.75;

/// Window configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Sample rate in Hz, fixed for the lifetime of an analyzer
    pub sample_rate_hz: f64,

    /// Window length in milliseconds
    pub window_length_ms: u32,

    /// Hop length as a fraction of the window length, in [0, 1)
    pub window_overlap_ratio: f64,

    /// Taper applied before the transform
    pub windowing_function: WindowingFunction,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            window_length_ms: DEFAULT_WINDOW_LENGTH_MS,
            window_overlap_ratio: DEFAULT_WINDOW_OVERLAP,
            windowing_function: WindowingFunction::Rectangular,
        }
    }
}

impl WindowConfig {
    /// floor(window_length_ms / 1000 * sample_rate_hz)
    pub fn window_length_samples(&self) -> usize {
        (f64::from(self.window_length_ms) * self.sample_rate_hz / MS_IN_S).floor() as usize
    }

    /// floor(window_length_samples * window_overlap_ratio)
    pub fn hop_length_samples(&self) -> usize {
        (self.window_length_samples() as f64 * self.window_overlap_ratio).floor() as usize
    }

    /// Check every field and the derived window length
    pub fn validate(&self) -> Result<()> {
        if !(self.sample_rate_hz.is_finite() && self.sample_rate_hz > 0.0) {
            return Err(AcousticError::Configuration(format!(
                "sample_rate_hz must be a positive number, got {}",
                self.sample_rate_hz
            )));
        }
        if self.window_length_ms == 0 {
            return Err(AcousticError::Configuration(
                "window_length_ms must be greater than zero".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.window_overlap_ratio) {
            return Err(AcousticError::Configuration(format!(
                "window_overlap_ratio must be in [0, 1), got {}",
                self.window_overlap_ratio
            )));
        }
        if self.window_length_samples() < 1 {
            return Err(AcousticError::Configuration(format!(
                "a {} ms window at {} Hz is shorter than one sample",
                self.window_length_ms, self.sample_rate_hz
            )));
        }
        Ok(())
    }
}

/// Sizing of the internal sample buffer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Retained samples, as a multiple of the window length
    pub max_buffered_windows: usize,

    /// Behaviour when the retained length is exceeded
    pub overflow: OverflowPolicy,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            max_buffered_windows: 8,
            overflow: OverflowPolicy::DropOldest,
        }
    }
}

/// What happens to buffered samples when the window length changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconfigurePolicy {
    /// Keep the stream; the next window is cut with the new length
    #[default]
    KeepBuffered,

    /// Discard the stream so no window mixes old and new configurations
    Flush,
}

/// Spectrum analyzer configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub window: WindowConfig,
    pub buffer: BufferConfig,
    pub reconfigure: ReconfigurePolicy,
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<()> {
        self.window.validate()?;
        if self.buffer.max_buffered_windows < 2 {
            return Err(AcousticError::Configuration(format!(
                "max_buffered_windows must be at least 2, got {}",
                self.buffer.max_buffered_windows
            )));
        }
        Ok(())
    }
}

/// Whether the next `add_signal` can produce a spectrum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzerState {
    /// Fewer than one window of samples buffered
    Accumulating,

    /// At least one full window buffered
    Ready,
}

/// Everything derived from the window configuration, rebuilt as one unit
struct WindowPlan {
    window_length_samples: usize,
    hop_length_samples: usize,
    coefficients: Vec<f64>,
    frequency_axis: Vec<f64>,
    time_axis: Vec<f64>,
    fft_engine: FftEngine,
}

impl WindowPlan {
    fn build(config: &WindowConfig) -> Result<Self> {
        config.validate()?;

        let window_length_samples = config.window_length_samples();
        Ok(Self {
            window_length_samples,
            hop_length_samples: config.hop_length_samples(),
            coefficients: config.windowing_function.generate(window_length_samples),
            frequency_axis: frequency_axis(window_length_samples, config.sample_rate_hz),
            time_axis: time_axis(window_length_samples, config.sample_rate_hz),
            fft_engine: FftEngine::new(window_length_samples),
        })
    }
}

/// Callback invoked synchronously for every emitted spectrum
pub type SpectrumCallback = Box<dyn FnMut(&SpectrumResult) + Send>;

enum Listener {
    Callback(SpectrumCallback),
    Channel(mpsc::Sender<SpectrumResult>),
}

/// Streaming spectrum analyzer for a single channel
///
/// Not internally synchronized: callers must serialize access to one
/// instance (wrap it in a `Mutex` to share it between threads).
pub struct SpectralAnalyzer {
    config: AnalyzerConfig,
    plan: WindowPlan,
    buffer: WindowBuffer,
    listeners: Vec<Listener>,
    spectra_emitted: u64,
}

impl SpectralAnalyzer {
    /// Create new spectral analyzer
    ///
    /// Fails with `AcousticError::Configuration` if the sample rate is not
    /// positive, or the window length or overlap are out of range.
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;

        let plan = WindowPlan::build(&config.window)?;
        let buffer = WindowBuffer::new(
            plan.window_length_samples * config.buffer.max_buffered_windows,
            config.buffer.overflow,
        );

        debug!(
            "Spectral analyzer created: {} Hz, {} ms window ({} samples), hop {} samples, {} window",
            config.window.sample_rate_hz,
            config.window.window_length_ms,
            plan.window_length_samples,
            plan.hop_length_samples,
            config.window.windowing_function
        );

        Ok(Self {
            config,
            plan,
            buffer,
            listeners: Vec::new(),
            spectra_emitted: 0,
        })
    }

    /// Create an analyzer with default window settings at the given sample rate
    pub fn with_sample_rate(sample_rate_hz: f64) -> Result<Self> {
        let mut config = AnalyzerConfig::default();
        config.window.sample_rate_hz = sample_rate_hz;
        Self::new(config)
    }

    /// Push a chunk of samples and run at most one analysis step
    ///
    /// # Returns
    /// `true` if a spectrum was emitted. Only one step runs per call even
    /// when several windows are buffered; the rest wait for later calls.
    ///
    /// Under `OverflowPolicy::DropOldest`, a chunk that does not fit first
    /// completes the window at the front of the stream and runs the step on
    /// it, so eviction never reaches samples that were due for analysis.
    pub fn add_signal(&mut self, chunk: &[f64]) -> Result<bool> {
        let window_length = self.plan.window_length_samples;

        if chunk.len() > self.buffer.free_len()
            && self.buffer.overflow_policy() == OverflowPolicy::DropOldest
        {
            let fill = window_length
                .saturating_sub(self.buffer.len())
                .min(chunk.len());
            self.buffer.append(&chunk[..fill])?;

            let stepped = self.buffer.has_window(window_length);
            if stepped {
                self.step()?;
            }
            self.buffer.append(&chunk[fill..])?;
            return Ok(stepped);
        }

        self.buffer.append(chunk)?;

        if !self.buffer.has_window(window_length) {
            trace!(
                "Accumulating: {} of {} samples buffered",
                self.buffer.len(),
                window_length
            );
            return Ok(false);
        }

        self.step()?;
        Ok(true)
    }

    /// Analyse the window at the front of the stream and hop past it
    fn step(&mut self) -> Result<()> {
        let window = self.buffer.take_window(self.plan.window_length_samples)?;
        let windowed = apply_window(&window, &self.plan.coefficients);
        let bins = self.plan.fft_engine.transform(&windowed)?;

        let spectrum = SpectrumResult::from_bins(
            self.plan.frequency_axis.clone(),
            &bins,
            self.spectra_emitted,
        );
        self.emit(&spectrum);

        self.buffer.advance(self.plan.hop_length_samples)?;
        self.spectra_emitted += 1;

        trace!(
            "Spectrum {} emitted, {} samples left buffered",
            spectrum.sequence,
            self.buffer.len()
        );

        Ok(())
    }

    fn emit(&mut self, spectrum: &SpectrumResult) {
        self.listeners.retain_mut(|listener| match listener {
            Listener::Callback(callback) => {
                callback(spectrum);
                true
            }
            Listener::Channel(sender) => {
                let connected = sender.send(spectrum.clone()).is_ok();
                if !connected {
                    warn!("Spectrum receiver disconnected, removing listener");
                }
                connected
            }
        });
    }

    /// Register a callback for every emitted spectrum
    pub fn on_spectrum<F>(&mut self, callback: F)
    where
        F: FnMut(&SpectrumResult) + Send + 'static,
    {
        self.listeners.push(Listener::Callback(Box::new(callback)));
    }

    /// Register a channel listener and return its receiving end
    pub fn subscribe(&mut self) -> mpsc::Receiver<SpectrumResult> {
        let (sender, receiver) = mpsc::channel();
        self.listeners.push(Listener::Channel(sender));
        receiver
    }

    /// Remove every registered listener
    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Change the window length, recomputing hop, coefficients and axes together
    ///
    /// On error the previous configuration stays in effect.
    pub fn set_window_length(&mut self, window_length_ms: u32) -> Result<()> {
        let mut window = self.config.window.clone();
        window.window_length_ms = window_length_ms;
        self.reconfigure(window)
    }

    /// Change the overlap ratio used to derive the hop length
    pub fn set_window_overlap(&mut self, window_overlap_ratio: f64) -> Result<()> {
        let mut window = self.config.window.clone();
        window.window_overlap_ratio = window_overlap_ratio;
        self.reconfigure(window)
    }

    /// Change the windowing function; only the coefficients are regenerated
    pub fn set_windowing_function(&mut self, windowing_function: WindowingFunction) {
        self.config.window.windowing_function = windowing_function;
        self.plan.coefficients = windowing_function.generate(self.plan.window_length_samples);
        debug!("Windowing function set to {}", windowing_function);
    }

    fn reconfigure(&mut self, window: WindowConfig) -> Result<()> {
        let plan = WindowPlan::build(&window)?;
        let length_changed = plan.window_length_samples != self.plan.window_length_samples;

        self.buffer
            .ensure_capacity(plan.window_length_samples * self.config.buffer.max_buffered_windows);

        if length_changed && self.config.reconfigure == ReconfigurePolicy::Flush {
            debug!(
                "Window length changed, flushing {} buffered samples",
                self.buffer.len()
            );
            self.buffer.clear();
        }

        debug!(
            "Window reconfigured: {} ms ({} samples), hop {} samples",
            window.window_length_ms, plan.window_length_samples, plan.hop_length_samples
        );

        self.config.window = window;
        self.plan = plan;
        Ok(())
    }

    /// Discard buffered samples without touching configuration
    pub fn flush(&mut self) {
        self.buffer.clear();
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn sample_rate_hz(&self) -> f64 {
        self.config.window.sample_rate_hz
    }

    pub fn windowing_function(&self) -> WindowingFunction {
        self.config.window.windowing_function
    }

    pub fn window_length_samples(&self) -> usize {
        self.plan.window_length_samples
    }

    pub fn hop_length_samples(&self) -> usize {
        self.plan.hop_length_samples
    }

    pub fn window_coefficients(&self) -> &[f64] {
        &self.plan.coefficients
    }

    /// Frequency of each output bin in Hz, FFT ordered
    pub fn frequency_axis(&self) -> &[f64] {
        &self.plan.frequency_axis
    }

    /// Time offset of each window sample in seconds
    pub fn time_axis(&self) -> &[f64] {
        &self.plan.time_axis
    }

    pub fn buffered_samples(&self) -> usize {
        self.buffer.len()
    }

    /// Samples evicted because the buffer overflowed
    pub fn dropped_samples(&self) -> u64 {
        self.buffer.dropped_samples()
    }

    pub fn spectra_emitted(&self) -> u64 {
        self.spectra_emitted
    }

    pub fn state(&self) -> AnalyzerState {
        if self.buffer.has_window(self.plan.window_length_samples) {
            AnalyzerState::Ready
        } else {
            AnalyzerState::Accumulating
        }
    }
}
