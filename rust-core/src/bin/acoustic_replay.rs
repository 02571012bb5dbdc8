//! Replay a recording (or a synthetic signal) through the spectral analyzer
//!
//! Feeds the samples in fixed-size chunks, the way the acquisition
//! service delivers them, and logs the dominant frequency of every
//! spectrum produced.

use acoustic_vis::audio::generator::two_tone_signal;
use acoustic_vis::{AppConfig, SpectralAnalyzer, WindowingFunction};
use anyhow::{bail, Context, Result};
use clap::Parser;
use hound::{SampleFormat, WavReader};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// Streaming spectrum replay tool
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input recording (.wav); a synthetic two-tone signal is used when absent
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Channel of the recording to analyse
    #[arg(long, default_value_t = 0)]
    channel: u16,

    /// YAML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Window length in milliseconds (overrides the configuration)
    #[arg(long)]
    window_ms: Option<u32>,

    /// Overlap ratio in [0, 1) (overrides the configuration)
    #[arg(long)]
    overlap: Option<f64>,

    /// Windowing function: rectangular, hamming, hanning, bartlett, blackman
    #[arg(short, long, value_parser = parse_windowing_function)]
    window: Option<WindowingFunction>,

    /// Samples delivered per chunk
    #[arg(long, default_value_t = 128)]
    chunk_samples: usize,

    /// Duration of the synthetic signal in seconds
    #[arg(short, long, default_value_t = 2.0)]
    duration: f64,

    /// Seed of the synthetic noise
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn parse_windowing_function(name: &str) -> std::result::Result<WindowingFunction, String> {
    name.parse().map_err(|e: acoustic_vis::AcousticError| e.to_string())
}

/// Read one channel of a WAV file as f64 samples in [-1, 1]
fn read_wav_channel(path: &Path, channel: u16) -> Result<(f64, Vec<f64>)> {
    let mut reader = WavReader::open(path)
        .with_context(|| format!("cannot open recording {}", path.display()))?;
    let spec = reader.spec();

    if channel >= spec.channels {
        bail!(
            "channel {} requested but {} has {} channel(s)",
            channel,
            path.display(),
            spec.channels
        );
    }

    let interleaved: Vec<f64> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<std::result::Result<_, _>>()?,
        SampleFormat::Int => {
            let full_scale = (1_i64 << (spec.bits_per_sample - 1)) as f64;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f64 / full_scale))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    let samples = interleaved
        .iter()
        .skip(channel as usize)
        .step_by(spec.channels as usize)
        .copied()
        .collect();

    Ok((spec.sample_rate as f64, samples))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("cannot load configuration {}", path.display()))?,
        None => AppConfig::default(),
    };

    let samples = match &args.input {
        Some(path) => {
            let (sample_rate, samples) = read_wav_channel(path, args.channel)?;
            config.analyzer.window.sample_rate_hz = sample_rate;
            samples
        }
        None => {
            info!(
                "No input given, generating {} s of synthetic signal (seed {})",
                args.duration, args.seed
            );
            two_tone_signal(config.analyzer.window.sample_rate_hz, args.duration, args.seed)
        }
    };

    if let Some(ms) = args.window_ms {
        config.analyzer.window.window_length_ms = ms;
    }
    if let Some(overlap) = args.overlap {
        config.analyzer.window.window_overlap_ratio = overlap;
    }
    if let Some(window) = args.window {
        config.analyzer.window.windowing_function = window;
    }
    if args.chunk_samples == 0 {
        bail!("chunk size must be positive");
    }

    let mut analyzer = SpectralAnalyzer::new(config.analyzer)?;
    let spectra = analyzer.subscribe();

    info!(
        "Analyzing {} samples at {} Hz: window {} samples, hop {} samples, {} window",
        samples.len(),
        analyzer.sample_rate_hz(),
        analyzer.window_length_samples(),
        analyzer.hop_length_samples(),
        analyzer.windowing_function()
    );

    for chunk in samples.chunks(args.chunk_samples) {
        analyzer.add_signal(chunk)?;

        for spectrum in spectra.try_iter() {
            match spectrum.peak() {
                Some((frequency, amplitude)) => info!(
                    "spectrum #{}: peak {:.1} Hz, amplitude {:.3}",
                    spectrum.sequence, frequency, amplitude
                ),
                None => debug!("spectrum #{} is empty", spectrum.sequence),
            }
        }
    }

    if analyzer.dropped_samples() > 0 {
        warn!(
            "{} samples were dropped; increase the chunk rate or the buffer size",
            analyzer.dropped_samples()
        );
    }

    info!(
        "Done: {} spectra, {} samples left in the buffer",
        analyzer.spectra_emitted(),
        analyzer.buffered_samples()
    );

    Ok(())
}
