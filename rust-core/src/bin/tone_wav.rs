//! Sine tone generator for replay testing

use acoustic_vis::audio::generator::sine;
use anyhow::{bail, Result};
use clap::Parser;
use hound::{SampleFormat, WavSpec, WavWriter};
use log::info;
use std::path::PathBuf;

/// Write a mono 32-bit float sine tone
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output file path (.wav)
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Tone frequency in Hz
    #[arg(short, long, default_value_t = 440.0)]
    frequency: f64,

    /// Duration in seconds
    #[arg(short, long, default_value_t = 2.0)]
    duration: f64,

    /// Sample rate in Hz
    #[arg(short, long, default_value_t = 44100)]
    sample_rate: u32,

    /// Peak amplitude (0.0 to 1.0)
    #[arg(short, long, default_value_t = 0.5)]
    amplitude: f64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.amplitude <= 0.0 || args.amplitude > 1.0 {
        bail!("amplitude must be in (0, 1]");
    }
    if args.frequency <= 0.0 || args.frequency >= args.sample_rate as f64 / 2.0 {
        bail!("frequency must be between 0 and Nyquist ({} Hz)", args.sample_rate / 2);
    }

    let spec = WavSpec {
        channels: 1,
        sample_rate: args.sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let num_samples = (args.duration * args.sample_rate as f64) as usize;
    let tone = sine(args.frequency, args.amplitude, args.sample_rate as f64, num_samples);

    let mut writer = WavWriter::create(&args.output, spec)?;
    for sample in tone {
        writer.write_sample(sample as f32)?;
    }
    writer.finalize()?;

    info!(
        "Wrote {} samples of {} Hz to {}",
        num_samples,
        args.frequency,
        args.output.display()
    );

    Ok(())
}
