//! Synthetic test signals
//!
//! Deterministic tones, seeded Gaussian noise and array-shaped test blocks
//! for exercising the pipeline without hardware.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

use super::acoustic::ArrayGeometry;

/// Sample a sine wave
///
/// # Arguments
/// * `frequency` - Tone frequency in Hz
/// * `amplitude` - Peak amplitude
/// * `sample_rate` - Sample rate in Hz
/// * `num_samples` - Number of samples to generate
pub fn sine(frequency: f64, amplitude: f64, sample_rate: f64, num_samples: usize) -> Vec<f64> {
    (0..num_samples)
        .map(|n| amplitude * (2.0 * PI * frequency * n as f64 / sample_rate).sin())
        .collect()
}

/// Gaussian white noise source (Box-Muller over a seeded RNG)
pub struct GaussianNoise {
    rng: StdRng,
    spare: Option<f64>,
}

impl GaussianNoise {
    /// Create a noise source; equal seeds yield equal sequences
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            spare: None,
        }
    }

    /// Next sample from N(0, 1)
    pub fn next_sample(&mut self) -> f64 {
        if let Some(z) = self.spare.take() {
            return z;
        }

        // u1 in (0, 1] so ln(u1) is finite
        let u1: f64 = 1.0 - self.rng.random::<f64>();
        let u2: f64 = self.rng.random::<f64>();
        let radius = (-2.0 * u1.ln()).sqrt();
        let theta = 2.0 * PI * u2;

        self.spare = Some(radius * theta.sin());
        radius * theta.cos()
    }

    /// Generate `num_samples` values from N(0, std_dev²)
    pub fn generate(&mut self, num_samples: usize, std_dev: f64) -> Vec<f64> {
        (0..num_samples)
            .map(|_| std_dev * self.next_sample())
            .collect()
    }
}

/// Bench signal: 2.0·sin(440 Hz) + 1.0·sin(800 Hz) + N(0, 1)
pub fn two_tone_signal(sample_rate: f64, duration_s: f64, seed: u64) -> Vec<f64> {
    let num_samples = (duration_s * sample_rate) as usize;
    let tone_a = sine(440.0, 2.0, sample_rate, num_samples);
    let tone_b = sine(800.0, 1.0, sample_rate, num_samples);
    let noise = GaussianNoise::new(seed).generate(num_samples, 1.0);

    tone_a
        .iter()
        .zip(tone_b.iter())
        .zip(noise.iter())
        .map(|((a, b), n)| a + b + n)
        .collect()
}

/// Flat array block where every sample of sensor `i` equals `i`
///
/// Laid out as expected by [`deinterleave`](super::acoustic::deinterleave),
/// with the same per-line pattern repeated on every line.
pub fn sensor_ramp_block(geometry: &ArrayGeometry, samples_per_sensor: usize) -> Vec<f64> {
    let sensors = geometry.sensors_per_line();
    let mut block = Vec::with_capacity(geometry.lines * sensors * samples_per_sensor);

    for _line in 0..geometry.lines {
        for sensor in 0..sensors {
            block.extend(std::iter::repeat(sensor as f64).take(samples_per_sensor));
        }
    }

    block
}
