//! End-to-end tests of the streaming pipeline

use acoustic_vis::audio::generator::{sine, two_tone_signal};
use acoustic_vis::{
    AcousticError, AcousticHandler, AnalyzerConfig, AppConfig, SensorId, SpectralAnalyzer,
    SpectrumResult, WindowingFunction,
};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::Path;
use std::sync::{Arc, Mutex};

fn write_tone_wav(path: &Path, frequency: f64, sample_rate: u32, num_samples: usize) {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for sample in sine(frequency, 0.5, sample_rate as f64, num_samples) {
        writer.write_sample(sample as f32).unwrap();
    }
    writer.finalize().unwrap();
}

fn analyzer_config(sample_rate_hz: f64, window_length_ms: u32, overlap: f64) -> AnalyzerConfig {
    let mut config = AnalyzerConfig::default();
    config.window.sample_rate_hz = sample_rate_hz;
    config.window.window_length_ms = window_length_ms;
    config.window.window_overlap_ratio = overlap;
    config
}

fn assert_peak_near(spectrum: &SpectrumResult, expected_hz: f64, tolerance_hz: f64) {
    let (frequency, _) = spectrum.peak().unwrap();
    assert!(
        (frequency.abs() - expected_hz).abs() <= tolerance_hz,
        "peak at {} Hz, expected {} Hz",
        frequency,
        expected_hz
    );
}

#[test]
fn test_recorded_tone_replay() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tone.wav");
    write_tone_wav(&path, 1000.0, 8000, 16000);

    let mut reader = WavReader::open(&path).unwrap();
    let sample_rate = reader.spec().sample_rate as f64;
    let samples: Vec<f64> = reader
        .samples::<f32>()
        .map(|s| s.unwrap() as f64)
        .collect();
    assert_eq!(samples.len(), 16000);

    // 100 ms at 8 kHz: 800 samples, 10 Hz bins, hop 600
    let mut analyzer = SpectralAnalyzer::new(analyzer_config(sample_rate, 100, 0.75)).unwrap();
    assert_eq!(analyzer.window_length_samples(), 800);
    assert_eq!(analyzer.hop_length_samples(), 600);
    let spectra = analyzer.subscribe();

    for chunk in samples.chunks(200) {
        analyzer.add_signal(chunk).unwrap();
    }

    let received: Vec<SpectrumResult> = spectra.try_iter().collect();
    assert!(!received.is_empty());
    assert_eq!(received.len() as u64, analyzer.spectra_emitted());
    for (expected_sequence, spectrum) in received.iter().enumerate() {
        assert_eq!(spectrum.sequence, expected_sequence as u64);
        assert_eq!(spectrum.len(), 800);
        assert_peak_near(spectrum, 1000.0, 1e-9);
    }
    assert_eq!(analyzer.dropped_samples(), 0);
}

#[test]
fn test_two_tone_with_noise_shows_both_tones() {
    let sample_rate = 5120.0;
    let signal = two_tone_signal(sample_rate, 1.0, 7);

    let mut config = analyzer_config(sample_rate, 500, 0.5);
    config.window.windowing_function = WindowingFunction::Hanning;
    let mut analyzer = SpectralAnalyzer::new(config).unwrap();

    let last = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&last);
    analyzer.on_spectrum(move |spectrum| {
        *sink.lock().unwrap() = Some(spectrum.clone());
    });

    for chunk in signal.chunks(256) {
        analyzer.add_signal(chunk).unwrap();
    }

    let spectrum = last.lock().unwrap().clone().unwrap();
    assert_peak_near(&spectrum, 440.0, 2.0);

    // 2 Hz resolution: 800 Hz sits at bin 400
    let at_800 = spectrum.amplitude[400];
    let noise_floor = spectrum.amplitude[200];
    assert!(at_800 > 10.0 * noise_floor);
}

#[test]
fn test_reconfigure_mid_stream() {
    let sample_rate = 5120.0;
    let mut analyzer = SpectralAnalyzer::new(analyzer_config(sample_rate, 100, 0.75)).unwrap();
    let spectra = analyzer.subscribe();

    let tone = sine(640.0, 1.0, sample_rate, 4096);
    analyzer.add_signal(&tone[..1024]).unwrap();
    assert_eq!(spectra.try_iter().last().unwrap().len(), 512);

    analyzer.set_window_length(50).unwrap();
    assert_eq!(analyzer.window_length_samples(), 256);
    assert_eq!(analyzer.frequency_axis().len(), 256);

    analyzer.add_signal(&tone[1024..]).unwrap();
    let spectrum = spectra.try_iter().last().unwrap();
    assert_eq!(spectrum.len(), 256);
    assert_peak_near(&spectrum, 640.0, 1e-9);
}

#[test]
fn test_handler_from_yaml_routes_active_sensor() {
    let yaml = r#"
analyzer:
  window:
    sample_rate_hz: 1024.0
    window_length_ms: 250
    window_overlap_ratio: 0.5
array:
  lines: 2
  lf_channels_per_line: 2
  hf_channels_per_line: 1
active_sensor:
  line: 1
  sensor: 3
"#;
    let config = AppConfig::from_yaml_str(yaml).unwrap();
    let mut handler = AcousticHandler::new(config.array.clone(), config.analyzer.clone()).unwrap();
    handler.set_active_sensor(config.active_sensor).unwrap();
    let spectra = handler.analyzer_mut().subscribe();

    let geometry = handler.geometry().clone();
    assert_eq!(geometry.sensors_per_line(), 5);

    // 256-sample windows at 1024 Hz: 4 Hz bins, 64 Hz tone at bin 16
    let samples_per_message = 128;
    let tone = sine(64.0, 1.0, 1024.0, samples_per_message * 8);
    for (message_index, tone_chunk) in tone.chunks(samples_per_message).enumerate() {
        let mut message = Vec::new();
        for line in 0..geometry.lines {
            for sensor in 0..geometry.sensors_per_line() {
                if SensorId::new(line, sensor) == config.active_sensor {
                    message.extend_from_slice(tone_chunk);
                } else {
                    message.extend(std::iter::repeat(message_index as f64).take(samples_per_message));
                }
            }
        }
        handler.ingest(&message).unwrap();
    }

    let received: Vec<SpectrumResult> = spectra.try_iter().collect();
    assert!(!received.is_empty());
    for spectrum in &received {
        assert_peak_near(spectrum, 64.0, 1e-9);
    }

    let cache = handler.cache();
    assert_eq!(cache.samples_per_channel(), samples_per_message * 8);
    let idle = cache.channel(SensorId::new(0, 0)).unwrap();
    assert_eq!(idle[0], 0.0);
    assert_eq!(idle[samples_per_message * 8 - 1], 7.0);
    let active = cache.channel(config.active_sensor).unwrap();
    assert_eq!(active.to_vec(), tone);
}

#[test]
fn test_handler_rejects_malformed_message() {
    let mut handler =
        AcousticHandler::new(Default::default(), AnalyzerConfig::default()).unwrap();
    let before = handler.cache().samples_per_channel();

    let result = handler.ingest(&vec![0.0; 2 * 71 + 1]);
    assert!(matches!(result, Err(AcousticError::ShapeMismatch { .. })));
    assert_eq!(handler.cache().samples_per_channel(), before);
    assert_eq!(handler.analyzer().buffered_samples(), 0);
}

#[test]
fn test_export_is_unsupported() {
    let handler = AcousticHandler::new(Default::default(), AnalyzerConfig::default()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let result = handler.cache().export(dir.path().join("raw.bin"));
    assert!(matches!(result, Err(AcousticError::Unsupported(_))));
}
