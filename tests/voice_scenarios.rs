//! End-to-end scenarios: synthetic voices through pulse tracking, jitter and
//! shimmer.
//!
//! The signals are built so that the expected results can be derived exactly
//! (or bounded tightly) from how they were synthesized.

use approx::assert_relative_eq;
use praatfan_voice::{
    jitter_local, point_to_amplitude_period, shimmer_local, NumericError, PerturbationParams,
    Pitch, PointProcess, PointProcessConfig, PraatError, Rounding, Sampled, Sound, VoiceReport,
};
use std::f64::consts::PI;

const SAMPLE_RATE: f64 = 44100.0;
/// 100 Hz: exactly 441 samples per period at 44.1 kHz
const F0: f64 = 100.0;
const PERIOD: f64 = 1.0 / F0;

/// Half a second of a 100 Hz wave with a strong second harmonic
fn periodic_voice() -> Sound {
    let samples: Vec<f64> = (0..22050)
        .map(|i| {
            let phase = 2.0 * PI * F0 * i as f64 / SAMPLE_RATE;
            phase.sin() + 0.5 * (2.0 * phase).sin()
        })
        .collect();
    Sound::from_samples(&samples, SAMPLE_RATE).unwrap()
}

/// 10 ms frames over half a second, voiced at `F0` between 0.1 and 0.4 s
fn middle_voiced_pitch() -> Pitch {
    let frequencies: Vec<f64> = (0..50)
        .map(|i| if (10..40).contains(&i) { F0 } else { 0.0 })
        .collect();
    Pitch::from_frequencies(&frequencies, 0.005, 0.01).unwrap()
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn test_periodic_voice_has_regular_pulses() {
    init_logging();
    let sound = periodic_voice();
    let pitch = middle_voiced_pitch();
    let params = PerturbationParams::default();

    let pulses = sound.to_point_process(&pitch).unwrap();
    assert!(pulses.nt() >= 30, "only {} pulses", pulses.nt());

    let times = pulses.times();
    assert!(times.windows(2).all(|w| w[0] <= w[1]));
    for w in times.windows(2) {
        let ratio = (w[1] - w[0]) / PERIOD;
        assert!(
            ratio <= params.maximum_period_factor && ratio >= 1.0 / params.maximum_period_factor,
            "interval {} s is not a period",
            w[1] - w[0]
        );
    }

    let jitter = jitter_local(&pulses, 0.0, 0.0, &params).unwrap();
    assert!(jitter >= 0.0 && jitter <= 1e-3, "jitter {}", jitter);
    assert_relative_eq!(
        pulses.mean_period(0.0, 0.0, &params).unwrap(),
        PERIOD,
        epsilon = 1e-6
    );
}

#[test]
fn test_pulses_stay_near_voiced_interval() {
    let pulses = periodic_voice().to_point_process(&middle_voiced_pitch()).unwrap();
    let times = pulses.times();
    // At most one pulse beyond each edge of [0.1, 0.4]
    assert!(times[0] > 0.1 - 1.25 * PERIOD);
    assert!(times[times.len() - 1] < 0.4 + 1.25 * PERIOD);
    assert!(times.iter().filter(|&&t| t < 0.1).count() <= 1);
    assert!(times.iter().filter(|&&t| t > 0.4).count() <= 1);
}

#[test]
fn test_fully_voiced_track_over_whole_sound() {
    let sound = periodic_voice();
    let pitch = Pitch::from_frequencies(&[F0; 50], 0.005, 0.01).unwrap();
    let params = PerturbationParams::default();

    let pulses = sound.to_point_process(&pitch).unwrap();
    assert!(pulses.nt() >= 45);
    assert!(jitter_local(&pulses, 0.0, 0.0, &params).unwrap() < 1e-3);
}

#[test]
fn test_pitch_frames_past_sound_end_are_clamped_to_sound_domain() {
    // 53 frames cover [0, 0.53]; the sound ends at 0.5 s
    let sound = periodic_voice();
    let pitch = Pitch::from_frequencies(&[F0; 53], 0.005, 0.01)
        .unwrap()
        .with_domain(sound.xmin(), sound.xmax());

    let (left, right) = pitch.voiced_interval_after(pitch.xmin()).unwrap();
    assert_relative_eq!(left, 0.0, epsilon = 1e-12);
    assert_relative_eq!(right, 0.5, epsilon = 1e-12);

    let pulses = sound.to_point_process(&pitch).unwrap();
    let last = pulses.times()[pulses.nt() - 1];
    assert!(last < 0.5 + 1.25 * PERIOD, "pulse at {} s", last);
}

#[test]
fn test_all_unvoiced_track() {
    let sound = periodic_voice();
    let pitch = Pitch::from_frequencies(&[0.0; 50], 0.005, 0.01).unwrap();
    let params = PerturbationParams::default();

    let pulses = sound.to_point_process(&pitch).unwrap();
    assert_eq!(pulses.nt(), 0);
    assert!(jitter_local(&pulses, 0.0, 0.0, &params).is_none());
    assert!(shimmer_local(&pulses, &sound, 0.0, 0.0, &params).unwrap().is_none());
}

#[test]
fn test_two_voiced_stretches() {
    let sound = periodic_voice();
    let frequencies: Vec<f64> = (0..50)
        .map(|i| if (5..15).contains(&i) || (30..45).contains(&i) { F0 } else { 0.0 })
        .collect();
    let pitch = Pitch::from_frequencies(&frequencies, 0.005, 0.01).unwrap();

    let pulses = sound.to_point_process(&pitch).unwrap();
    let times = pulses.times();
    assert!(times.windows(2).all(|w| w[0] <= w[1]));
    // Nothing in the middle of the unvoiced gap [0.15, 0.30]
    assert!(!times.iter().any(|&t| t > 0.17 && t < 0.28));
    assert!(times.iter().any(|&t| t < 0.15));
    assert!(times.iter().any(|&t| t > 0.30));
}

#[test]
fn test_one_frame_gap_does_not_duplicate_pulses() {
    // Voiced over [0.1, 0.2] and [0.21, 0.4]: the first stretch's last right
    // pulse lies where the second stretch's left extension ends up
    let sound = periodic_voice();
    let frequencies: Vec<f64> = (0..50)
        .map(|i| if (10..40).contains(&i) && i != 20 { F0 } else { 0.0 })
        .collect();
    let pitch = Pitch::from_frequencies(&frequencies, 0.005, 0.01).unwrap();

    let pulses = sound.to_point_process(&pitch).unwrap();
    let times = pulses.times();
    assert!(times.iter().any(|&t| t < 0.2));
    assert!(times.iter().any(|&t| t > 0.21));

    let min_gap = times
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold(f64::INFINITY, f64::min);
    assert!(min_gap > 0.8 * PERIOD, "pulses only {} s apart", min_gap);

    let params = PerturbationParams::default();
    assert!(jitter_local(&pulses, 0.0, 0.0, &params).unwrap() < 1e-3);
}

#[test]
fn test_step_limit_reports_point_process_error() {
    let config = PointProcessConfig { max_steps: 5 };
    let err = PointProcess::from_sound_and_pitch(&periodic_voice(), &middle_voiced_pitch(), &config)
        .unwrap_err();
    match err {
        PraatError::PointProcess(cause) => assert_eq!(cause, NumericError::StepLimit(5)),
        other => panic!("unexpected error: {}", other),
    }
}

/// Sound whose value everywhere equals the amplitude of the nearest pulse
///
/// Pulses sit every 10 ms; odd-numbered pulses are twice as loud.
fn alternating_amplitude_voice(amplitude: f64) -> (Sound, PointProcess) {
    let sample_rate = 10000.0;
    let loudness = |k: i64| if k % 2 == 1 { 2.0 * amplitude } else { amplitude };
    let samples: Vec<f64> = (0..3000)
        .map(|i| {
            let t = (i as f64 + 0.5) / sample_rate;
            loudness((t / PERIOD).round() as i64)
        })
        .collect();
    let sound = Sound::from_samples(&samples, sample_rate).unwrap();
    let times: Vec<f64> = (1..30).map(|k| k as f64 * PERIOD).collect();
    let pulses = PointProcess::from_times(sound.xmin(), sound.xmax(), times);
    (sound, pulses)
}

#[test]
fn test_shimmer_of_alternating_amplitudes() {
    let amplitude = 0.3;
    let (sound, pulses) = alternating_amplitude_voice(amplitude);
    let params = PerturbationParams::default().with_maximum_amplitude_factor(2.5);

    let tier = point_to_amplitude_period(&pulses, &sound, 0.0, 0.0, &params).unwrap();
    assert_eq!(tier.len(), 27);
    for point in tier.points() {
        let k = (point.time / PERIOD).round() as i64;
        let expected = if k % 2 == 1 { 2.0 * amplitude } else { amplitude };
        assert_relative_eq!(point.value, expected, epsilon = 1e-9);
    }

    // Every neighbouring pair differs by one amplitude unit
    let mean_amplitude =
        tier.points().iter().map(|p| p.value).sum::<f64>() / tier.len() as f64;
    let expected = amplitude / mean_amplitude;
    let shimmer = shimmer_local(&pulses, &sound, 0.0, 0.0, &params).unwrap().unwrap();
    assert_relative_eq!(shimmer, expected, epsilon = 1e-9);
}

#[test]
fn test_doubling_exceeds_default_amplitude_factor() {
    let (sound, pulses) = alternating_amplitude_voice(0.3);
    let params = PerturbationParams::default();
    assert!(shimmer_local(&pulses, &sound, 0.0, 0.0, &params).unwrap().is_none());
}

#[test]
fn test_is_period_never_true_at_the_end() {
    let (_, pulses) = alternating_amplitude_voice(0.3);
    let params = PerturbationParams::default();
    let nt = pulses.nt();
    assert!(pulses.is_period(nt - 2, &params));
    assert!(!pulses.is_period(nt - 1, &params));
    assert!(!pulses.is_period(nt, &params));

    let open = PerturbationParams { pmin: 0.0, pmax: 0.0, ..params };
    assert!((0..nt - 1).all(|i| pulses.is_period(i, &open)));
}

#[test]
fn test_index_round_trip() {
    let sound = periodic_voice();
    for &t in &[sound.index_to_x(0.0), 0.123456, 0.25, sound.index_to_x(22049.0)] {
        let index = sound.x_to_index(t, Rounding::None);
        assert_relative_eq!(sound.index_to_x(index), t, epsilon = 1e-12);
    }
}

#[test]
fn test_pitch_json_and_report() {
    let frames: Vec<String> = (0..50)
        .map(|i| {
            let voiced = (10..40).contains(&i);
            format!(
                r#"{{"time": {}, "frequency": {}, "strength": 0.9, "voiced": {}}}"#,
                0.005 + 0.01 * i as f64,
                if voiced { F0 } else { 0.0 },
                voiced
            )
        })
        .collect();
    let json = format!(
        r#"{{"n_frames": 50, "start_time": 0.005, "time_step": 0.01, "frames": [{}]}}"#,
        frames.join(",")
    );
    let pitch = Pitch::from_json_str(&json).unwrap();
    assert_eq!(pitch.count_voiced(), 30);

    let report = VoiceReport::from_sound_and_pitch(
        &periodic_voice(),
        &pitch,
        &PerturbationParams::default(),
        &PointProcessConfig::default(),
    )
    .unwrap();
    assert!(report.num_pulses >= 30);
    assert_eq!(report.num_periods, report.num_pulses - 1);
    assert!(report.jitter.local.unwrap() < 1e-3);
    // Identical periods, identical amplitudes
    assert!(report.shimmer.local.unwrap() < 1e-2);

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["num_pulses"], report.num_pulses);
}

#[test]
fn test_wav_file_round_trip() {
    let path = std::env::temp_dir().join("praatfan_voice_round_trip.wav");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for i in 0..22050 {
        let phase = 2.0 * PI * F0 * i as f64 / SAMPLE_RATE;
        let value = 0.5 * (phase.sin() + 0.5 * (2.0 * phase).sin());
        writer.write_sample((value * 32767.0) as i16).unwrap();
    }
    writer.finalize().unwrap();

    let sound = Sound::from_file(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(sound.num_samples(), 22050);
    assert_relative_eq!(sound.sample_rate(), SAMPLE_RATE);

    let pulses = sound.to_point_process(&middle_voiced_pitch()).unwrap();
    let params = PerturbationParams::default();
    assert!(jitter_local(&pulses, 0.0, 0.0, &params).unwrap() < 1e-3);
}
