//! Output a voice report (pulses, jitter, shimmer) as JSON.
//!
//! Usage: voice_report <audio_file> <pitch_json> [params_json]
//!
//! `pitch_json` is the output of praatfan's `pitch_json` tool. The optional
//! `params_json` may set any of `pmin`, `pmax`, `maximum_period_factor` and
//! `maximum_amplitude_factor`. Set `RUST_LOG=praatfan_voice=debug` to trace
//! the pulse tracker.

use praatfan_voice::{
    pitch_to_point, PerturbationParams, Pitch, PointProcessConfig, Sampled, Sound, VoiceReport,
};
use serde::Serialize;
use std::env;
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
struct ReportOutput {
    file: String,
    duration: f64,
    sample_rate: f64,
    params: PerturbationParams,
    pulses: Vec<f64>,
    report: VoiceReport,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 || args.len() > 4 {
        eprintln!("Usage: {} <audio_file> <pitch_json> [params_json]", args[0]);
        std::process::exit(1);
    }

    let sound = Sound::from_file(&args[1]).expect("Failed to load audio file");
    // A pitch track shares the time domain of the sound it was computed from
    let pitch = Pitch::from_json_file(&args[2])
        .expect("Failed to load pitch JSON")
        .with_domain(sound.xmin(), sound.xmax());
    let params: PerturbationParams = match args.get(3) {
        Some(path) => {
            let content = std::fs::read_to_string(path).expect("Failed to read params JSON");
            serde_json::from_str(&content).expect("Invalid params JSON")
        }
        None => PerturbationParams::default(),
    };

    let pulses = pitch_to_point(&sound, &pitch, &PointProcessConfig::default())
        .expect("Pulse extraction failed");
    let report = VoiceReport::from_pulses(&pulses, &sound, &params).expect("Voice report failed");

    let output = ReportOutput {
        file: args[1].clone(),
        duration: sound.duration(),
        sample_rate: sound.sample_rate(),
        params,
        pulses: pulses.times().to_vec(),
        report,
    };

    println!("{}", serde_json::to_string_pretty(&output).expect("Failed to serialize report"));
}
