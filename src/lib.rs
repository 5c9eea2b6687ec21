//! praatfan-voice: Praat-compatible glottal pulses, jitter and shimmer
//!
//! This library reimplements the voice-perturbation part of Praat's voice
//! report: it turns a sound and an already-computed pitch track into the
//! instants of individual glottal pulses, and measures how irregular their
//! timing (jitter) and amplitude (shimmer) are.
//!
//! # Core Types
//!
//! - [`Sound`] - One or two channels of audio samples
//! - [`Pitch`] - F0 track with a selected candidate per frame (input)
//! - [`PointProcess`] - Sorted glottal pulse times
//! - [`AmplitudeTier`] - One peak amplitude per period
//! - [`PerturbationParams`] - Period and amplitude bounds
//! - [`VoiceReport`] - All measures for one sound at once
//!
//! # Example
//!
//! ```
//! use praatfan_voice::{jitter_local, PerturbationParams, Pitch, Sound};
//!
//! // 100 Hz pulse-like wave and a matching pitch track
//! let samples: Vec<f64> = (0..22050)
//!     .map(|i| {
//!         let phase = 2.0 * std::f64::consts::PI * 100.0 * i as f64 / 44100.0;
//!         phase.sin() + 0.5 * (2.0 * phase).sin()
//!     })
//!     .collect();
//! let sound = Sound::from_samples(&samples, 44100.0).unwrap();
//! let pitch = Pitch::from_frequencies(&[100.0; 50], 0.005, 0.01).unwrap();
//!
//! let pulses = sound.to_point_process(&pitch).unwrap();
//! let params = PerturbationParams::default();
//! let jitter = jitter_local(&pulses, 0.0, 0.0, &params);
//! assert!(jitter.unwrap() < 1e-3);
//! ```

pub mod sampled;
pub mod sound;
pub mod pitch;
pub mod interpolation;
pub mod extremum;
pub mod correlation;
pub mod params;
pub mod point_process;
pub mod jitter;
pub mod amplitude;
pub mod shimmer;
pub mod report;

// Re-export main types at crate root
pub use sampled::{Rounding, Sampled};
pub use sound::Sound;
pub use pitch::{FrequencyContour, Pitch, PitchCandidate, PitchFrame};
pub use correlation::CorrelationMaximum;
pub use params::{PerturbationParams, PointProcessConfig};
pub use point_process::{pitch_to_point, PointProcess};
pub use jitter::{jitter_ddp, jitter_local, jitter_local_absolute, jitter_ppq5, jitter_rap};
pub use amplitude::{point_to_amplitude_period, AmplitudePoint, AmplitudeTier};
pub use shimmer::{
    shimmer_apq11, shimmer_apq3, shimmer_apq5, shimmer_dda, shimmer_local, shimmer_local_db,
};
pub use report::{JitterReport, ShimmerReport, VoiceReport};

use thiserror::Error;

/// Errors that can occur in praatfan-voice operations
#[derive(Error, Debug)]
pub enum PraatError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV decoding error: {0}")]
    WavDecode(#[from] hound::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The pulse tracker failed; the cause says why
    #[error("Sound and pitch could not be converted to a point process")]
    PointProcess(#[source] NumericError),

    #[error("Too few pulses between {tmin} and {tmax} seconds")]
    TooFewPulses { tmin: f64, tmax: f64 },
}

/// Numeric failures inside pulse extraction
///
/// These never reach callers directly; [`pitch_to_point`] wraps them in
/// [`PraatError::PointProcess`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NumericError {
    #[error("no usable frequency at {time} s (got {frequency:?})")]
    InvalidFrequency { time: f64, frequency: Option<f64> },

    #[error("pulse time is not finite near {near} s")]
    NonFiniteTime { near: f64 },

    #[error("pulse tracking exceeded {0} correlation steps")]
    StepLimit(usize),
}

pub type Result<T> = std::result::Result<T, PraatError>;
