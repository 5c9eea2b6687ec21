//! Pitch (F0) tracks consumed by pulse extraction
//!
//! A [`Pitch`] is an already-computed pitch track: a regular grid of frames,
//! each with a list of candidates whose first entry is the selected path. This
//! crate does not detect pitch; tracks come from a pitch tracker (Praat,
//! parselmouth, praatfan's `pitch_json` tool, ...).
//!
//! Besides plain accessors this module provides the two views of the track
//! that pulse extraction needs: the successive voiced intervals, and a
//! continuous frequency-at-time function.

use std::path::Path;

use serde::Deserialize;

use crate::interpolation::linear_through_knots;
use crate::sampled::{Rounding, Sampled};
use crate::{PraatError, Result};

/// A pitch candidate for a single frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchCandidate {
    /// Frequency in Hz (0.0 for unvoiced)
    pub frequency: f64,
    /// Strength (autocorrelation value)
    pub strength: f64,
}

/// A single frame of a pitch track
#[derive(Debug, Clone, PartialEq)]
pub struct PitchFrame {
    /// Pitch candidates for this frame (first is always the "winner" after path finding)
    pub candidates: Vec<PitchCandidate>,
}

impl PitchFrame {
    /// Frame holding only a selected candidate
    pub fn with_frequency(frequency: f64, strength: f64) -> Self {
        Self {
            candidates: vec![PitchCandidate { frequency, strength }],
        }
    }

    /// Frequency of the selected candidate if it is voiced
    pub fn voiced_frequency(&self) -> Option<f64> {
        self.candidates
            .first()
            .map(|c| c.frequency)
            .filter(|&f| f > 0.0)
    }
}

/// Pitch contour representing fundamental frequency over time
#[derive(Debug, Clone)]
pub struct Pitch {
    /// Analysis frames
    frames: Vec<PitchFrame>,
    /// Time of first frame center
    start_time: f64,
    /// Time step between frames
    time_step: f64,
    /// Start time of the analysed sound
    xmin: f64,
    /// End time of the analysed sound
    xmax: f64,
}

/// One frame as written by praatfan's `pitch_json` tool
#[derive(Debug, Deserialize)]
struct PitchJsonFrame {
    frequency: f64,
    #[serde(default)]
    strength: f64,
    #[serde(default = "default_voiced")]
    voiced: bool,
}

fn default_voiced() -> bool {
    true
}

/// Pitch track as written by praatfan's `pitch_json` tool
#[derive(Debug, Deserialize)]
struct PitchJson {
    start_time: f64,
    time_step: f64,
    #[serde(default)]
    xmin: Option<f64>,
    #[serde(default)]
    xmax: Option<f64>,
    frames: Vec<PitchJsonFrame>,
}

impl Pitch {
    /// Create a pitch track from frames
    ///
    /// The time domain defaults to the span covered by the frames,
    /// `[x1 - dt/2, x1 + (n - 1/2) dt]`.
    ///
    /// # Errors
    /// Returns `InvalidParameter` when there are no frames or the time step is
    /// not positive.
    pub fn from_frames(frames: Vec<PitchFrame>, start_time: f64, time_step: f64) -> Result<Self> {
        if frames.is_empty() {
            return Err(PraatError::InvalidParameter(
                "a pitch track needs at least one frame".to_string(),
            ));
        }
        if !(time_step > 0.0 && time_step.is_finite()) {
            return Err(PraatError::InvalidParameter(format!(
                "pitch time step must be positive, got {}",
                time_step
            )));
        }
        let xmin = start_time - 0.5 * time_step;
        let xmax = start_time + (frames.len() as f64 - 0.5) * time_step;
        Ok(Self {
            frames,
            start_time,
            time_step,
            xmin,
            xmax,
        })
    }

    /// Create a pitch track from the selected frequency of each frame
    ///
    /// Non-positive frequencies mark unvoiced frames.
    pub fn from_frequencies(frequencies: &[f64], start_time: f64, time_step: f64) -> Result<Self> {
        let frames = frequencies
            .iter()
            .map(|&f| PitchFrame::with_frequency(f.max(0.0), if f > 0.0 { 1.0 } else { 0.0 }))
            .collect();
        Self::from_frames(frames, start_time, time_step)
    }

    /// Replace the time domain (usually the domain of the analysed sound)
    pub fn with_domain(mut self, xmin: f64, xmax: f64) -> Self {
        self.xmin = xmin;
        self.xmax = xmax;
        self
    }

    /// Read a pitch track from the JSON written by praatfan's `pitch_json` tool
    ///
    /// Only `start_time`, `time_step` and the per-frame `frequency` are
    /// required; `strength` and `voiced` are honoured when present, and an
    /// optional `xmin`/`xmax` pair overrides the time domain.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let parsed: PitchJson = serde_json::from_str(json)?;
        let frames = parsed
            .frames
            .iter()
            .map(|f| {
                let frequency = if f.voiced { f.frequency.max(0.0) } else { 0.0 };
                PitchFrame::with_frequency(frequency, f.strength)
            })
            .collect();
        let pitch = Self::from_frames(frames, parsed.start_time, parsed.time_step)?;
        Ok(match (parsed.xmin, parsed.xmax) {
            (Some(xmin), Some(xmax)) => pitch.with_domain(xmin, xmax),
            _ => pitch,
        })
    }

    /// Read a pitch track JSON file (see [`Pitch::from_json_str`])
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Get the pitch value at a specific frame (None if unvoiced)
    pub fn get_value_at_frame(&self, frame: usize) -> Option<f64> {
        self.frames.get(frame).and_then(PitchFrame::voiced_frequency)
    }

    /// Check if a frame is voiced
    pub fn is_voiced(&self, frame: usize) -> bool {
        self.get_value_at_frame(frame).is_some()
    }

    /// Get the time of a specific frame
    pub fn get_time_from_frame(&self, frame: usize) -> f64 {
        self.start_time + frame as f64 * self.time_step
    }

    /// Get the number of frames
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Get the time step between frames
    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    /// Get the time of the first frame
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Count voiced frames
    pub fn count_voiced(&self) -> usize {
        (0..self.frames.len()).filter(|&i| self.is_voiced(i)).count()
    }

    /// Get a reference to the frames
    pub fn frames(&self) -> &[PitchFrame] {
        &self.frames
    }

    /// Find the first voiced stretch that ends after time `after`
    ///
    /// Starting at the first frame at or after `after`, skips unvoiced frames
    /// and collects the following run of voiced frames. The run is widened by
    /// half a frame on both sides (each frame covers its whole time slot) and
    /// clamped to the time domain.
    ///
    /// Returns `None` when no voiced frame follows, when the stretch starts
    /// within half a frame of the domain's end, when the clamped interval is
    /// empty, or when it does not end after `after`. The last condition
    /// guarantees that a caller restarting from the returned right edge
    /// always makes progress.
    pub fn voiced_interval_after(&self, after: f64) -> Option<(f64, f64)> {
        let nx = self.frames.len();
        let first = self.x_to_index(after, Rounding::Ceil).max(0.0);
        if first >= nx as f64 {
            return None;
        }
        let first = first as usize;

        let ileft = (first..nx).find(|&i| self.is_voiced(i))?;
        let iright = (ileft..nx)
            .find(|&i| !self.is_voiced(i))
            .map_or(nx - 1, |unvoiced| unvoiced - 1);

        let t_left = self.index_to_x(ileft as f64) - 0.5 * self.time_step;
        if t_left >= self.xmax - 0.5 * self.time_step {
            // Less than half a frame of the stretch lies inside the domain
            return None;
        }
        let t_left = t_left.max(self.xmin);
        let t_right = (self.index_to_x(iright as f64) + 0.5 * self.time_step).min(self.xmax);

        if t_right <= t_left || t_right <= after {
            return None;
        }
        Some((t_left, t_right))
    }

    /// Continuous frequency-at-time function through the voiced frames
    pub fn frequency_contour(&self) -> FrequencyContour {
        let knots = self
            .frames
            .iter()
            .enumerate()
            .filter_map(|(i, frame)| {
                frame
                    .voiced_frequency()
                    .map(|f| (self.get_time_from_frame(i), f))
            })
            .collect();
        FrequencyContour { knots }
    }
}

impl Sampled for Pitch {
    fn x1(&self) -> f64 {
        self.start_time
    }

    fn dx(&self) -> f64 {
        self.time_step
    }

    fn nx(&self) -> usize {
        self.frames.len()
    }

    fn xmin(&self) -> f64 {
        self.xmin
    }

    fn xmax(&self) -> f64 {
        self.xmax
    }
}

/// Frequency of a pitch track as a continuous function of time
///
/// Linear between the centers of voiced frames (unvoiced frames are skipped),
/// linearly extrapolated beyond the first and last voiced frame.
#[derive(Debug, Clone)]
pub struct FrequencyContour {
    knots: Vec<(f64, f64)>,
}

impl FrequencyContour {
    /// Frequency in Hz at `time`; None if the track has no voiced frame
    pub fn at(&self, time: f64) -> Option<f64> {
        linear_through_knots(&self.knots, time)
    }

    /// True when the track had no voiced frame
    pub fn is_empty(&self) -> bool {
        self.knots.is_empty()
    }
}
