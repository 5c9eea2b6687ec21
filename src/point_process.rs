//! Glottal pulses as a point process
//!
//! A [`PointProcess`] is a sorted list of pulse instants. It is built from a
//! sound and a pitch track by cross-correlation pulse tracking
//! (Praat's "Sound & Pitch: To PointProcess (cc)"):
//!
//! 1. Walk the pitch track's voiced intervals in increasing time.
//! 2. Anchor each interval on the largest waveform excursion within half a
//!    period of its middle.
//! 3. Step backwards, one period at a time, to the shift where the waveform
//!    repeats best, accepting pulses whose correlation and amplitude are high
//!    enough, until the interval's left edge is passed.
//! 4. Do the same forwards until the right edge is passed.
//!
//! Jitter and shimmer only use intervals between pulses that look like real
//! periods; [`PointProcess::is_period`] is that test.

use tracing::{debug, trace, warn};

use crate::params::{ratio_at_least_one, PerturbationParams, PointProcessConfig};
use crate::pitch::FrequencyContour;
use crate::sampled::Sampled;
use crate::{NumericError, Pitch, PraatError, Result, Sound};

/// Correlation a pulse beyond the voiced interval needs to be kept
const BOUNDARY_CORRELATION: f64 = 0.7;
/// Peak (relative to the sound's global peak) a pulse beyond the interval needs
const BOUNDARY_PEAK_FRACTION: f64 = 0.023333;
/// Correlation a pulse inside the voiced interval needs to be kept
const INTERIOR_CORRELATION: f64 = 0.3;
/// Peak (relative to the global peak) a pulse inside the interval needs
const INTERIOR_PEAK_FRACTION: f64 = 0.01;
/// Nearest candidate shift, in periods
const SEARCH_NEAR: f64 = 0.8;
/// Farthest candidate shift, in periods
const SEARCH_FAR: f64 = 1.25;
/// Pulses closer than this (in periods) to the last right-extension pulse are
/// not added again by a left extension
const DUPLICATE_DISTANCE: f64 = 0.8;

/// Sorted pulse times
#[derive(Debug, Clone, PartialEq)]
pub struct PointProcess {
    /// Start of the time domain
    xmin: f64,
    /// End of the time domain
    xmax: f64,
    /// Pulse times in seconds, non-decreasing
    t: Vec<f64>,
}

impl PointProcess {
    /// A point process without pulses
    pub fn empty(xmin: f64, xmax: f64) -> Self {
        Self {
            xmin,
            xmax,
            t: Vec::new(),
        }
    }

    /// Build a point process from pulse times in any order
    pub fn from_times(xmin: f64, xmax: f64, mut times: Vec<f64>) -> Self {
        times.sort_by(|a, b| a.total_cmp(b));
        Self { xmin, xmax, t: times }
    }

    /// Number of pulses
    pub fn nt(&self) -> usize {
        self.t.len()
    }

    /// True when there are no pulses
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Pulse times, sorted
    pub fn times(&self) -> &[f64] {
        &self.t
    }

    /// Start of the time domain
    pub fn xmin(&self) -> f64 {
        self.xmin
    }

    /// End of the time domain
    pub fn xmax(&self) -> f64 {
        self.xmax
    }

    /// Resolve a query window; an empty window (`tmin >= tmax`) means everything
    ///
    /// "Everything" is the time domain widened to include every pulse.
    pub fn auto_window(&self, tmin: f64, tmax: f64) -> (f64, f64) {
        if tmin < tmax {
            return (tmin, tmax);
        }
        match (self.t.first(), self.t.last()) {
            (Some(&first), Some(&last)) => (self.xmin.min(first), self.xmax.max(last)),
            _ => (self.xmin, self.xmax),
        }
    }

    /// Indices of the first and last pulse inside `[tmin, tmax]`
    ///
    /// Returns `None` when the window holds no pulse.
    pub fn window_points(&self, tmin: f64, tmax: f64) -> Option<(usize, usize)> {
        let first = self.t.partition_point(|&t| t < tmin);
        let end = self.t.partition_point(|&t| t <= tmax);
        if end <= first {
            None
        } else {
            Some((first, end - 1))
        }
    }

    /// Number of pulses inside `[tmin, tmax]`
    pub fn count_in_window(&self, tmin: f64, tmax: f64) -> usize {
        self.window_points(tmin, tmax)
            .map_or(0, |(first, last)| last - first + 1)
    }

    /// Does the interval from pulse `i` to pulse `i + 1` count as a period?
    ///
    /// Out-of-range indices never do. With `pmin == pmax` every existing
    /// interval does. Otherwise the interval must lie within `[pmin, pmax]`,
    /// and, when `maximum_period_factor >= 1`, it must not differ by more
    /// than that factor from *all* of its existing neighbouring intervals:
    /// one agreeing neighbour is enough, and an interval without neighbours
    /// is accepted.
    pub fn is_period(&self, i: usize, params: &PerturbationParams) -> bool {
        let nt = self.t.len();
        let iright = match i.checked_add(1) {
            Some(iright) if iright < nt => iright,
            _ => return false,
        };
        if params.bounds_disabled() {
            return true;
        }

        let interval = self.t[iright] - self.t[i];
        if !params.period_in_range(interval) {
            return false;
        }
        let factor = params.maximum_period_factor;
        if !(factor >= 1.0) {
            return true;
        }

        let previous = (i > 0)
            .then(|| self.t[i] - self.t[i - 1])
            .filter(|&p| p > 0.0);
        let next = (iright + 1 < nt)
            .then(|| self.t[iright + 1] - self.t[iright])
            .filter(|&p| p > 0.0);

        match (previous, next) {
            (None, None) => true,
            (previous, next) => {
                let agrees = |neighbour: Option<f64>| {
                    neighbour.map_or(false, |p| ratio_at_least_one(interval, p) <= factor)
                };
                agrees(previous) || agrees(next)
            }
        }
    }

    /// Number of intervals inside `[tmin, tmax]` that count as periods
    pub fn count_periods(&self, tmin: f64, tmax: f64, params: &PerturbationParams) -> usize {
        let (tmin, tmax) = self.auto_window(tmin, tmax);
        match self.window_points(tmin, tmax) {
            Some((first, last)) => (first..last).filter(|&i| self.is_period(i, params)).count(),
            None => 0,
        }
    }

    /// Average length of the intervals inside `[tmin, tmax]` that count as periods
    pub fn mean_period(&self, tmin: f64, tmax: f64, params: &PerturbationParams) -> Option<f64> {
        let (tmin, tmax) = self.auto_window(tmin, tmax);
        let (first, last) = self.window_points(tmin, tmax)?;

        let (sum, count) = (first..last)
            .filter(|&i| self.is_period(i, params))
            .fold((0.0, 0usize), |(sum, count), i| {
                (sum + self.t[i + 1] - self.t[i], count + 1)
            });

        if count == 0 {
            None
        } else {
            Some(sum / count as f64)
        }
    }

    /// Track glottal pulses in `sound` along the voiced parts of `pitch`
    ///
    /// See [`pitch_to_point`].
    pub fn from_sound_and_pitch(
        sound: &Sound,
        pitch: &Pitch,
        config: &PointProcessConfig,
    ) -> Result<Self> {
        pitch_to_point(sound, pitch, config)
    }
}

impl Sound {
    /// Track glottal pulses with the default configuration
    pub fn to_point_process(&self, pitch: &Pitch) -> Result<PointProcess> {
        pitch_to_point(self, pitch, &PointProcessConfig::default())
    }
}

/// Track glottal pulses in `sound` along the voiced parts of `pitch`
///
/// Returns the pulses sorted by time over the sound's time domain. A pitch
/// track without voiced frames yields an empty point process.
///
/// # Errors
/// Any numeric failure during tracking is reported as
/// [`PraatError::PointProcess`], carrying the underlying [`NumericError`].
pub fn pitch_to_point(
    sound: &Sound,
    pitch: &Pitch,
    config: &PointProcessConfig,
) -> Result<PointProcess> {
    PulseTracker::new(sound, pitch, config)
        .run(pitch)
        .map_err(PraatError::PointProcess)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Left,
    Right,
}

/// Mutable state of one pulse-tracking run
struct PulseTracker<'a> {
    sound: &'a Sound,
    contour: FrequencyContour,
    global_peak: f64,
    max_steps: usize,
    steps: usize,
    pulses: Vec<f64>,
    /// Most recent pulse added by a right extension; carried across intervals
    added_right: f64,
}

impl<'a> PulseTracker<'a> {
    fn new(sound: &'a Sound, pitch: &Pitch, config: &PointProcessConfig) -> Self {
        Self {
            sound,
            contour: pitch.frequency_contour(),
            global_peak: sound.peak(),
            max_steps: config.max_steps,
            steps: 0,
            pulses: Vec::new(),
            added_right: f64::NEG_INFINITY,
        }
    }

    fn run(mut self, pitch: &Pitch) -> std::result::Result<PointProcess, NumericError> {
        let mut after = pitch.xmin();
        while let Some((t_left, t_right)) = pitch.voiced_interval_after(after) {
            self.step()?;
            debug!(t_left, t_right, "tracking pulses in voiced interval");
            self.track_interval(t_left, t_right)?;
            after = t_right;
        }

        debug!(
            pulses = self.pulses.len(),
            steps = self.steps,
            "point process complete"
        );
        Ok(PointProcess::from_times(
            self.sound.xmin(),
            self.sound.xmax(),
            self.pulses,
        ))
    }

    fn track_interval(&mut self, t_left: f64, t_right: f64) -> std::result::Result<(), NumericError> {
        let t_middle = 0.5 * (t_left + t_right);
        let f0 = self
            .frequency(t_middle)
            .ok_or(NumericError::InvalidFrequency {
                time: t_middle,
                frequency: self.contour.at(t_middle),
            })?;

        let anchor = self
            .sound
            .find_extremum(t_middle - 0.5 / f0, t_middle + 0.5 / f0, true, true);
        if !anchor.is_finite() {
            return Err(NumericError::NonFiniteTime { near: t_middle });
        }
        trace!(anchor, f0, "anchor pulse");
        self.pulses.push(anchor);

        self.extend(anchor, t_left, Direction::Left)?;
        self.extend(anchor, t_right, Direction::Right)?;
        Ok(())
    }

    /// Step period by period from `anchor` until `edge` is passed
    fn extend(
        &mut self,
        anchor: f64,
        edge: f64,
        direction: Direction,
    ) -> std::result::Result<(), NumericError> {
        let mut t = anchor;
        loop {
            self.step()?;
            let Some(f0) = self.frequency(t) else {
                trace!(t, "no usable frequency, extension stops");
                break;
            };
            let period = 1.0 / f0;
            let (tmin2, tmax2) = match direction {
                Direction::Left => (t - SEARCH_FAR * period, t - SEARCH_NEAR * period),
                Direction::Right => (t + SEARCH_NEAR * period, t + SEARCH_FAR * period),
            };

            let previous = t;
            let (correlation, peak) =
                match self.sound.find_maximum_correlation(t, period, tmin2, tmax2) {
                    Some(found) => {
                        t = found.time;
                        (Some(found.correlation), found.peak)
                    }
                    None => {
                        // This period drops out
                        t = match direction {
                            Direction::Left => t - period,
                            Direction::Right => t + period,
                        };
                        (None, 0.0)
                    }
                };
            if !t.is_finite() {
                return Err(NumericError::NonFiniteTime { near: previous });
            }

            let past_edge = match direction {
                Direction::Left => t < edge,
                Direction::Right => t > edge,
            };
            let not_duplicate = match direction {
                Direction::Left => t - self.added_right > DUPLICATE_DISTANCE * period,
                Direction::Right => true,
            };

            if past_edge {
                let keep = correlation.map_or(false, |r| r > BOUNDARY_CORRELATION)
                    && peak > BOUNDARY_PEAK_FRACTION * self.global_peak
                    && not_duplicate;
                if keep {
                    self.add(t, direction);
                }
                trace!(t, ?correlation, peak, keep, "passed interval edge");
                break;
            }

            let keep = correlation.map_or(false, |r| r > INTERIOR_CORRELATION)
                && (peak == 0.0 || peak > INTERIOR_PEAK_FRACTION * self.global_peak)
                && not_duplicate;
            if keep {
                self.add(t, direction);
            } else {
                trace!(t, ?correlation, peak, "pulse candidate rejected");
            }
        }
        Ok(())
    }

    fn add(&mut self, t: f64, direction: Direction) {
        self.pulses.push(t);
        if direction == Direction::Right {
            self.added_right = t;
        }
    }

    /// Frequency at `time` if it is positive and finite
    fn frequency(&self, time: f64) -> Option<f64> {
        self.contour.at(time).filter(|f| f.is_finite() && *f > 0.0)
    }

    fn step(&mut self) -> std::result::Result<(), NumericError> {
        self.steps += 1;
        if self.steps > self.max_steps {
            warn!(max_steps = self.max_steps, "pulse tracking step limit reached");
            return Err(NumericError::StepLimit(self.max_steps));
        }
        Ok(())
    }
}
