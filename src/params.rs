//! Analysis parameters
//!
//! Thresholds that decide which inter-pulse intervals count as periods and
//! which amplitude pairs enter shimmer, plus the pulse tracker's step cap.
//! Both structs are plain immutable values; pass them in, never mutate shared
//! copies.

use serde::{Deserialize, Serialize};

/// Lowest voiced frequency considered by default (Hz)
pub const DEFAULT_VOICED_FLOOR: f64 = 50.0;
/// Highest voiced frequency considered by default (Hz)
pub const DEFAULT_VOICED_CEILING: f64 = 800.0;
/// Default largest ratio between consecutive periods
pub const DEFAULT_MAXIMUM_PERIOD_FACTOR: f64 = 1.3;
/// Default largest ratio between consecutive period amplitudes
pub const DEFAULT_MAXIMUM_AMPLITUDE_FACTOR: f64 = 1.6;

/// Period and amplitude bounds for jitter and shimmer measurements
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerturbationParams {
    /// Shortest admissible period in seconds
    pub pmin: f64,
    /// Longest admissible period in seconds
    pub pmax: f64,
    /// Largest admissible ratio between an interval and its neighbours
    ///
    /// Values below 1.0 disable the neighbour test.
    pub maximum_period_factor: f64,
    /// Largest admissible ratio between consecutive amplitudes (shimmer)
    pub maximum_amplitude_factor: f64,
}

impl PerturbationParams {
    /// Bounds derived from a voiced frequency range
    ///
    /// Matches Praat's voice report: `pmin = 0.8 / ceiling`,
    /// `pmax = 1.25 / floor`.
    pub fn from_pitch_range(floor: f64, ceiling: f64) -> Self {
        Self {
            pmin: 0.8 / ceiling,
            pmax: 1.25 / floor,
            maximum_period_factor: DEFAULT_MAXIMUM_PERIOD_FACTOR,
            maximum_amplitude_factor: DEFAULT_MAXIMUM_AMPLITUDE_FACTOR,
        }
    }

    /// Same bounds with a different period factor
    pub fn with_maximum_period_factor(mut self, factor: f64) -> Self {
        self.maximum_period_factor = factor;
        self
    }

    /// Same bounds with a different amplitude factor
    pub fn with_maximum_amplitude_factor(mut self, factor: f64) -> Self {
        self.maximum_amplitude_factor = factor;
        self
    }

    /// True when the period bounds are switched off (`pmin == pmax`)
    pub fn bounds_disabled(&self) -> bool {
        self.pmin == self.pmax
    }

    /// True when `period` lies within `[pmin, pmax]`
    pub fn period_in_range(&self, period: f64) -> bool {
        period >= self.pmin && period <= self.pmax
    }

    /// The pair test shared by jitter and the amplitude extractor
    ///
    /// Every period must lie within bounds and every pair of neighbouring
    /// periods must differ by at most `maximum_period_factor`, unless the
    /// bounds are switched off altogether.
    pub fn periods_consistent(&self, periods: &[f64]) -> bool {
        if self.bounds_disabled() {
            return true;
        }
        periods.iter().all(|&p| self.period_in_range(p))
            && periods
                .windows(2)
                .all(|w| ratio_at_least_one(w[0], w[1]) <= self.maximum_period_factor)
    }
}

impl Default for PerturbationParams {
    fn default() -> Self {
        Self::from_pitch_range(DEFAULT_VOICED_FLOOR, DEFAULT_VOICED_CEILING)
    }
}

/// Settings for pulse extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointProcessConfig {
    /// Upper bound on correlation steps over the whole extraction
    ///
    /// Each step moves at least 0.8 period, so a real recording never gets
    /// near this; exceeding it reports an error instead of looping.
    pub max_steps: usize,
}

impl Default for PointProcessConfig {
    fn default() -> Self {
        Self {
            max_steps: 10_000_000,
        }
    }
}

/// `a / b` or `b / a`, whichever is at least one
pub(crate) fn ratio_at_least_one(a: f64, b: f64) -> f64 {
    if a > b {
        a / b
    } else {
        b / a
    }
}
