//! Per-period amplitudes
//!
//! Shimmer compares the amplitude of consecutive glottal periods. The
//! amplitude of the period around pulse `t[i]` is a Hann-windowed RMS whose
//! window reaches a fifth of a period to either side of the pulse.

use serde::Serialize;
use tracing::debug;

use crate::params::PerturbationParams;
use crate::sampled::Sampled;
use crate::{PointProcess, PraatError, Result, Sound};

/// Fraction of the adjacent period covered by the RMS window on each side
const PERIOD_WINDOW_FRACTION: f64 = 0.2;

/// One amplitude sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AmplitudePoint {
    /// Pulse time in seconds
    pub time: f64,
    /// Windowed RMS around the pulse
    pub value: f64,
}

/// Amplitudes of consecutive periods, sorted by time
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AmplitudeTier {
    points: Vec<AmplitudePoint>,
}

impl AmplitudeTier {
    /// Build a tier from points in any order
    pub fn from_points(mut points: Vec<AmplitudePoint>) -> Self {
        points.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { points }
    }

    /// The points, sorted by time
    pub fn points(&self) -> &[AmplitudePoint] {
        &self.points
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the tier has no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Average of all amplitude values
    pub fn mean_value(&self) -> Option<f64> {
        if self.points.is_empty() {
            return None;
        }
        Some(self.points.iter().map(|p| p.value).sum::<f64>() / self.points.len() as f64)
    }
}

impl Sound {
    /// RMS around `tmid` under an asymmetric Hann window
    ///
    /// The window rises over `width_left` before `tmid` and falls over
    /// `width_right` after it. Returns `None` when fewer than two samples
    /// fall inside the window.
    pub fn hann_windowed_rms(&self, tmid: f64, width_left: f64, width_right: f64) -> Option<f64> {
        let (first, last) = self.window_samples(tmid - width_left, tmid + width_right)?;
        if last - first + 1 < 2 {
            return None;
        }

        let mut sum_of_squares = 0.0;
        let mut window_sum_of_squares = 0.0;
        for i in first..=last {
            let t = self.index_to_x(i as f64);
            let width = if t < tmid { width_left } else { width_right };
            let window = 0.5 + 0.5 * (std::f64::consts::PI * (t - tmid) / width).cos();
            let value = self.value(i) * window;
            sum_of_squares += value * value;
            window_sum_of_squares += window * window;
        }

        if window_sum_of_squares == 0.0 {
            return None;
        }
        Some((sum_of_squares / window_sum_of_squares).sqrt())
    }
}

/// Peak amplitude of every period that passes the period test
///
/// For each pulse inside `[tmin, tmax]` that has a pulse on both sides, the
/// two adjacent intervals must satisfy
/// [`PerturbationParams::periods_consistent`]; the amplitude is then the
/// Hann-windowed RMS spanning a fifth of each interval. Non-positive or
/// undefined amplitudes are skipped. An empty window (`tmin >= tmax`) means
/// the whole point process.
///
/// # Errors
/// Returns [`PraatError::TooFewPulses`] when the window holds fewer than two
/// pulses.
pub fn point_to_amplitude_period(
    pp: &PointProcess,
    sound: &Sound,
    tmin: f64,
    tmax: f64,
    params: &PerturbationParams,
) -> Result<AmplitudeTier> {
    let (tmin, tmax) = pp.auto_window(tmin, tmax);
    let (first, last) = match pp.window_points(tmin, tmax) {
        Some((first, last)) if last > first => (first, last),
        _ => return Err(PraatError::TooFewPulses { tmin, tmax }),
    };
    let t = pp.times();

    let mut points = Vec::with_capacity(last - first);
    for i in first + 1..last {
        let p1 = t[i] - t[i - 1];
        let p2 = t[i + 1] - t[i];
        if !params.periods_consistent(&[p1, p2]) {
            continue;
        }
        let rms = sound.hann_windowed_rms(
            t[i],
            PERIOD_WINDOW_FRACTION * p1,
            PERIOD_WINDOW_FRACTION * p2,
        );
        if let Some(value) = rms.filter(|&v| v > 0.0) {
            points.push(AmplitudePoint { time: t[i], value });
        }
    }

    debug!(
        pulses = last - first + 1,
        amplitudes = points.len(),
        "amplitude tier"
    );
    Ok(AmplitudeTier { points })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rms_of_constant_signal() {
        let sound = Sound::from_samples(&[0.5; 1000], 10000.0).unwrap();
        let rms = sound.hann_windowed_rms(0.05, 0.002, 0.003).unwrap();
        assert_relative_eq!(rms, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_rms_needs_two_samples() {
        let sound = Sound::from_samples(&[0.5; 100], 1000.0).unwrap();
        // Window narrower than one sample step
        assert!(sound.hann_windowed_rms(0.0505, 0.0002, 0.0002).is_none());
        // Window entirely outside the sound
        assert!(sound.hann_windowed_rms(1.0, 0.01, 0.01).is_none());
    }

    #[test]
    fn test_rms_of_sine_is_weighted() {
        // A full-period window over a sine: the Hann weights favour the
        // center, where a sine crossing zero is small
        let sound = Sound::create_tone(100.0, 0.1, 10000.0, 1.0, 0.0).unwrap();
        let rms = sound.hann_windowed_rms(sound.index_to_x(500.0), 0.005, 0.005).unwrap();
        assert!(rms > 0.0 && rms < std::f64::consts::FRAC_1_SQRT_2);
    }

    #[test]
    fn test_amplitudes_follow_pulses() {
        let sound = Sound::from_samples(&[0.25; 2000], 10000.0).unwrap();
        let times: Vec<f64> = (1..10).map(|i| 0.02 * i as f64).collect();
        let pp = PointProcess::from_times(0.0, 0.2, times);
        let params = PerturbationParams::default();

        let tier = point_to_amplitude_period(&pp, &sound, 0.0, 0.0, &params).unwrap();
        // Pulses 2 through 8 have neighbours on both sides
        assert_eq!(tier.len(), 7);
        for point in tier.points() {
            assert_relative_eq!(point.value, 0.25, epsilon = 1e-12);
        }
        assert_relative_eq!(tier.points()[0].time, 0.04, epsilon = 1e-12);
    }

    #[test]
    fn test_too_few_pulses() {
        let sound = Sound::from_samples(&[0.25; 2000], 10000.0).unwrap();
        let params = PerturbationParams::default();

        let pp = PointProcess::from_times(0.0, 0.2, vec![0.1]);
        let err = point_to_amplitude_period(&pp, &sound, 0.0, 0.0, &params).unwrap_err();
        assert!(matches!(err, PraatError::TooFewPulses { .. }));

        // Two pulses are enough, although no period has two neighbours
        let pp = PointProcess::from_times(0.0, 0.2, vec![0.1, 0.11]);
        let tier = point_to_amplitude_period(&pp, &sound, 0.0, 0.0, &params).unwrap();
        assert!(tier.is_empty());
    }

    #[test]
    fn test_silence_gives_no_amplitudes() {
        let sound = Sound::from_samples(&[0.0; 2000], 10000.0).unwrap();
        let times: Vec<f64> = (1..10).map(|i| 0.01 * i as f64).collect();
        let pp = PointProcess::from_times(0.0, 0.2, times);
        let tier =
            point_to_amplitude_period(&pp, &sound, 0.0, 0.0, &PerturbationParams::default()).unwrap();
        assert!(tier.is_empty());
        assert!(tier.mean_value().is_none());
    }
}
