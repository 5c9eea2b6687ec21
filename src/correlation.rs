//! Waveform cross-correlation search
//!
//! Pulse tracking steps from one glottal pulse to the next by looking for the
//! shift, about one period away, at which the waveform best repeats itself.

use crate::interpolation::parabolic_vertex;
use crate::sampled::{Rounding, Sampled};
use crate::Sound;

/// Best-matching shifted window found by [`Sound::find_maximum_correlation`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelationMaximum {
    /// Normalized correlation at the (interpolated) best shift
    pub correlation: f64,
    /// Largest absolute amplitude in the shifted window
    pub peak: f64,
    /// Time corresponding to `t1` in the shifted window
    pub time: f64,
}

/// Scan state for one local maximum candidate
struct Candidate {
    r1: f64,
    r2: f64,
    r3: f64,
    lag: isize,
    peak: f64,
}

impl Sound {
    /// Find the shift at which the waveform around `t1` repeats best
    ///
    /// The reference window has length `window_length` and is centered on
    /// `t1`. Every integer-sample shift that moves the window center into
    /// `[tmin2, tmax2]` is tried; the normalized correlation sums energies
    /// and cross-products over all channels, ignoring sample pairs that fall
    /// outside the sound.
    ///
    /// Correlations are examined three at a time; the middle one counts as a
    /// maximum when it is at least as large as both neighbours and larger than
    /// any maximum seen so far. The winning shift and correlation are refined
    /// by parabolic interpolation.
    ///
    /// Returns `None` when the scan produced no local maximum, which callers
    /// must not confuse with a correlation of zero.
    pub fn find_maximum_correlation(
        &self,
        t1: f64,
        window_length: f64,
        tmin2: f64,
        tmax2: f64,
    ) -> Option<CorrelationMaximum> {
        let half_window = 0.5 * window_length;
        let ileft1 = self.x_to_index(t1 - half_window, Rounding::Nearest) as isize;
        let iright1 = self.x_to_index(t1 + half_window, Rounding::Nearest) as isize;
        let ileft2min = self.x_to_index(tmin2 - half_window, Rounding::Floor) as isize;
        let ileft2max = self.x_to_index(tmax2 - half_window, Rounding::Ceil) as isize;
        let nx = self.num_samples() as isize;
        let channels = self.channels();

        let (mut r1, mut r2, mut r3) = (0.0, 0.0, 0.0);
        let mut best: Option<Candidate> = None;

        for ileft2 in ileft2min..=ileft2max {
            let mut norm1 = 0.0;
            let mut norm2 = 0.0;
            let mut product = 0.0;
            let mut local_peak = 0.0;

            for i1 in ileft1..=iright1 {
                let i2 = ileft2 + (i1 - ileft1);
                if i1 < 0 || i1 >= nx || i2 < 0 || i2 >= nx {
                    continue;
                }
                let (i1, i2) = (i1 as usize, i2 as usize);
                for channel in channels {
                    let amp1 = channel[i1];
                    let amp2 = channel[i2];
                    norm1 += amp1 * amp1;
                    norm2 += amp2 * amp2;
                    product += amp1 * amp2;
                }
                let amp2 = self.value(i2).abs();
                if amp2 > local_peak {
                    local_peak = amp2;
                }
            }

            r1 = r2;
            r2 = r3;
            r3 = if product != 0.0 {
                product / (norm1 * norm2).sqrt()
            } else {
                0.0
            };

            let best_so_far = best.as_ref().map_or(-1.0, |c| c.r2);
            if r2 > best_so_far && r2 >= r1 && r2 >= r3 {
                // r2 belongs to the previous shift; the peak is that of the
                // window just evaluated.
                best = Some(Candidate {
                    r1,
                    r2,
                    r3,
                    lag: ileft2 - 1,
                    peak: local_peak,
                });
            }
        }

        let best = best?;
        let (offset, correlation) =
            parabolic_vertex(best.r1, best.r2, best.r3).unwrap_or((0.0, best.r2));
        let lag = best.lag as f64 + offset;

        Some(CorrelationMaximum {
            correlation,
            peak: best.peak,
            time: t1 + (lag - ileft1 as f64) * self.dx(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    const SAMPLE_RATE: f64 = 8000.0;

    /// 200 Hz sine at 8 kHz: exactly 40 samples per period
    fn periodic_sound() -> Sound {
        let samples: Vec<f64> = (0..2000)
            .map(|i| (2.0 * PI * 200.0 * i as f64 / SAMPLE_RATE).sin())
            .collect();
        Sound::from_samples(&samples, SAMPLE_RATE).unwrap()
    }

    #[test]
    fn test_identical_windows_at_zero_lag() {
        let sound = periodic_sound();
        let dx = sound.dx();
        let t1 = sound.index_to_x(1000.25);
        // 160-sample reference window = four whole periods
        let window = 159.0 * dx;

        let found = sound
            .find_maximum_correlation(t1, window, t1 - 2.0 * dx, t1 + 2.0 * dx)
            .unwrap();

        assert_relative_eq!(found.correlation, 1.0, epsilon = 1e-9);
        assert!((found.time - t1).abs() < 1e-3 * dx);
        assert_relative_eq!(found.peak, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_one_period_back() {
        let sound = periodic_sound();
        let dx = sound.dx();
        let t1 = sound.index_to_x(1000.25);
        let period = 40.0 * dx;

        let found = sound
            .find_maximum_correlation(t1, 159.0 * dx, t1 - 1.25 * period, t1 - 0.8 * period)
            .unwrap();

        assert_relative_eq!(found.correlation, 1.0, epsilon = 1e-9);
        assert!((found.time - (t1 - period)).abs() < 1e-3 * dx);
    }

    #[test]
    fn test_monotonic_scan_finds_nothing() {
        // Shifts of -6..-3 samples: correlation rises steadily towards zero lag
        let sound = periodic_sound();
        let dx = sound.dx();
        let t1 = sound.index_to_x(1000.25);

        let found = sound.find_maximum_correlation(t1, 159.0 * dx, t1 - 5.0 * dx, t1 - 3.0 * dx);
        assert!(found.is_none());
    }

    #[test]
    fn test_stereo_correlation_sums_channels() {
        let left: Vec<f64> = (0..2000)
            .map(|i| (2.0 * PI * 200.0 * i as f64 / SAMPLE_RATE).sin())
            .collect();
        let right: Vec<f64> = left.iter().map(|x| 0.5 * x).collect();
        let sound = Sound::from_channels(vec![left, right], SAMPLE_RATE, 0.0).unwrap();
        let dx = sound.dx();
        let t1 = sound.index_to_x(1000.25);

        let found = sound
            .find_maximum_correlation(t1, 159.0 * dx, t1 - 2.0 * dx, t1 + 2.0 * dx)
            .unwrap();

        assert_relative_eq!(found.correlation, 1.0, epsilon = 1e-9);
        // Peak is taken from the channel average
        assert_relative_eq!(found.peak, 0.75, epsilon = 1e-9);
    }
}
