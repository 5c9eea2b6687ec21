//! Sub-sample location of waveform extrema
//!
//! Used to anchor the first pulse of every voiced interval on the largest
//! excursion of the waveform near the interval's middle.

use crate::sampled::{Rounding, Sampled};
use crate::Sound;

/// Locate the dominant extremum in the window `[d, d + n)`
///
/// Works on `channel1`, or on the per-sample average of both channels when
/// `channel2` is given. With `include_maxima` only, the largest value is
/// located; with `include_minima` only, the smallest; with both (or neither),
/// whichever of the two has the larger magnitude.
///
/// Returns the fractional offset of the extremum relative to `d`, refined by
/// parabolic interpolation unless it sits on a window edge. Returns `None`
/// for an empty window.
pub fn find_extremum(
    channel1: &[f64],
    channel2: Option<&[f64]>,
    d: usize,
    n: usize,
    include_maxima: bool,
    include_minima: bool,
) -> Option<f64> {
    let value = |i: usize| match channel2 {
        Some(channel2) => 0.5 * (channel1[d + i] + channel2[d + i]),
        None => channel1[d + i],
    };
    let include_all = include_maxima == include_minima;

    match n {
        0 => return None,
        1 => return Some(0.0),
        2 => {
            let oriented = |x: f64| {
                if include_all {
                    x.abs()
                } else if include_maxima {
                    x
                } else {
                    -x
                }
            };
            let left = oriented(value(0));
            let right = oriented(value(1));
            return Some(if left > right {
                0.0
            } else if left < right {
                1.0
            } else {
                0.5
            });
        }
        _ => {}
    }

    let mut imin = 0;
    let mut imax = 0;
    let mut minimum = value(0);
    let mut maximum = minimum;
    for i in 1..n {
        let v = value(i);
        if v < minimum {
            minimum = v;
            imin = i;
        }
        if v > maximum {
            maximum = v;
            imax = i;
        }
    }

    if minimum == maximum {
        // Flat window
        return Some(0.5 * (n - 1) as f64);
    }

    let iextr = if include_all {
        if minimum.abs() > maximum.abs() {
            imin
        } else {
            imax
        }
    } else if include_maxima {
        imax
    } else {
        imin
    };

    if iextr == 0 || iextr == n - 1 {
        return Some(iextr as f64);
    }

    let left = value(iextr - 1);
    let mid = value(iextr);
    let right = value(iextr + 1);
    Some(iextr as f64 + 0.5 * (right - left) / (2.0 * mid - left - right))
}

impl Sound {
    /// Time of the dominant waveform extremum between `t_min` and `t_max`
    ///
    /// The search covers the samples from `floor(t_min)` to `ceil(t_max)`,
    /// clamped to the sound. When that leaves no samples, the middle of the
    /// requested window is returned instead.
    pub fn find_extremum(
        &self,
        t_min: f64,
        t_max: f64,
        include_maxima: bool,
        include_minima: bool,
    ) -> f64 {
        let nx = self.num_samples() as f64;
        let imin = self.x_to_index(t_min, Rounding::Floor).max(0.0);
        let imax = self.x_to_index(t_max, Rounding::Ceil).min(nx - 1.0);
        let n = if imax >= imin { (imax - imin) as usize + 1 } else { 0 };

        let channels = self.channels();
        let offset = find_extremum(
            &channels[0],
            channels.get(1).map(|c| c.as_slice()),
            imin as usize,
            n,
            include_maxima,
            include_minima,
        );

        match offset {
            Some(offset) => self.index_to_x(imin + offset),
            None => 0.5 * (t_min + t_max),
        }
    }
}
