//! Time/index conversions for uniformly sampled objects
//!
//! Both [`Sound`](crate::Sound) and [`Pitch`](crate::Pitch) are sampled on a
//! regular grid: element `i` (0-based) sits at time `x1 + i * dx`. This module
//! provides the conversions in both directions, following Praat's `Sampled`
//! conventions but with 0-based indices.

/// Rounding applied when converting a time to a sample index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rounding {
    /// Keep the fractional index
    #[default]
    None,
    /// Round to the nearest index (Praat's `xToNearestIndex`)
    Nearest,
    /// Round down (Praat's `xToLowIndex`)
    Floor,
    /// Round up (Praat's `xToHighIndex`)
    Ceil,
}

impl Rounding {
    fn apply(self, index: f64) -> f64 {
        match self {
            Rounding::None => index,
            Rounding::Nearest => index.round(),
            Rounding::Floor => index.floor(),
            Rounding::Ceil => index.ceil(),
        }
    }
}

/// A uniformly sampled function of time
pub trait Sampled {
    /// Time of the first sample (or frame) center
    fn x1(&self) -> f64;

    /// Time step between consecutive samples
    fn dx(&self) -> f64;

    /// Number of samples
    fn nx(&self) -> usize;

    /// Start of the time domain
    fn xmin(&self) -> f64 {
        self.x1() - 0.5 * self.dx()
    }

    /// End of the time domain
    fn xmax(&self) -> f64 {
        self.x1() + (self.nx() as f64 - 0.5) * self.dx()
    }

    /// Time of sample `index` (may be fractional or outside `[0, nx)`)
    fn index_to_x(&self, index: f64) -> f64 {
        self.x1() + index * self.dx()
    }

    /// Sample index of time `x`
    ///
    /// No clamping is done; callers keep the result within `[0, nx-1]`
    /// where they need a valid index.
    fn x_to_index(&self, x: f64, rounding: Rounding) -> f64 {
        rounding.apply((x - self.x1()) / self.dx())
    }

    /// Range of sample indices whose times lie inside `[xmin, xmax]`
    ///
    /// Returns `None` when no sample falls inside the window.
    fn window_samples(&self, xmin: f64, xmax: f64) -> Option<(usize, usize)> {
        if self.nx() == 0 {
            return None;
        }
        let first = self.x_to_index(xmin, Rounding::Ceil).max(0.0);
        let last = self
            .x_to_index(xmax, Rounding::Floor)
            .min((self.nx() - 1) as f64);
        if last < first {
            None
        } else {
            Some((first as usize, last as usize))
        }
    }
}
