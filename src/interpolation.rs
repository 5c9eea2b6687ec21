//! Interpolation helpers
//!
//! Parabolic refinement of discrete extrema (used for pulse positions and
//! correlation lags) and piecewise-linear interpolation through irregular
//! knots (used for the frequency-at-time function of a pitch track).

/// Linear interpolation between two values
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Vertex of the parabola through `(-1, left)`, `(0, mid)`, `(1, right)`
///
/// Returns `(offset, value)` where `offset` is relative to the middle sample.
/// Returns `None` when the three points are collinear (zero curvature), in
/// which case no refinement is possible.
pub fn parabolic_vertex(left: f64, mid: f64, right: f64) -> Option<(f64, f64)> {
    let d2 = 2.0 * mid - left - right;
    if d2 == 0.0 {
        return None;
    }
    let d1 = 0.5 * (right - left);
    Some((d1 / d2, mid + 0.5 * d1 * d1 / d2))
}

/// Piecewise-linear function through `(x, y)` knots sorted by `x`
///
/// Outside the knot range the first or last segment is extended linearly.
/// A single knot defines a constant function.
pub fn linear_through_knots(knots: &[(f64, f64)], x: f64) -> Option<f64> {
    match knots {
        [] => None,
        [(_, y)] => Some(*y),
        _ => {
            // Index of the segment [i, i+1] used for x
            let upper = knots.partition_point(|&(kx, _)| kx <= x);
            let i = upper.saturating_sub(1).min(knots.len() - 2);
            let (x0, y0) = knots[i];
            let (x1, y1) = knots[i + 1];
            if x1 == x0 {
                return Some(y0);
            }
            Some(lerp(y0, y1, (x - x0) / (x1 - x0)))
        }
    }
}
