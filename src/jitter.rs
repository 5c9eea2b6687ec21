//! Period perturbation (jitter)
//!
//! All measures look at the intervals between consecutive pulses inside a
//! time window. Intervals that fall outside `[pmin, pmax]`, or differ from
//! their neighbours by more than `maximum_period_factor`, are left out of the
//! average. An empty window (`tmin >= tmax`) means the whole point process.
//!
//! Every function returns `None` when too few usable periods remain.

use crate::params::PerturbationParams;
use crate::PointProcess;

/// Local jitter: mean absolute difference between consecutive periods,
/// divided by the mean period
///
/// A result of 0.01 means 1 %.
pub fn jitter_local(
    pp: &PointProcess,
    tmin: f64,
    tmax: f64,
    params: &PerturbationParams,
) -> Option<f64> {
    let absolute = jitter_local_absolute(pp, tmin, tmax, params)?;
    let mean_period = pp.mean_period(tmin, tmax, params)?;
    Some(absolute / mean_period)
}

/// Mean absolute difference between consecutive periods, in seconds
pub fn jitter_local_absolute(
    pp: &PointProcess,
    tmin: f64,
    tmax: f64,
    params: &PerturbationParams,
) -> Option<f64> {
    let (tmin, tmax) = pp.auto_window(tmin, tmax);
    let (first, last) = pp.window_points(tmin, tmax)?;
    let t = pp.times();

    let mut num_periods = last - first;
    if num_periods < 2 {
        return None;
    }

    let mut sum = 0.0;
    for i in first + 1..last {
        let p1 = t[i] - t[i - 1];
        let p2 = t[i + 1] - t[i];
        if params.periods_consistent(&[p1, p2]) {
            sum += (p1 - p2).abs();
        } else {
            num_periods -= 1;
        }
    }

    if num_periods < 2 {
        return None;
    }
    Some(sum / (num_periods - 1) as f64)
}

/// Relative average perturbation: each period against the mean of itself and
/// its two neighbours, divided by the mean period
pub fn jitter_rap(
    pp: &PointProcess,
    tmin: f64,
    tmax: f64,
    params: &PerturbationParams,
) -> Option<f64> {
    let perturbation = period_perturbation(pp, tmin, tmax, params, 3)?;
    let mean_period = pp.mean_period(tmin, tmax, params)?;
    Some(perturbation / mean_period)
}

/// Five-point period perturbation quotient
pub fn jitter_ppq5(
    pp: &PointProcess,
    tmin: f64,
    tmax: f64,
    params: &PerturbationParams,
) -> Option<f64> {
    let perturbation = period_perturbation(pp, tmin, tmax, params, 5)?;
    let mean_period = pp.mean_period(tmin, tmax, params)?;
    Some(perturbation / mean_period)
}

/// Difference of differences of periods; three times [`jitter_rap`]
pub fn jitter_ddp(
    pp: &PointProcess,
    tmin: f64,
    tmax: f64,
    params: &PerturbationParams,
) -> Option<f64> {
    jitter_rap(pp, tmin, tmax, params).map(|rap| 3.0 * rap)
}

/// Mean absolute deviation of each period from the average of the `order`
/// periods centered on it, in seconds
fn period_perturbation(
    pp: &PointProcess,
    tmin: f64,
    tmax: f64,
    params: &PerturbationParams,
    order: usize,
) -> Option<f64> {
    let (tmin, tmax) = pp.auto_window(tmin, tmax);
    let (first, last) = pp.window_points(tmin, tmax)?;
    let t = pp.times();

    let periods: Vec<f64> = (first..last).map(|i| t[i + 1] - t[i]).collect();
    let mut num_periods = periods.len();
    if num_periods < order {
        return None;
    }

    let half = order / 2;
    let mut sum = 0.0;
    for window in periods.windows(order) {
        if params.periods_consistent(window) {
            let mean = window.iter().sum::<f64>() / order as f64;
            sum += (window[half] - mean).abs();
        } else {
            num_periods -= 1;
        }
    }

    if num_periods < order {
        return None;
    }
    Some(sum / (num_periods - (order - 1)) as f64)
}
