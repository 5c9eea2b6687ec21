//! Amplitude perturbation (shimmer)
//!
//! Each measure first extracts the per-period amplitudes with
//! [`point_to_amplitude_period`] and then compares neighbouring amplitudes.
//! Amplitudes are only compared when the pulses carrying them are a plausible
//! period apart and the amplitudes differ by at most
//! `maximum_amplitude_factor`.
//!
//! A window with too few pulses, or without any comparable pair, gives
//! `Ok(None)`.

use crate::amplitude::{point_to_amplitude_period, AmplitudePoint, AmplitudeTier};
use crate::params::{ratio_at_least_one, PerturbationParams};
use crate::{PointProcess, PraatError, Result, Sound};

impl AmplitudeTier {
    /// Mean absolute difference between consecutive amplitudes, divided by
    /// the mean amplitude
    pub fn shimmer_local(&self, params: &PerturbationParams) -> Option<f64> {
        let differences = comparable_pairs(self.points(), params)
            .map(|(a1, a2)| (a1 - a2).abs())
            .collect::<Vec<_>>();
        let numerator = mean(&differences)?;
        relative_to_mean_amplitude(self, numerator)
    }

    /// Mean absolute base-10 log ratio of consecutive amplitudes, in dB
    pub fn shimmer_local_db(&self, params: &PerturbationParams) -> Option<f64> {
        let ratios = comparable_pairs(self.points(), params)
            .map(|(a1, a2)| (a1 / a2).log10().abs())
            .collect::<Vec<_>>();
        mean(&ratios).map(|m| 20.0 * m)
    }

    /// Amplitude perturbation quotient over `order` consecutive periods
    ///
    /// Each amplitude is compared to the mean of the `order` amplitudes
    /// centered on it; the mean deviation is divided by the mean amplitude.
    pub fn shimmer_apq(&self, order: usize, params: &PerturbationParams) -> Option<f64> {
        if order < 3 || order % 2 == 0 {
            return None;
        }
        let half = order / 2;
        let deviations = self
            .points()
            .windows(order)
            .filter(|window| window_comparable(window, params))
            .map(|window| {
                let mean = window.iter().map(|p| p.value).sum::<f64>() / order as f64;
                (window[half].value - mean).abs()
            })
            .collect::<Vec<_>>();
        let numerator = mean(&deviations)?;
        relative_to_mean_amplitude(self, numerator)
    }
}

/// Consecutive amplitude pairs whose pulses are a period apart and whose
/// values differ by at most the amplitude factor
fn comparable_pairs<'a>(
    points: &'a [AmplitudePoint],
    params: &'a PerturbationParams,
) -> impl Iterator<Item = (f64, f64)> + 'a {
    points
        .windows(2)
        .filter(move |pair| window_comparable(pair, params))
        .map(|pair| (pair[0].value, pair[1].value))
}

fn window_comparable(window: &[AmplitudePoint], params: &PerturbationParams) -> bool {
    window.windows(2).all(|pair| {
        let period = pair[1].time - pair[0].time;
        (params.bounds_disabled() || params.period_in_range(period))
            && ratio_at_least_one(pair[0].value, pair[1].value) <= params.maximum_amplitude_factor
    })
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn relative_to_mean_amplitude(tier: &AmplitudeTier, numerator: f64) -> Option<f64> {
    tier.mean_value()
        .filter(|&denominator| denominator != 0.0)
        .map(|denominator| numerator / denominator)
}

/// Extract amplitudes, treating too few pulses as "no measurement"
fn amplitudes(
    pp: &PointProcess,
    sound: &Sound,
    tmin: f64,
    tmax: f64,
    params: &PerturbationParams,
) -> Result<Option<AmplitudeTier>> {
    match point_to_amplitude_period(pp, sound, tmin, tmax, params) {
        Ok(tier) => Ok(Some(tier)),
        Err(PraatError::TooFewPulses { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Local shimmer: mean absolute difference between consecutive period
/// amplitudes, divided by the mean amplitude
///
/// A result of 0.05 means 5 %.
pub fn shimmer_local(
    pp: &PointProcess,
    sound: &Sound,
    tmin: f64,
    tmax: f64,
    params: &PerturbationParams,
) -> Result<Option<f64>> {
    Ok(amplitudes(pp, sound, tmin, tmax, params)?.and_then(|tier| tier.shimmer_local(params)))
}

/// Local shimmer in dB
pub fn shimmer_local_db(
    pp: &PointProcess,
    sound: &Sound,
    tmin: f64,
    tmax: f64,
    params: &PerturbationParams,
) -> Result<Option<f64>> {
    Ok(amplitudes(pp, sound, tmin, tmax, params)?.and_then(|tier| tier.shimmer_local_db(params)))
}

/// Three-point amplitude perturbation quotient
pub fn shimmer_apq3(
    pp: &PointProcess,
    sound: &Sound,
    tmin: f64,
    tmax: f64,
    params: &PerturbationParams,
) -> Result<Option<f64>> {
    Ok(amplitudes(pp, sound, tmin, tmax, params)?.and_then(|tier| tier.shimmer_apq(3, params)))
}

/// Five-point amplitude perturbation quotient
pub fn shimmer_apq5(
    pp: &PointProcess,
    sound: &Sound,
    tmin: f64,
    tmax: f64,
    params: &PerturbationParams,
) -> Result<Option<f64>> {
    Ok(amplitudes(pp, sound, tmin, tmax, params)?.and_then(|tier| tier.shimmer_apq(5, params)))
}

/// Eleven-point amplitude perturbation quotient
pub fn shimmer_apq11(
    pp: &PointProcess,
    sound: &Sound,
    tmin: f64,
    tmax: f64,
    params: &PerturbationParams,
) -> Result<Option<f64>> {
    Ok(amplitudes(pp, sound, tmin, tmax, params)?.and_then(|tier| tier.shimmer_apq(11, params)))
}

/// Difference of differences of amplitudes; three times [`shimmer_apq3`]
pub fn shimmer_dda(
    pp: &PointProcess,
    sound: &Sound,
    tmin: f64,
    tmax: f64,
    params: &PerturbationParams,
) -> Result<Option<f64>> {
    Ok(shimmer_apq3(pp, sound, tmin, tmax, params)?.map(|apq3| 3.0 * apq3))
}
