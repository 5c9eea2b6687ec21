//! Voice report
//!
//! Collects pulse counts and every jitter and shimmer measure for one sound
//! and pitch track, the way Praat's "Voice report" does. Undefined measures
//! serialize as `null`.

use serde::Serialize;
use tracing::info;

use crate::jitter::{jitter_ddp, jitter_local, jitter_local_absolute, jitter_ppq5, jitter_rap};
use crate::params::{PerturbationParams, PointProcessConfig};
use crate::shimmer::{
    shimmer_apq11, shimmer_apq3, shimmer_apq5, shimmer_dda, shimmer_local, shimmer_local_db,
};
use crate::{pitch_to_point, Pitch, PointProcess, Result, Sound};

/// Jitter measures; relative ones are fractions, not percentages
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JitterReport {
    pub local: Option<f64>,
    pub local_absolute: Option<f64>,
    pub rap: Option<f64>,
    pub ppq5: Option<f64>,
    pub ddp: Option<f64>,
}

/// Shimmer measures; relative ones are fractions, `local_db` is in dB
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShimmerReport {
    pub local: Option<f64>,
    pub local_db: Option<f64>,
    pub apq3: Option<f64>,
    pub apq5: Option<f64>,
    pub apq11: Option<f64>,
    pub dda: Option<f64>,
}

/// All perturbation measures over the whole sound
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceReport {
    pub num_pulses: usize,
    pub num_periods: usize,
    pub mean_period: Option<f64>,
    pub jitter: JitterReport,
    pub shimmer: ShimmerReport,
}

impl VoiceReport {
    /// Track pulses, then measure jitter and shimmer over all of them
    pub fn from_sound_and_pitch(
        sound: &Sound,
        pitch: &Pitch,
        params: &PerturbationParams,
        config: &PointProcessConfig,
    ) -> Result<Self> {
        let pulses = pitch_to_point(sound, pitch, config)?;
        Self::from_pulses(&pulses, sound, params)
    }

    /// Measure jitter and shimmer over already tracked pulses
    pub fn from_pulses(
        pulses: &PointProcess,
        sound: &Sound,
        params: &PerturbationParams,
    ) -> Result<Self> {
        let (tmin, tmax) = (0.0, 0.0);
        let report = Self {
            num_pulses: pulses.nt(),
            num_periods: pulses.count_periods(tmin, tmax, params),
            mean_period: pulses.mean_period(tmin, tmax, params),
            jitter: JitterReport {
                local: jitter_local(pulses, tmin, tmax, params),
                local_absolute: jitter_local_absolute(pulses, tmin, tmax, params),
                rap: jitter_rap(pulses, tmin, tmax, params),
                ppq5: jitter_ppq5(pulses, tmin, tmax, params),
                ddp: jitter_ddp(pulses, tmin, tmax, params),
            },
            shimmer: ShimmerReport {
                local: shimmer_local(pulses, sound, tmin, tmax, params)?,
                local_db: shimmer_local_db(pulses, sound, tmin, tmax, params)?,
                apq3: shimmer_apq3(pulses, sound, tmin, tmax, params)?,
                apq5: shimmer_apq5(pulses, sound, tmin, tmax, params)?,
                apq11: shimmer_apq11(pulses, sound, tmin, tmax, params)?,
                dda: shimmer_dda(pulses, sound, tmin, tmax, params)?,
            },
        };

        info!(
            pulses = report.num_pulses,
            periods = report.num_periods,
            jitter_local = ?report.jitter.local,
            shimmer_local = ?report.shimmer.local,
            "voice report"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unvoiced_report_is_undefined() {
        let sound = Sound::create_tone(100.0, 0.3, 8000.0, 0.5, 0.0).unwrap();
        let pitch = Pitch::from_frequencies(&[0.0; 30], 0.005, 0.01).unwrap();
        let report = VoiceReport::from_sound_and_pitch(
            &sound,
            &pitch,
            &PerturbationParams::default(),
            &PointProcessConfig::default(),
        )
        .unwrap();

        assert_eq!(report.num_pulses, 0);
        assert_eq!(report.num_periods, 0);
        assert!(report.jitter.local.is_none());
        assert!(report.shimmer.local.is_none());

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["jitter"]["local"].is_null());
        assert_eq!(json["num_pulses"], 0);
    }
}
