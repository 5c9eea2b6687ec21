//! Sound type for audio data representation
//!
//! The Sound type holds one or two channels of samples on a uniform time grid.
//! Analyses in this crate treat a stereo sound the way Praat does: wherever a
//! single waveform value is needed, the two channels are averaged.

use std::path::Path;

use crate::sampled::Sampled;
use crate::{PraatError, Result};

/// Audio samples with associated sample rate and timing information
#[derive(Debug, Clone)]
pub struct Sound {
    /// One or two channels of equal length (normalized to [-1, 1] range)
    channels: Vec<Vec<f64>>,
    /// Sample rate in Hz
    sample_rate: f64,
    /// Start time of the time domain (usually 0.0)
    start_time: f64,
}

impl Sound {
    /// Create a mono Sound from raw samples
    ///
    /// # Example
    /// ```
    /// use praatfan_voice::Sound;
    ///
    /// let samples = vec![0.0, 0.5, 1.0, 0.5, 0.0, -0.5, -1.0, -0.5];
    /// let sound = Sound::from_samples(&samples, 44100.0).unwrap();
    /// assert_eq!(sound.sample_rate(), 44100.0);
    /// assert_eq!(sound.num_channels(), 1);
    /// ```
    pub fn from_samples(samples: &[f64], sample_rate: f64) -> Result<Self> {
        Self::from_channels(vec![samples.to_vec()], sample_rate, 0.0)
    }

    /// Create a Sound from one or two owned channels
    ///
    /// # Arguments
    /// * `channels` - One (mono) or two (stereo) channels of equal length
    /// * `sample_rate` - Sample rate in Hz
    /// * `start_time` - Start of the time domain in seconds
    ///
    /// # Errors
    /// Returns `InvalidParameter` for an empty sound, a non-positive sample
    /// rate, a channel count other than 1 or 2, or channels of unequal length.
    pub fn from_channels(channels: Vec<Vec<f64>>, sample_rate: f64, start_time: f64) -> Result<Self> {
        if channels.is_empty() || channels.len() > 2 {
            return Err(PraatError::InvalidParameter(format!(
                "a sound needs 1 or 2 channels, got {}",
                channels.len()
            )));
        }
        if !(sample_rate > 0.0 && sample_rate.is_finite()) {
            return Err(PraatError::InvalidParameter(format!(
                "sample rate must be positive, got {}",
                sample_rate
            )));
        }
        let nx = channels[0].len();
        if nx == 0 {
            return Err(PraatError::InvalidParameter(
                "a sound needs at least one sample".to_string(),
            ));
        }
        if channels.iter().any(|c| c.len() != nx) {
            return Err(PraatError::InvalidParameter(
                "all channels must have the same number of samples".to_string(),
            ));
        }

        Ok(Self {
            channels,
            sample_rate,
            start_time,
        })
    }

    /// Load a Sound from a WAV file
    ///
    /// Mono and stereo files keep their channels; files with more channels are
    /// averaged to mono. Integer PCM is normalized to the [-1, 1] range.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        let sample_rate = spec.sample_rate as f64;
        let num_channels = spec.channels as usize;

        let interleaved: Vec<f64> = match spec.sample_format {
            hound::SampleFormat::Int => {
                let max_value = (1_i64 << (spec.bits_per_sample - 1)) as f64;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|s| s as f64 / max_value))
                    .collect::<std::result::Result<_, _>>()?
            }
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .map(|s| s.map(|s| s as f64))
                .collect::<std::result::Result<_, _>>()?,
        };

        let channels = match num_channels {
            0 => {
                return Err(PraatError::InvalidParameter(
                    "WAV file declares zero channels".to_string(),
                ))
            }
            1 | 2 => {
                let mut channels: Vec<Vec<f64>> = vec![Vec::new(); num_channels];
                for (i, &sample) in interleaved.iter().enumerate() {
                    channels[i % num_channels].push(sample);
                }
                channels
            }
            _ => vec![interleaved
                .chunks(num_channels)
                .map(|frame| frame.iter().sum::<f64>() / num_channels as f64)
                .collect()],
        };

        Self::from_channels(channels, sample_rate, 0.0)
    }

    /// Create a pure tone (sine wave)
    ///
    /// # Arguments
    /// * `frequency` - Frequency in Hz
    /// * `duration` - Duration in seconds
    /// * `sample_rate` - Sample rate in Hz
    /// * `amplitude` - Peak amplitude (0.0 to 1.0)
    /// * `phase` - Initial phase in radians
    pub fn create_tone(
        frequency: f64,
        duration: f64,
        sample_rate: f64,
        amplitude: f64,
        phase: f64,
    ) -> Result<Sound> {
        let n_samples = (duration * sample_rate).round() as usize;
        let omega = 2.0 * std::f64::consts::PI * frequency / sample_rate;

        let samples: Vec<f64> = (0..n_samples)
            .map(|i| amplitude * (omega * i as f64 + phase).sin())
            .collect();

        Self::from_channels(vec![samples], sample_rate, 0.0)
    }

    /// Get the sample rate in Hz
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Number of channels (1 or 2)
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Get the samples of one channel (0-based)
    pub fn channel(&self, index: usize) -> Option<&[f64]> {
        self.channels.get(index).map(|c| c.as_slice())
    }

    /// Get all channels
    pub fn channels(&self) -> &[Vec<f64>] {
        &self.channels
    }

    /// Get the number of samples per channel
    pub fn num_samples(&self) -> usize {
        self.channels[0].len()
    }

    /// Get the total duration in seconds
    pub fn duration(&self) -> f64 {
        self.num_samples() as f64 / self.sample_rate
    }

    /// Get the start time of the time domain
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Get the end time (time just after last sample)
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration()
    }

    /// Waveform value at sample `index`, averaging channels for stereo
    #[inline]
    pub fn value(&self, index: usize) -> f64 {
        match self.channels.as_slice() {
            [mono] => mono[index],
            [left, right] => 0.5 * (left[index] + right[index]),
            channels => {
                channels.iter().map(|c| c[index]).sum::<f64>() / channels.len() as f64
            }
        }
    }

    /// Largest absolute sample value over all channels
    pub fn peak(&self) -> f64 {
        self.channels
            .iter()
            .flat_map(|c| c.iter())
            .map(|&s| s.abs())
            .fold(0.0, f64::max)
    }
}

impl Sampled for Sound {
    /// Following Praat's convention, samples are centered in their time slots:
    /// x1 = xmin + 0.5 * dx
    fn x1(&self) -> f64 {
        self.start_time + 0.5 * self.dx()
    }

    fn dx(&self) -> f64 {
        1.0 / self.sample_rate
    }

    fn nx(&self) -> usize {
        self.num_samples()
    }

    fn xmin(&self) -> f64 {
        self.start_time
    }

    fn xmax(&self) -> f64 {
        self.end_time()
    }
}
