use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use super::error::{ProcessError, Result};

/// Decibels added per unit of amplification factor.
pub const DB_PER_FACTOR: f64 = 10.0;

/// Gain applied for a user-facing amplification factor.
///
/// The factor is an additive decibel shift, not a linear multiplier:
/// factor 1 is +10 dB, factor 2 is +20 dB.
pub fn gain_db_for_factor(factor: f64) -> f64 {
    DB_PER_FACTOR * factor
}

pub fn db_to_linear(db: f64) -> f64 {
    10f64.powf(db / 20.0)
}

/// Decoded PCM held in memory, normalised to `[-1.0, 1.0]`.
#[derive(Debug, Clone)]
pub struct AudioClip {
    spec: WavSpec,
    samples: Vec<f32>,
}

impl AudioClip {
    pub fn new(spec: WavSpec, samples: Vec<f32>) -> Self {
        Self { spec, samples }
    }

    /// Read a whole WAV file (integer PCM up to 32 bits, or 32-bit float).
    pub fn read_wav(path: &Path) -> Result<Self> {
        let mut reader = WavReader::open(path)?;
        let spec = reader.spec();

        let samples = match spec.sample_format {
            SampleFormat::Int => {
                if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                    return Err(ProcessError::UnsupportedAudio(format!(
                        "{}-bit integer PCM",
                        spec.bits_per_sample
                    )));
                }
                let scale = full_scale(spec.bits_per_sample);
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| (v as f64 / scale) as f32))
                    .collect::<std::result::Result<Vec<_>, _>>()?
            }
            SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<std::result::Result<Vec<_>, _>>()?,
        };

        Ok(Self { spec, samples })
    }

    pub fn spec(&self) -> WavSpec {
        self.spec
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn duration_secs(&self) -> f64 {
        let frames = self.samples.len() / self.spec.channels.max(1) as usize;
        frames as f64 / self.spec.sample_rate as f64
    }

    /// Shift every sample by `db` decibels, clipping at full scale.
    pub fn apply_gain_db(&mut self, db: f64) {
        let gain = db_to_linear(db);
        for s in &mut self.samples {
            *s = (*s as f64 * gain).clamp(-1.0, 1.0) as f32;
        }
    }

    /// Absolute peak in dBFS; `-inf` for silence.
    pub fn peak_dbfs(&self) -> f64 {
        let peak = self
            .samples
            .iter()
            .fold(0.0f32, |acc, s| acc.max(s.abs()));
        20.0 * (peak as f64).log10()
    }

    /// Write using the clip's own spec.
    pub fn write_wav(&self, path: &Path) -> Result<()> {
        let mut writer = WavWriter::create(path, self.spec)?;
        match self.spec.sample_format {
            SampleFormat::Int => {
                let scale = full_scale(self.spec.bits_per_sample);
                let max = scale - 1.0;
                for &s in &self.samples {
                    let v = (s as f64 * scale).round().clamp(-scale, max);
                    writer.write_sample(v as i32)?;
                }
            }
            SampleFormat::Float => {
                for &s in &self.samples {
                    writer.write_sample(s)?;
                }
            }
        }
        writer.finalize()?;
        Ok(())
    }
}

fn full_scale(bits: u16) -> f64 {
    (1u64 << (bits - 1)) as f64
}
