//! Band layout configuration
//!
//! Describes where band borders come from and how bands are subdivided.
//! Border indices are derived from this by [`BandPlan`](super::BandPlan).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigResult, ConfigurationError};

/// Smallest accepted spectrum length is the power of two above this bound
pub const MIN_SPECTRUM_LENGTH: usize = 64;

/// Largest accepted spectrum length is the power of two below this bound
pub const MAX_SPECTRUM_LENGTH: usize = 8192;

/// Source of the base band cutoffs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BorderSource {
    /// Ascending cutoff frequencies in Hz
    Explicit(Vec<f64>),

    /// `band_count` bands whose cutoffs are the Nyquist frequency divided
    /// repeatedly by `division`, widest band at the top of the spectrum
    Automatic { band_count: u32, division: u32 },
}

/// How base bands are split into narrower sub-bands
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum SubdivisionPolicy {
    /// Keep base bands as they are
    #[default]
    None,

    /// Split band `i` into `map[i]` equal parts (1 when absent)
    Manual(BTreeMap<usize, u32>),

    /// Split most around `center`, tapering by `falloff` per band of distance
    /// and stopping beyond `width` bands
    CenteredAuto {
        center: usize,
        multiplier: u32,
        width: usize,
        falloff: u32,
    },
}

/// Everything needed to derive band borders for one clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandConfiguration {
    /// Number of spectrum magnitudes per snapshot
    pub spectrum_length: usize,

    /// Sample rate of the analysed clip in Hz
    pub sample_rate_hz: f64,

    /// Base band cutoffs
    pub borders: BorderSource,

    /// Subdivision applied after base bands are mapped to sample indices
    pub subdivision: SubdivisionPolicy,
}

impl Default for BandConfiguration {
    fn default() -> Self {
        Self {
            spectrum_length: 512,
            sample_rate_hz: 44100.0,
            borders: BorderSource::Automatic {
                band_count: 7,
                division: 2,
            },
            subdivision: SubdivisionPolicy::None,
        }
    }
}

impl BandConfiguration {
    /// Check the scalar fields
    ///
    /// Border placement is checked when borders are computed, since it
    /// depends on the index mapping.
    pub fn validate(&self) -> ConfigResult<()> {
        validate_spectrum_length(self.spectrum_length)?;

        if !self.sample_rate_hz.is_finite() || self.sample_rate_hz <= 0.0 {
            return Err(ConfigurationError::InvalidSampleRate(self.sample_rate_hz));
        }

        match &self.borders {
            BorderSource::Automatic {
                band_count,
                division,
            } => {
                // Each base band needs at least one sample
                if *band_count == 0 || *band_count as usize > self.spectrum_length {
                    return Err(ConfigurationError::InvalidBandCount(*band_count));
                }
                if *division < 2 {
                    return Err(ConfigurationError::InvalidDivision(*division));
                }
            }
            BorderSource::Explicit(frequencies) => {
                for (index, &value) in frequencies.iter().enumerate() {
                    if !value.is_finite() || value < 0.0 {
                        return Err(ConfigurationError::InvalidFrequency { index, value });
                    }
                    if index > 0 && value <= frequencies[index - 1] {
                        return Err(ConfigurationError::UnsortedBorders { index, value });
                    }
                }
            }
        }

        Ok(())
    }

    /// Number of bands before subdivision
    pub fn base_band_count(&self) -> usize {
        match &self.borders {
            BorderSource::Explicit(frequencies) => frequencies.len() + 1,
            BorderSource::Automatic { band_count, .. } => *band_count as usize,
        }
    }

    /// Spectrum magnitudes per Hz, i.e. the factor mapping a frequency to a
    /// sample index
    pub fn samples_per_hz(&self) -> f64 {
        self.spectrum_length as f64 / self.sample_rate_hz
    }
}

/// Spectrum length must be a power of two with 64 < n < 8192
pub fn validate_spectrum_length(length: usize) -> ConfigResult<()> {
    if length.is_power_of_two() && length > MIN_SPECTRUM_LENGTH && length < MAX_SPECTRUM_LENGTH {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidSpectrumLength(length))
    }
}
