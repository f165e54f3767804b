//! Configuration errors
//!
//! Raised synchronously when a band configuration is recomputed. A rejected
//! configuration never replaces the active one.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("Spectrum length {0} must be a power of two strictly between 64 and 8192")]
    InvalidSpectrumLength(usize),

    #[error("Sample rate must be a positive finite number of Hz (got {0})")]
    InvalidSampleRate(f64),

    #[error("Automatic band count {0} must be between 1 and the spectrum length")]
    InvalidBandCount(u32),

    #[error("Automatic band division must be at least 2 (got {0})")]
    InvalidDivision(u32),

    #[error("Border frequency {value} Hz at position {index} is not a finite, non-negative number")]
    InvalidFrequency { index: usize, value: f64 },

    #[error("Border at position {index} ({value}) does not increase over the previous border")]
    UnsortedBorders { index: usize, value: f64 },

    #[error("Border at position {index} maps to sample index {sample}, outside [0, {spectrum_length})")]
    BorderOutOfRange {
        index: usize,
        sample: usize,
        spectrum_length: usize,
    },

    #[error("Band {band} spans no sample indices")]
    EmptyBand { band: usize },

    #[error("Band {band} spans {span} samples and cannot be split into {subdivisions} sub-bands")]
    ZeroWidthSubBand {
        band: usize,
        span: usize,
        subdivisions: u32,
    },

    #[error("Spectrum snapshot has {actual} magnitudes, the band layout expects {expected}")]
    SpectrumLengthMismatch { expected: usize, actual: usize },
}

pub type ConfigResult<T> = Result<T, ConfigurationError>;
