//! Band layout: configuration and border computation

pub mod config;
pub mod plan;

pub use config::{validate_spectrum_length, BandConfiguration, BorderSource, SubdivisionPolicy};
pub use plan::{BandBorders, BandPlan};
