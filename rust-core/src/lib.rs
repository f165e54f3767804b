//! Spectral Bands - Spectrum to Animated Band Values
//!
//! Derives band borders from clip and layout settings, aggregates spectrum
//! snapshots per band and smooths the result with an attack/decay envelope.

// Suppress PyO3 non-local impl warnings (harmless macro-generated code)
#![cfg_attr(feature = "python", allow(non_local_definitions))]

pub mod bands;
pub mod envelope;
pub mod error;
pub mod pipeline;
pub mod spectrum;

#[cfg(feature = "python")]
pub mod python_bindings;

pub use bands::{BandBorders, BandConfiguration, BandPlan, BorderSource, SubdivisionPolicy};
pub use envelope::{EnvelopeSmoother, SmootherConfig};
pub use error::ConfigurationError;
pub use pipeline::{BandFrame, BandPipeline, BandSubscriber, ClipInfo, PipelineConfig, PlaybackStatus};
pub use spectrum::{Aggregation, SpectrumFrame, SpectrumSource};
