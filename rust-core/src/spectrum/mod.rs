//! Spectrum snapshots: sources and per-band aggregation

pub mod frame;
pub mod source;

pub use frame::{aggregate, Aggregation, SpectrumFrame};
pub use source::{ManualSource, SpectrumConsumer, SpectrumProducer, SpectrumRingBuffer, SpectrumSource};
