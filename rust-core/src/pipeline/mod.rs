//! Band pipeline: per-tick orchestration and subscriber events

pub mod events;
pub mod processor;

pub use events::{BandFrame, BandSubscriber, CallbackSubscriber, ClipInfo, PipelineEvent};
pub use processor::{BandPipeline, PipelineConfig, PlaybackStatus};
