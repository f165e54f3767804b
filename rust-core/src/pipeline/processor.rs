//! Tick-driven band pipeline
//!
//! spectrum source → snapshot → aggregation → envelope → subscribers
//!
//! Borders are the only cached derivation. They are recomputed when the
//! configuration changes and swapped in only if the new configuration is
//! valid, so a tick never sees a partially applied layout.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::events::{BandFrame, BandSubscriber, ClipInfo};
use crate::bands::{BandBorders, BandConfiguration, BandPlan};
use crate::envelope::{EnvelopeSmoother, SmootherConfig};
use crate::error::{ConfigResult, ConfigurationError};
use crate::spectrum::{Aggregation, SpectrumFrame, SpectrumSource};

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Band layout
    pub bands: BandConfiguration,

    /// Per-band summary of the spectrum
    pub aggregation: Aggregation,

    /// Envelope tuning
    pub smoothing: SmootherConfig,

    /// Emit envelope values rather than raw aggregated values
    pub smoothing_enabled: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            bands: BandConfiguration::default(),
            aggregation: Aggregation::Average,
            smoothing: SmootherConfig::default(),
            smoothing_enabled: true,
        }
    }
}

/// Transport state read once per tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlaybackStatus {
    pub playing: bool,
    pub time_seconds: Option<f64>,
}

impl PlaybackStatus {
    /// Live input: always emitting, no position
    pub fn live() -> Self {
        Self {
            playing: true,
            time_seconds: None,
        }
    }

    /// Playing clip at `time_seconds`
    pub fn playing_at(time_seconds: f64) -> Self {
        Self {
            playing: true,
            time_seconds: Some(time_seconds),
        }
    }

    /// Paused clip at `time_seconds`; ticks run but nothing is emitted
    pub fn paused_at(time_seconds: f64) -> Self {
        Self {
            playing: false,
            time_seconds: Some(time_seconds),
        }
    }
}

/// Turns spectrum snapshots into smoothed band values once per tick
///
/// Owned by a single update loop. Subscribers are supplied by the host; no
/// process-wide state is involved.
pub struct BandPipeline<S: SpectrumSource> {
    source: S,
    plan: BandPlan,
    frame: SpectrumFrame,
    aggregation: Aggregation,
    smoother: EnvelopeSmoother,
    smoothing_enabled: bool,
    clip: Option<ClipInfo>,
    subscribers: Vec<Box<dyn BandSubscriber>>,
    latest: BandFrame,
}

impl<S: SpectrumSource> BandPipeline<S> {
    /// Create a pipeline reading from `source`
    pub fn new(config: PipelineConfig, source: S) -> ConfigResult<Self> {
        let plan = BandPlan::new(config.bands)?;
        let frame = SpectrumFrame::new(plan.borders().clone());

        info!(
            bands = plan.band_count(),
            spectrum_length = frame.spectrum().len(),
            "band pipeline created"
        );

        Ok(Self {
            source,
            plan,
            frame,
            aggregation: config.aggregation,
            smoother: EnvelopeSmoother::new(config.smoothing),
            smoothing_enabled: config.smoothing_enabled,
            clip: None,
            subscribers: Vec::new(),
            latest: BandFrame::default(),
        })
    }

    /// Builder form of [`subscribe`](Self::subscribe)
    pub fn with_subscriber(mut self, subscriber: impl BandSubscriber + 'static) -> Self {
        self.subscribe(Box::new(subscriber));
        self
    }

    /// Add a subscriber; it receives every later emission
    pub fn subscribe(&mut self, subscriber: Box<dyn BandSubscriber>) {
        self.subscribers.push(subscriber);
    }

    /// Get number of attached subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Switch to a new clip
    ///
    /// Borders are recomputed for the clip's sample rate. On success every
    /// subscriber is notified once; on failure the previous clip and layout
    /// stay active.
    ///
    /// # Arguments
    /// * `clip` - Name, duration and sample rate of the new clip
    ///
    /// # Returns
    /// `Ok(())` once the clip is active, or the reason its sample rate was
    /// rejected
    pub fn load_clip(&mut self, clip: ClipInfo) -> ConfigResult<()> {
        let mut config = self.plan.config().clone();
        config.sample_rate_hz = clip.sample_rate_hz;
        self.apply(config)?;

        info!(
            name = %clip.name,
            duration = clip.duration_seconds,
            sample_rate = clip.sample_rate_hz,
            "clip loaded"
        );
        for subscriber in self.subscribers.iter_mut() {
            subscriber.on_clip_loaded(&clip);
        }
        self.clip = Some(clip);
        Ok(())
    }

    /// Replace the band layout
    ///
    /// Must be called between ticks. A rejected configuration leaves the
    /// current borders in place.
    pub fn reconfigure(&mut self, config: BandConfiguration) -> ConfigResult<()> {
        self.apply(config)
    }

    fn apply(&mut self, config: BandConfiguration) -> ConfigResult<()> {
        let plan = match BandPlan::new(config) {
            Ok(plan) => plan,
            Err(err) => {
                warn!(error = %err, "rejected band configuration, keeping previous layout");
                return Err(err);
            }
        };

        info!(
            bands = plan.band_count(),
            spectrum_length = plan.config().spectrum_length,
            "band layout updated"
        );
        self.frame.set_borders(plan.borders().clone());
        self.plan = plan;
        Ok(())
    }

    /// Switch between band averages and band maximums
    pub fn set_aggregation(&mut self, aggregation: Aggregation) {
        self.aggregation = aggregation;
    }

    /// Retune the envelope; current envelope values are kept
    pub fn set_smoothing(&mut self, config: SmootherConfig) {
        self.smoother.set_config(config);
    }

    /// Emit raw aggregated values when `enabled` is false
    pub fn set_smoothing_enabled(&mut self, enabled: bool) {
        self.smoothing_enabled = enabled;
    }

    /// Zero all envelopes
    pub fn reset_envelopes(&mut self) {
        self.smoother.reset();
    }

    /// Run one update
    ///
    /// Reads the source, aggregates, advances the envelope by `dt` seconds
    /// and, while `playback.playing`, delivers the frame to subscribers.
    /// The envelope keeps tracking even when paused or when smoothing is
    /// disabled.
    ///
    /// # Arguments
    /// * `dt` - Seconds since the previous tick
    /// * `playback` - Whether to emit, and the position to stamp the frame with
    ///
    /// # Returns
    /// The frame just produced, also available from [`latest`](Self::latest)
    pub fn tick(&mut self, dt: f32, playback: PlaybackStatus) -> &BandFrame {
        self.source.get_spectrum(self.frame.spectrum_mut());

        let raw = self.frame.aggregate(self.aggregation);
        let smoothed = self.smoother.advance(&raw, dt);

        let values = if self.smoothing_enabled {
            smoothed.to_vec()
        } else {
            raw
        };
        self.latest = BandFrame {
            values,
            time_seconds: playback.time_seconds,
        };

        if playback.playing {
            for subscriber in self.subscribers.iter_mut() {
                subscriber.on_bands(&self.latest);
            }
        }

        &self.latest
    }

    /// Frame produced by the last tick
    pub fn latest(&self) -> &BandFrame {
        &self.latest
    }

    /// Get the active band borders
    pub fn borders(&self) -> &BandBorders {
        self.plan.borders()
    }

    /// Get number of bands in each emitted frame
    pub fn band_count(&self) -> usize {
        self.plan.band_count()
    }

    /// Get the active band layout
    pub fn band_config(&self) -> &BandConfiguration {
        self.plan.config()
    }

    /// Current configuration as a whole
    pub fn config(&self) -> PipelineConfig {
        PipelineConfig {
            bands: self.plan.config().clone(),
            aggregation: self.aggregation,
            smoothing: *self.smoother.config(),
            smoothing_enabled: self.smoothing_enabled,
        }
    }

    /// Get the clip accepted by the last successful `load_clip`
    pub fn clip(&self) -> Option<&ClipInfo> {
        self.clip.as_ref()
    }

    /// Get the spectrum source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get the spectrum source for pushing snapshots
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Get number of magnitudes each snapshot must carry
    pub fn spectrum_length(&self) -> usize {
        self.plan.config().spectrum_length
    }

    /// Reject a snapshot whose length does not match the band layout
    pub fn check_spectrum_length(&self, length: usize) -> ConfigResult<()> {
        let expected = self.spectrum_length();
        if length == expected {
            Ok(())
        } else {
            Err(ConfigurationError::SpectrumLengthMismatch {
                expected,
                actual: length,
            })
        }
    }
}
