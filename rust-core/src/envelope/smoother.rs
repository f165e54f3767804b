//! Attack/decay envelope for band values
//!
//! Rises instantly to any louder value, then falls with a decay rate that
//! itself grows every tick, so bars drop slowly at first and then faster.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Envelope tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmootherConfig {
    /// Decay rate (value units per second) right after an attack
    pub base_decay_rate: f32,

    /// Relative growth of the decay rate per second
    pub decay_scale: f32,

    /// Clamp decayed values at zero
    pub floor_at_zero: bool,
}

impl Default for SmootherConfig {
    fn default() -> Self {
        Self {
            base_decay_rate: 0.005,
            decay_scale: 1.2,
            floor_at_zero: false,
        }
    }
}

/// Envelope of one band
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnvelopeState {
    pub value: f32,
    pub decay_rate: f32,
}

/// Per-band attack/decay filter
#[derive(Debug, Clone)]
pub struct EnvelopeSmoother {
    config: SmootherConfig,
    state: Vec<EnvelopeState>,
    output: Vec<f32>,
}

impl EnvelopeSmoother {
    /// Create a smoother with no bands; the first `advance` sizes it
    pub fn new(config: SmootherConfig) -> Self {
        Self {
            config,
            state: Vec::new(),
            output: Vec::new(),
        }
    }

    /// Feed one tick of raw band values, `dt` seconds after the previous one
    ///
    /// A band count different from the current state starts over from
    /// zeroed envelopes.
    ///
    /// # Arguments
    /// * `raw` - Aggregated band values for this tick
    /// * `dt` - Seconds since the previous tick
    ///
    /// # Returns
    /// Smoothed values, one per band
    pub fn advance(&mut self, raw: &[f32], dt: f32) -> &[f32] {
        if raw.len() != self.state.len() {
            debug!(
                from = self.state.len(),
                to = raw.len(),
                "reallocating envelope state"
            );
            self.state = vec![EnvelopeState::default(); raw.len()];
            self.output = vec![0.0; raw.len()];
        }

        let config = self.config;
        for ((band, &target), out) in self.state.iter_mut().zip(raw).zip(self.output.iter_mut()) {
            if target > band.value {
                band.value = target;
                band.decay_rate = config.base_decay_rate;
            } else {
                band.value -= band.decay_rate * dt;
                band.decay_rate *= 1.0 + config.decay_scale * dt;

                if config.floor_at_zero && band.value < 0.0 {
                    band.value = 0.0;
                }
            }
            *out = band.value;
        }

        &self.output
    }

    /// Zero every envelope, keeping the band count
    pub fn reset(&mut self) {
        self.state.fill(EnvelopeState::default());
        self.output.fill(0.0);
    }

    /// Retune decay; envelope values and rates are kept
    pub fn set_config(&mut self, config: SmootherConfig) {
        self.config = config;
    }

    /// Get current tuning
    pub fn config(&self) -> &SmootherConfig {
        &self.config
    }

    /// Get per-band envelope state
    pub fn state(&self) -> &[EnvelopeState] {
        &self.state
    }

    /// Envelope values after the last `advance`
    pub fn values(&self) -> &[f32] {
        &self.output
    }

    /// Get number of tracked bands
    pub fn band_count(&self) -> usize {
        self.state.len()
    }
}

impl Default for EnvelopeSmoother {
    fn default() -> Self {
        Self::new(SmootherConfig::default())
    }
}
