//! Events delivered to pipeline subscribers

use crossbeam_channel::Sender;
use tracing::trace;

/// Metadata of a newly loaded clip
#[derive(Debug, Clone, PartialEq)]
pub struct ClipInfo {
    pub name: String,
    pub duration_seconds: f64,
    pub sample_rate_hz: f64,
}

impl ClipInfo {
    /// Create clip metadata
    pub fn new(name: impl Into<String>, duration_seconds: f64, sample_rate_hz: f64) -> Self {
        Self {
            name: name.into(),
            duration_seconds,
            sample_rate_hz,
        }
    }
}

/// Band values produced by one tick
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BandFrame {
    /// One value per band, lowest band first
    pub values: Vec<f32>,

    /// Playback position when known
    pub time_seconds: Option<f64>,
}

/// Everything a channel subscriber receives
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    ClipLoaded(ClipInfo),
    Bands(BandFrame),
}

/// Receiver of pipeline output (visualizers, UI)
pub trait BandSubscriber {
    /// Called once per tick while playing
    fn on_bands(&mut self, frame: &BandFrame);

    /// Called once when a clip is accepted
    fn on_clip_loaded(&mut self, _clip: &ClipInfo) {}
}

/// Adapts a closure into a [`BandSubscriber`]
pub struct CallbackSubscriber<F>(pub F);

impl<F: FnMut(&BandFrame)> BandSubscriber for CallbackSubscriber<F> {
    fn on_bands(&mut self, frame: &BandFrame) {
        (self.0)(frame)
    }
}

/// Forwards events to another thread; never blocks the tick
impl BandSubscriber for Sender<PipelineEvent> {
    fn on_bands(&mut self, frame: &BandFrame) {
        if let Err(err) = self.try_send(PipelineEvent::Bands(frame.clone())) {
            trace!(error = %err, "band frame not delivered");
        }
    }

    fn on_clip_loaded(&mut self, clip: &ClipInfo) {
        if let Err(err) = self.try_send(PipelineEvent::ClipLoaded(clip.clone())) {
            trace!(error = %err, "clip event not delivered");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn test_callback_subscriber() {
        let mut seen = Vec::new();
        {
            let mut subscriber = CallbackSubscriber(|frame: &BandFrame| seen.push(frame.values.len()));
            subscriber.on_bands(&BandFrame {
                values: vec![0.0; 3],
                time_seconds: None,
            });
            subscriber.on_clip_loaded(&ClipInfo::new("ignored", 1.0, 44100.0));
        }
        assert_eq!(seen, vec![3]);
    }

    #[test]
    fn test_channel_subscriber_does_not_block_when_full() {
        let (mut tx, rx) = bounded(1);
        let frame = BandFrame {
            values: vec![1.0],
            time_seconds: Some(0.5),
        };

        tx.on_bands(&frame);
        tx.on_bands(&frame); // dropped
        assert_eq!(rx.try_recv(), Ok(PipelineEvent::Bands(frame)));
        assert!(rx.try_recv().is_err());

        drop(rx);
        tx.on_clip_loaded(&ClipInfo::new("gone", 1.0, 48000.0));
    }
}
