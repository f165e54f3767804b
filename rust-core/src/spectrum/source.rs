//! Spectrum sources
//!
//! A source overwrites the pipeline's snapshot buffer once per tick. Hosts
//! that capture spectra on another thread hand whole snapshots over through
//! a lock-free ring buffer and the update thread reads the newest one.

use ringbuf::{HeapConsumer, HeapProducer, HeapRb};
use tracing::trace;

use crate::bands::validate_spectrum_length;
use crate::error::ConfigResult;

/// Supplies the current spectrum magnitudes
pub trait SpectrumSource {
    /// Overwrite `buffer` with the current magnitudes
    fn get_spectrum(&mut self, buffer: &mut [f32]);
}

impl<S: SpectrumSource + ?Sized> SpectrumSource for Box<S> {
    fn get_spectrum(&mut self, buffer: &mut [f32]) {
        (**self).get_spectrum(buffer)
    }
}

/// Source holding the last snapshot pushed by the host
#[derive(Debug, Clone, Default)]
pub struct ManualSource {
    latest: Vec<f32>,
}

impl ManualSource {
    /// Create a source holding an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the held snapshot
    pub fn push(&mut self, spectrum: &[f32]) {
        self.latest.clear();
        self.latest.extend_from_slice(spectrum);
    }
}

impl SpectrumSource for ManualSource {
    /// Copies the held snapshot, zero-filling bins it does not cover
    fn get_spectrum(&mut self, buffer: &mut [f32]) {
        let n = self.latest.len().min(buffer.len());
        buffer[..n].copy_from_slice(&self.latest[..n]);
        buffer[n..].fill(0.0);
    }
}

/// Ring buffer carrying whole spectrum snapshots between threads
pub struct SpectrumRingBuffer {
    producer: HeapProducer<f32>,
    consumer: HeapConsumer<f32>,
    spectrum_length: usize,
}

impl SpectrumRingBuffer {
    /// Create a buffer holding up to `depth` snapshots
    ///
    /// # Arguments
    /// * `spectrum_length` - Magnitudes per snapshot, same rule as the band layout
    /// * `depth` - Snapshots held before the producer starts dropping (at least 1)
    ///
    /// # Returns
    /// The buffer, or `InvalidSpectrumLength` for a length the band layout
    /// would reject
    pub fn new(spectrum_length: usize, depth: usize) -> ConfigResult<Self> {
        validate_spectrum_length(spectrum_length)?;

        let rb = HeapRb::<f32>::new(spectrum_length * depth.max(1));
        let (producer, consumer) = rb.split();

        Ok(Self {
            producer,
            consumer,
            spectrum_length,
        })
    }

    /// Split into producer (capture thread) and consumer (update thread) ends
    pub fn split(self) -> (SpectrumProducer, SpectrumConsumer) {
        (
            SpectrumProducer {
                producer: self.producer,
                spectrum_length: self.spectrum_length,
                dropped: 0,
            },
            SpectrumConsumer {
                consumer: self.consumer,
                spectrum_length: self.spectrum_length,
            },
        )
    }

    /// Get magnitudes per snapshot
    pub fn spectrum_length(&self) -> usize {
        self.spectrum_length
    }
}

/// Capture end of a [`SpectrumRingBuffer`]
pub struct SpectrumProducer {
    producer: HeapProducer<f32>,
    spectrum_length: usize,
    dropped: u64,
}

impl SpectrumProducer {
    /// Push one snapshot
    ///
    /// # Arguments
    /// * `spectrum` - Magnitudes, exactly `spectrum_length` of them
    ///
    /// # Returns
    /// `false` when the snapshot was dropped because its length is wrong or
    /// the buffer cannot take it whole
    pub fn push_snapshot(&mut self, spectrum: &[f32]) -> bool {
        if spectrum.len() != self.spectrum_length || self.producer.free_len() < spectrum.len() {
            self.dropped += 1;
            trace!(
                len = spectrum.len(),
                free = self.producer.free_len(),
                "dropping spectrum snapshot"
            );
            return false;
        }

        self.producer.push_slice(spectrum);
        true
    }

    /// Snapshots rejected so far
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Get magnitudes per snapshot
    pub fn spectrum_length(&self) -> usize {
        self.spectrum_length
    }
}

/// Update end of a [`SpectrumRingBuffer`]
pub struct SpectrumConsumer {
    consumer: HeapConsumer<f32>,
    spectrum_length: usize,
}

impl SpectrumConsumer {
    /// Complete snapshots waiting to be read
    pub fn pending(&self) -> usize {
        self.consumer.len() / self.spectrum_length
    }

    /// Get magnitudes per snapshot
    pub fn spectrum_length(&self) -> usize {
        self.spectrum_length
    }
}

impl SpectrumSource for SpectrumConsumer {
    /// Drains to the newest complete snapshot. The buffer keeps its previous
    /// contents when nothing new arrived or its length does not match.
    fn get_spectrum(&mut self, buffer: &mut [f32]) {
        if buffer.len() != self.spectrum_length {
            trace!(
                expected = self.spectrum_length,
                got = buffer.len(),
                "snapshot length mismatch"
            );
            return;
        }

        while self.consumer.len() >= self.spectrum_length {
            self.consumer.pop_slice(buffer);
        }
    }
}
