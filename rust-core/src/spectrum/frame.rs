//! Per-band aggregation of a spectrum snapshot
//!
//! Collapses the magnitudes inside each band into one value.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bands::BandBorders;

/// How the magnitudes of one band are summarized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Aggregation {
    /// Arithmetic mean of the band's magnitudes
    #[default]
    Average,

    /// Largest magnitude in the band
    Maximum,
}

impl Aggregation {
    /// Summarize one band. Empty input yields `0.0`.
    pub fn summarize(&self, bins: &[f32]) -> f32 {
        if bins.is_empty() {
            return 0.0;
        }

        match self {
            Aggregation::Average => bins.iter().sum::<f32>() / bins.len() as f32,
            Aggregation::Maximum => bins.iter().copied().fold(0.0, f32::max),
        }
    }
}

/// Aggregate `spectrum` into one value per band of `borders`
///
/// The result always has `borders.band_count()` entries. A band whose range
/// is empty or falls outside the snapshot contributes `0.0`.
pub fn aggregate(spectrum: &[f32], borders: &BandBorders, mode: Aggregation) -> Vec<f32> {
    borders
        .ranges()
        .enumerate()
        .map(|(band, range)| match spectrum.get(range.clone()) {
            Some(bins) if !bins.is_empty() => mode.summarize(bins),
            _ => {
                debug!(band, ?range, len = spectrum.len(), "degenerate band range");
                0.0
            }
        })
        .collect()
}

/// One spectrum snapshot and the band layout it is read with
///
/// The snapshot buffer is allocated once per layout and overwritten in place
/// by the spectrum source every tick.
#[derive(Debug, Clone)]
pub struct SpectrumFrame {
    spectrum: Vec<f32>,
    borders: BandBorders,
}

impl SpectrumFrame {
    /// Create a zeroed snapshot sized for `borders`
    pub fn new(borders: BandBorders) -> Self {
        Self {
            spectrum: vec![0.0; borders.spectrum_length()],
            borders,
        }
    }

    /// Swap in a new layout, resizing the snapshot only if its length changed
    pub fn set_borders(&mut self, borders: BandBorders) {
        if borders.spectrum_length() != self.spectrum.len() {
            self.spectrum = vec![0.0; borders.spectrum_length()];
        }
        self.borders = borders;
    }

    /// Get the active band borders
    pub fn borders(&self) -> &BandBorders {
        &self.borders
    }

    /// Get number of bands
    pub fn band_count(&self) -> usize {
        self.borders.band_count()
    }

    /// Get the current snapshot
    pub fn spectrum(&self) -> &[f32] {
        &self.spectrum
    }

    /// Snapshot buffer for the spectrum source to fill
    pub fn spectrum_mut(&mut self) -> &mut [f32] {
        &mut self.spectrum
    }

    /// Mean magnitude of every band
    pub fn band_averages(&self) -> Vec<f32> {
        self.aggregate(Aggregation::Average)
    }

    /// Largest magnitude of every band
    pub fn band_maximums(&self) -> Vec<f32> {
        self.aggregate(Aggregation::Maximum)
    }

    /// Summarize every band of the current snapshot with `mode`
    pub fn aggregate(&self, mode: Aggregation) -> Vec<f32> {
        aggregate(&self.spectrum, &self.borders, mode)
    }
}
