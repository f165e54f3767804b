//! Band border computation
//!
//! Maps a [`BandConfiguration`] to interior sample-index borders. The
//! computation is a pure function of the configuration.

use std::ops::Range;

use tracing::warn;

use super::config::{BandConfiguration, BorderSource, SubdivisionPolicy};
use crate::error::{ConfigResult, ConfigurationError};

/// Interior sample-index borders of a band layout
///
/// Band `0` spans `[0, borders[0])`, band `i` spans `[borders[i-1], borders[i])`
/// and the last band spans `[borders[last], spectrum_length)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandBorders {
    borders: Vec<usize>,
    spectrum_length: usize,
}

impl BandBorders {
    /// Build borders, rejecting any layout with an empty band
    pub fn new(borders: Vec<usize>, spectrum_length: usize) -> ConfigResult<Self> {
        let mut previous = 0;
        for (index, &sample) in borders.iter().enumerate() {
            if sample >= spectrum_length {
                return Err(ConfigurationError::BorderOutOfRange {
                    index,
                    sample,
                    spectrum_length,
                });
            }
            if sample <= previous {
                return Err(ConfigurationError::EmptyBand { band: index });
            }
            previous = sample;
        }

        Ok(Self {
            borders,
            spectrum_length,
        })
    }

    /// Skip validation; lets tests build degenerate layouts
    #[cfg(test)]
    pub(crate) fn unchecked(borders: Vec<usize>, spectrum_length: usize) -> Self {
        Self {
            borders,
            spectrum_length,
        }
    }

    /// Get the interior borders as sample indices, ascending
    pub fn as_slice(&self) -> &[usize] {
        &self.borders
    }

    /// Get number of interior borders
    pub fn len(&self) -> usize {
        self.borders.len()
    }

    /// True when the whole spectrum is a single band
    pub fn is_empty(&self) -> bool {
        self.borders.is_empty()
    }

    /// Get number of bands, always `len() + 1`
    pub fn band_count(&self) -> usize {
        self.borders.len() + 1
    }

    /// Get the spectrum length the borders were computed for
    pub fn spectrum_length(&self) -> usize {
        self.spectrum_length
    }

    /// Half-open sample range of `band`
    pub fn band_range(&self, band: usize) -> Range<usize> {
        let start = if band == 0 { 0 } else { self.borders[band - 1] };
        let end = if band == self.borders.len() {
            self.spectrum_length
        } else {
            self.borders[band]
        };
        start..end
    }

    /// Sample ranges of every band in order
    pub fn ranges(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        (0..self.band_count()).map(move |band| self.band_range(band))
    }
}

/// A validated configuration together with the borders derived from it
#[derive(Debug, Clone, PartialEq)]
pub struct BandPlan {
    config: BandConfiguration,
    borders: BandBorders,
}

impl BandPlan {
    /// Validate `config` and compute its borders
    pub fn new(config: BandConfiguration) -> ConfigResult<Self> {
        let borders = Self::compute_borders(&config)?;
        Ok(Self { config, borders })
    }

    /// Get the configuration the borders were derived from
    pub fn config(&self) -> &BandConfiguration {
        &self.config
    }

    /// Get the derived borders
    pub fn borders(&self) -> &BandBorders {
        &self.borders
    }

    /// Get number of bands after subdivision
    pub fn band_count(&self) -> usize {
        self.borders.band_count()
    }

    /// Derive interior sample-index borders from a configuration
    ///
    /// 1. Base cutoffs in Hz come from the border source.
    /// 2. Each cutoff is scaled by `spectrum_length / sample_rate_hz` and
    ///    truncated to a sample index.
    /// 3. Every base band is split into equal-width sub-ranges according to
    ///    the subdivision policy. The last sub-range keeps the remainder.
    ///
    /// # Arguments
    /// * `config` - Band layout to derive borders for
    ///
    /// # Returns
    /// Validated borders, or the first [`ConfigurationError`] found. Nothing
    /// is allocated for a layout that cannot fit in the spectrum.
    pub fn compute_borders(config: &BandConfiguration) -> ConfigResult<BandBorders> {
        config.validate()?;

        let spectrum_length = config.spectrum_length;
        let base = base_sample_borders(config)?;
        let counts = subdivision_counts(&config.subdivision, base.len() + 1);

        let spans: Vec<(usize, usize)> = (0..counts.len())
            .map(|band| {
                let start = if band == 0 { 0 } else { base[band - 1] };
                let end = if band == base.len() {
                    spectrum_length
                } else {
                    base[band]
                };
                (start, end)
            })
            .collect();

        // Every sub-band needs at least one sample; past this check the
        // reservation below is at most `spectrum_length`
        for (band, (&subdivisions, &(start, end))) in counts.iter().zip(&spans).enumerate() {
            let span = end - start;
            if subdivisions as usize > span {
                return Err(ConfigurationError::ZeroWidthSubBand {
                    band,
                    span,
                    subdivisions,
                });
            }
        }

        let total: usize = counts.iter().map(|&n| n as usize).sum();
        let mut borders = Vec::with_capacity(total.saturating_sub(1));

        for (band, (&subdivisions, &(start, end))) in counts.iter().zip(&spans).enumerate() {
            let width = (end - start) / subdivisions as usize;
            for part in 1..subdivisions as usize {
                borders.push(start + width * part);
            }
            if band < base.len() {
                borders.push(end);
            }
        }

        BandBorders::new(borders, spectrum_length)
    }
}

/// Base band cutoffs in Hz, ascending
///
/// Expects a configuration that passed [`BandConfiguration::validate`]; an
/// automatic layout yields `band_count - 1` cutoffs.
pub fn base_frequencies(config: &BandConfiguration) -> Vec<f64> {
    match &config.borders {
        BorderSource::Explicit(frequencies) => frequencies.clone(),
        BorderSource::Automatic {
            band_count,
            division,
        } => {
            let mut cutoffs = vec![0.0; (*band_count as usize).saturating_sub(1)];
            let mut frequency = config.sample_rate_hz / 2.0;

            // Fill from the top band down; each cutoff divides the one above it
            for cutoff in cutoffs.iter_mut().rev() {
                frequency /= *division as f64;
                *cutoff = frequency;
            }
            cutoffs
        }
    }
}

/// Base band cutoffs truncated to sample indices, checked for empty bands
fn base_sample_borders(config: &BandConfiguration) -> ConfigResult<Vec<usize>> {
    let spectrum_length = config.spectrum_length;
    let mut samples: Vec<usize> = Vec::new();

    for (index, hz) in base_frequencies(config).into_iter().enumerate() {
        let sample = (hz * spectrum_length as f64 / config.sample_rate_hz) as usize;

        if sample >= spectrum_length {
            return Err(ConfigurationError::BorderOutOfRange {
                index,
                sample,
                spectrum_length,
            });
        }
        let previous = samples.last().copied().unwrap_or(0);
        if sample <= previous {
            return Err(ConfigurationError::EmptyBand { band: index });
        }
        samples.push(sample);
    }

    Ok(samples)
}

/// Number of sub-bands each of `band_count` base bands is split into
///
/// Every count is at least 1.
pub fn subdivision_counts(policy: &SubdivisionPolicy, band_count: usize) -> Vec<u32> {
    match policy {
        SubdivisionPolicy::None => vec![1; band_count],

        SubdivisionPolicy::Manual(per_band) => {
            let mut counts = vec![1; band_count];
            for (&band, &count) in per_band {
                match counts.get_mut(band) {
                    Some(slot) => *slot = count.max(1),
                    None => warn!(band, band_count, "ignoring subdivision for missing band"),
                }
            }
            counts
        }

        SubdivisionPolicy::CenteredAuto {
            center,
            multiplier,
            width,
            falloff,
        } => (0..band_count)
            .map(|band| {
                let distance = band.abs_diff(*center);
                if distance > *width {
                    return 1;
                }
                let reduction = (distance as u64).saturating_mul(*falloff as u64);
                (*multiplier as u64).saturating_sub(reduction).max(1) as u32
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    /// Sample rate equal to spectrum length maps Hz straight to sample indices
    fn identity_config(frequencies: Vec<f64>, subdivision: SubdivisionPolicy) -> BandConfiguration {
        BandConfiguration {
            spectrum_length: 512,
            sample_rate_hz: 512.0,
            borders: BorderSource::Explicit(frequencies),
            subdivision,
        }
    }

    #[test]
    fn test_automatic_borders_halving() {
        let config = BandConfiguration {
            spectrum_length: 512,
            sample_rate_hz: 44100.0,
            borders: BorderSource::Automatic {
                band_count: 4,
                division: 2,
            },
            subdivision: SubdivisionPolicy::None,
        };

        // Nyquist 22050 Hz halved three times: 11025, 5512.5, 2756.25 Hz
        assert_eq!(base_frequencies(&config), vec![2756.25, 5512.5, 11025.0]);

        // Each scaled by 512 / 44100 and truncated
        let borders = BandPlan::compute_borders(&config).unwrap();
        assert_eq!(borders.as_slice(), &[32, 64, 128]);
        assert_eq!(borders.band_count(), 4);
        assert_eq!(borders.band_range(0), 0..32);
        assert_eq!(borders.band_range(3), 128..512);
    }

    #[test]
    fn test_default_layout() {
        let plan = BandPlan::new(BandConfiguration::default()).unwrap();
        assert_eq!(plan.borders().as_slice(), &[4, 8, 16, 32, 64, 128]);
        assert_eq!(plan.band_count(), 7);
    }

    #[test]
    fn test_single_automatic_band_has_no_borders() {
        let config = BandConfiguration {
            borders: BorderSource::Automatic {
                band_count: 1,
                division: 3,
            },
            ..Default::default()
        };
        let borders = BandPlan::compute_borders(&config).unwrap();
        assert!(borders.is_empty());
        assert_eq!(borders.ranges().collect::<Vec<_>>(), vec![0..512]);
    }

    #[test]
    fn test_centered_counts() {
        let policy = SubdivisionPolicy::CenteredAuto {
            center: 2,
            multiplier: 3,
            width: 2,
            falloff: 1,
        };
        assert_eq!(subdivision_counts(&policy, 5), vec![1, 2, 3, 2, 1]);
    }

    #[test]
    fn test_centered_counts_respect_width() {
        let policy = SubdivisionPolicy::CenteredAuto {
            center: 3,
            multiplier: 6,
            width: 1,
            falloff: 2,
        };
        assert_eq!(subdivision_counts(&policy, 7), vec![1, 1, 4, 6, 4, 1, 1]);
    }

    #[test]
    fn test_centered_subdivision_borders() {
        let config = identity_config(
            vec![100.0, 200.0, 300.0, 400.0],
            SubdivisionPolicy::CenteredAuto {
                center: 2,
                multiplier: 3,
                width: 2,
                falloff: 1,
            },
        );

        let borders = BandPlan::compute_borders(&config).unwrap();
        assert_eq!(
            borders.as_slice(),
            &[100, 150, 200, 233, 266, 300, 350, 400]
        );
        assert_eq!(borders.band_count(), 9);
    }

    #[test]
    fn test_manual_subdivision_borders() {
        let mut per_band = BTreeMap::new();
        per_band.insert(0, 4);
        per_band.insert(2, 2);
        per_band.insert(9, 5); // no such band
        let config = identity_config(vec![100.0, 200.0], SubdivisionPolicy::Manual(per_band));

        let borders = BandPlan::compute_borders(&config).unwrap();
        assert_eq!(borders.as_slice(), &[25, 50, 75, 100, 200, 356]);
        // 2 base borders + (4 - 1) + (2 - 1)
        assert_eq!(borders.len(), 6);
    }

    #[test]
    fn test_manual_zero_is_clamped_to_one() {
        let mut per_band = BTreeMap::new();
        per_band.insert(1, 0);
        let config = identity_config(vec![100.0], SubdivisionPolicy::Manual(per_band));

        let borders = BandPlan::compute_borders(&config).unwrap();
        assert_eq!(borders.as_slice(), &[100]);
    }

    #[test]
    fn test_zero_width_sub_band_is_rejected() {
        let mut per_band = BTreeMap::new();
        per_band.insert(0, 3);
        let config = identity_config(vec![2.0], SubdivisionPolicy::Manual(per_band));

        assert_eq!(
            BandPlan::compute_borders(&config),
            Err(ConfigurationError::ZeroWidthSubBand {
                band: 0,
                span: 2,
                subdivisions: 3
            })
        );
    }

    #[test]
    fn test_huge_centered_multiplier_is_rejected() {
        let config = BandConfiguration {
            subdivision: SubdivisionPolicy::CenteredAuto {
                center: 3,
                multiplier: u32::MAX,
                width: 100,
                falloff: 0,
            },
            ..Default::default()
        };
        assert!(matches!(
            BandPlan::compute_borders(&config),
            Err(ConfigurationError::ZeroWidthSubBand {
                band: 0,
                span: 4,
                subdivisions: u32::MAX
            })
        ));
    }

    #[test]
    fn test_huge_manual_count_is_rejected() {
        let mut per_band = BTreeMap::new();
        per_band.insert(1, u32::MAX);
        let config = identity_config(vec![100.0], SubdivisionPolicy::Manual(per_band));

        assert_eq!(
            BandPlan::compute_borders(&config),
            Err(ConfigurationError::ZeroWidthSubBand {
                band: 1,
                span: 412,
                subdivisions: u32::MAX
            })
        );
    }

    #[test]
    fn test_huge_automatic_band_count_is_rejected() {
        let config = BandConfiguration {
            borders: BorderSource::Automatic {
                band_count: u32::MAX,
                division: 2,
            },
            ..Default::default()
        };
        assert_eq!(
            BandPlan::compute_borders(&config),
            Err(ConfigurationError::InvalidBandCount(u32::MAX))
        );
    }

    #[test]
    fn test_collapsed_band_is_rejected() {
        // 8 bands halved from Nyquist leave the lowest cutoff below one sample
        let config = BandConfiguration {
            spectrum_length: 128,
            sample_rate_hz: 44100.0,
            borders: BorderSource::Automatic {
                band_count: 8,
                division: 2,
            },
            subdivision: SubdivisionPolicy::None,
        };
        assert_eq!(
            BandPlan::compute_borders(&config),
            Err(ConfigurationError::EmptyBand { band: 0 })
        );

        let config = identity_config(vec![10.0, 10.5], SubdivisionPolicy::None);
        assert_eq!(
            BandPlan::compute_borders(&config),
            Err(ConfigurationError::EmptyBand { band: 1 })
        );
    }

    #[test]
    fn test_border_out_of_range_is_rejected() {
        let config = BandConfiguration {
            borders: BorderSource::Explicit(vec![1000.0, 50000.0]),
            ..Default::default()
        };
        assert!(matches!(
            BandPlan::compute_borders(&config),
            Err(ConfigurationError::BorderOutOfRange { index: 1, .. })
        ));
    }

    #[test]
    fn test_invalid_spectrum_length_is_rejected() {
        let config = BandConfiguration {
            spectrum_length: 500,
            ..Default::default()
        };
        assert_eq!(
            BandPlan::new(config).unwrap_err(),
            ConfigurationError::InvalidSpectrumLength(500)
        );
    }

    #[test]
    fn test_border_validation() {
        assert!(BandBorders::new(vec![10, 20], 64).is_ok());
        assert!(BandBorders::new(vec![], 64).is_ok());
        assert_eq!(
            BandBorders::new(vec![0, 20], 64),
            Err(ConfigurationError::EmptyBand { band: 0 })
        );
        assert_eq!(
            BandBorders::new(vec![20, 20], 64),
            Err(ConfigurationError::EmptyBand { band: 1 })
        );
        assert!(matches!(
            BandBorders::new(vec![10, 64], 64),
            Err(ConfigurationError::BorderOutOfRange { sample: 64, .. })
        ));
    }

    fn arbitrary_config() -> impl Strategy<Value = BandConfiguration> {
        let subdivision = prop_oneof![
            Just(SubdivisionPolicy::None),
            (0usize..10, prop_oneof![1u32..6, any::<u32>()], 0usize..5, 0u32..3).prop_map(
                |(center, multiplier, width, falloff)| SubdivisionPolicy::CenteredAuto {
                    center,
                    multiplier,
                    width,
                    falloff,
                }
            ),
            proptest::collection::btree_map(0usize..10, prop_oneof![0u32..5, any::<u32>()], 0..4)
                .prop_map(SubdivisionPolicy::Manual),
        ];

        let band_count = prop_oneof![1u32..10, any::<u32>()];

        (7u32..13, 8000.0f64..96000.0, band_count, 2u32..5, subdivision).prop_map(
            |(exponent, sample_rate_hz, band_count, division, subdivision)| BandConfiguration {
                spectrum_length: 1 << exponent,
                sample_rate_hz,
                borders: BorderSource::Automatic {
                    band_count,
                    division,
                },
                subdivision,
            },
        )
    }

    proptest! {
        #[test]
        fn prop_borders_are_deterministic_and_ordered(config in arbitrary_config()) {
            let first = BandPlan::compute_borders(&config);
            let second = BandPlan::compute_borders(&config);
            prop_assert_eq!(&first, &second);

            if let BorderSource::Automatic { band_count, .. } = &config.borders {
                if *band_count as usize > config.spectrum_length {
                    prop_assert!(first.is_err());
                }
            }

            if let Ok(borders) = first {
                let slice = borders.as_slice();
                prop_assert!(slice.windows(2).all(|pair| pair[0] < pair[1]));
                prop_assert!(slice.iter().all(|&b| b > 0 && b < config.spectrum_length));
                prop_assert_eq!(borders.band_count(), slice.len() + 1);

                let expected: u32 = subdivision_counts(&config.subdivision, config.base_band_count())
                    .iter()
                    .sum();
                prop_assert_eq!(borders.band_count(), expected as usize);
            }
        }
    }
}
