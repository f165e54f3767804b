//! Python bindings for the band pipeline

use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::bands::{BandConfiguration, BorderSource, SubdivisionPolicy};
use crate::envelope::SmootherConfig;
use crate::error::ConfigurationError;
use crate::pipeline::{BandPipeline, ClipInfo, PipelineConfig, PlaybackStatus};
use crate::spectrum::{Aggregation, ManualSource};

fn to_py_err(err: ConfigurationError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Band pipeline exposed to Python
///
/// The caller passes each spectrum snapshot to `tick`.
#[pyclass(name = "BandPipeline", unsendable)]
pub struct PyBandPipeline {
    pipeline: BandPipeline<ManualSource>,
}

#[pymethods]
impl PyBandPipeline {
    /// Create a new band pipeline
    ///
    /// Args:
    ///     spectrum_length: Magnitudes per snapshot (power of two, 64 < n < 8192)
    ///     sample_rate: Clip sample rate in Hz
    ///     band_count: Number of automatic bands (ignored if `borders_hz` is given)
    ///     division: Divisor between successive automatic cutoffs
    ///     borders_hz: Explicit ascending cutoff frequencies in Hz
    ///     use_maximums: Summarize bands by maximum instead of average
    ///     use_smoothing: Emit envelope values instead of raw values
    ///     decay_base: Decay rate right after an attack
    ///     decay_scale: Growth of the decay rate per second
    #[new]
    #[pyo3(signature = (
        spectrum_length=512,
        sample_rate=44100.0,
        band_count=7,
        division=2,
        borders_hz=None,
        use_maximums=false,
        use_smoothing=true,
        decay_base=0.005,
        decay_scale=1.2
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        spectrum_length: usize,
        sample_rate: f64,
        band_count: u32,
        division: u32,
        borders_hz: Option<Vec<f64>>,
        use_maximums: bool,
        use_smoothing: bool,
        decay_base: f32,
        decay_scale: f32,
    ) -> PyResult<Self> {
        let borders = match borders_hz {
            Some(frequencies) => BorderSource::Explicit(frequencies),
            None => BorderSource::Automatic {
                band_count,
                division,
            },
        };

        let config = PipelineConfig {
            bands: BandConfiguration {
                spectrum_length,
                sample_rate_hz: sample_rate,
                borders,
                subdivision: SubdivisionPolicy::None,
            },
            aggregation: if use_maximums {
                Aggregation::Maximum
            } else {
                Aggregation::Average
            },
            smoothing: SmootherConfig {
                base_decay_rate: decay_base,
                decay_scale,
                floor_at_zero: false,
            },
            smoothing_enabled: use_smoothing,
        };

        let pipeline = BandPipeline::new(config, ManualSource::new()).map_err(to_py_err)?;
        Ok(Self { pipeline })
    }

    /// Process one spectrum snapshot
    ///
    /// Args:
    ///     spectrum: Magnitudes as numpy array
    ///     dt: Seconds since the previous tick
    ///     time: Playback position in seconds, if any
    ///     playing: Whether the clip is playing
    ///
    /// Returns:
    ///     Band values as numpy array
    ///
    /// Raises:
    ///     ValueError: If the spectrum length differs from the band layout
    #[pyo3(signature = (spectrum, dt, time=None, playing=true))]
    fn tick<'py>(
        &mut self,
        py: Python<'py>,
        spectrum: PyReadonlyArray1<f32>,
        dt: f32,
        time: Option<f64>,
        playing: bool,
    ) -> PyResult<&'py PyArray1<f32>> {
        let spectrum = spectrum.as_slice()?;
        self.pipeline
            .check_spectrum_length(spectrum.len())
            .map_err(to_py_err)?;
        self.pipeline.source_mut().push(spectrum);

        let playback = PlaybackStatus {
            playing,
            time_seconds: time,
        };
        let frame = self.pipeline.tick(dt, playback);
        Ok(PyArray1::from_slice(py, &frame.values))
    }

    /// Switch to a clip with a different sample rate
    fn load_clip(&mut self, name: String, duration: f64, sample_rate: f64) -> PyResult<()> {
        self.pipeline
            .load_clip(ClipInfo::new(name, duration, sample_rate))
            .map_err(to_py_err)
    }

    /// Use explicit cutoff frequencies in Hz
    fn set_borders_hz(&mut self, borders_hz: Vec<f64>) -> PyResult<()> {
        let mut config = self.pipeline.band_config().clone();
        config.borders = BorderSource::Explicit(borders_hz);
        self.pipeline.reconfigure(config).map_err(to_py_err)
    }

    /// Split bands around `center`, tapering by `falloff` per band of distance
    fn set_centered_subdivision(
        &mut self,
        center: usize,
        multiplier: u32,
        width: usize,
        falloff: u32,
    ) -> PyResult<()> {
        let mut config = self.pipeline.band_config().clone();
        config.subdivision = SubdivisionPolicy::CenteredAuto {
            center,
            multiplier,
            width,
            falloff,
        };
        self.pipeline.reconfigure(config).map_err(to_py_err)
    }

    /// Interior sample-index borders
    fn band_borders(&self) -> Vec<usize> {
        self.pipeline.borders().as_slice().to_vec()
    }

    /// Number of bands
    fn band_count(&self) -> usize {
        self.pipeline.band_count()
    }

    /// Zero all envelopes
    fn reset(&mut self) {
        self.pipeline.reset_envelopes();
    }
}
