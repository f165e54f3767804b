//! PyO3 bindings for Python integration

use pyo3::prelude::*;

mod pipeline_bindings;

/// Python module definition
#[pymodule]
fn spectral_bands(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<pipeline_bindings::PyBandPipeline>()?;

    Ok(())
}
