//! PyO3 bindings for Python integration

use pyo3::exceptions::{PyIndexError, PyNotImplementedError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::error::AcousticError;

mod windowing_bindings;
mod spectrum_bindings;
mod acoustic_bindings;

impl From<AcousticError> for PyErr {
    fn from(err: AcousticError) -> PyErr {
        let msg = err.to_string();
        match err {
            AcousticError::Configuration(_)
            | AcousticError::ShapeMismatch { .. }
            | AcousticError::LengthMismatch { .. }
            | AcousticError::Array(_) => PyValueError::new_err(msg),
            AcousticError::SensorOutOfRange { .. } => PyIndexError::new_err(msg),
            AcousticError::Unsupported(_) => PyNotImplementedError::new_err(msg),
            _ => PyRuntimeError::new_err(msg),
        }
    }
}

/// Python module definition
#[pymodule]
fn acoustic_vis(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<spectrum_bindings::PySpectralAnalyzer>()?;
    m.add_class::<acoustic_bindings::PyAcousticHandler>()?;

    // Add WindowingFunction enum
    m.add_class::<windowing_bindings::PyWindowingFunction>()?;

    Ok(())
}
