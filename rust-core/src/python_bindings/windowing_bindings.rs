//! Python bindings for windowing functions

use numpy::PyArray1;
use pyo3::prelude::*;

use crate::spectrum::WindowingFunction;

/// Windowing function enum exposed to Python
#[pyclass(name = "WindowingFunction")]
#[derive(Clone, Copy)]
pub enum PyWindowingFunction {
    Rectangular,
    Hamming,
    Hanning,
    Bartlett,
    Blackman,
}

impl From<PyWindowingFunction> for WindowingFunction {
    fn from(py_win: PyWindowingFunction) -> Self {
        match py_win {
            PyWindowingFunction::Rectangular => WindowingFunction::Rectangular,
            PyWindowingFunction::Hamming => WindowingFunction::Hamming,
            PyWindowingFunction::Hanning => WindowingFunction::Hanning,
            PyWindowingFunction::Bartlett => WindowingFunction::Bartlett,
            PyWindowingFunction::Blackman => WindowingFunction::Blackman,
        }
    }
}

impl From<WindowingFunction> for PyWindowingFunction {
    fn from(win: WindowingFunction) -> Self {
        match win {
            WindowingFunction::Rectangular => PyWindowingFunction::Rectangular,
            WindowingFunction::Hamming => PyWindowingFunction::Hamming,
            WindowingFunction::Hanning => PyWindowingFunction::Hanning,
            WindowingFunction::Bartlett => PyWindowingFunction::Bartlett,
            WindowingFunction::Blackman => PyWindowingFunction::Blackman,
        }
    }
}

#[pymethods]
impl PyWindowingFunction {
    /// Generate window coefficients
    ///
    /// Args:
    ///     length: Number of coefficients
    ///
    /// Returns:
    ///     Coefficients as numpy array
    fn generate<'py>(&self, py: Python<'py>, length: usize) -> &'py PyArray1<f64> {
        let kind: WindowingFunction = (*self).into();
        PyArray1::from_vec(py, kind.generate(length))
    }
}
