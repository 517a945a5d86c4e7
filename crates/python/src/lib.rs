#![allow(clippy::useless_conversion)]

use lidsor_core::LidsorError;
use pyo3::prelude::*;

mod cloud;
mod filters;
mod segmentation;

pyo3::create_exception!(
    lidsor_filter,
    InsufficientPointsError,
    pyo3::exceptions::PyValueError,
    "Fewer than k + 1 points were available to score."
);

/// Map crate errors onto Python exceptions. Both are `ValueError`s so callers
/// can catch either with one clause.
pub(crate) fn to_py_err(err: LidsorError) -> PyErr {
    match err {
        LidsorError::InsufficientPoints { .. } => InsufficientPointsError::new_err(err.to_string()),
        LidsorError::InvalidInput(_) => pyo3::exceptions::PyValueError::new_err(err.to_string()),
    }
}

#[pymodule]
fn lidsor_filter(py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add(
        "InsufficientPointsError",
        py.get_type_bound::<InsufficientPointsError>(),
    )?;

    // Filters
    m.add_function(wrap_pyfunction!(filters::filtering_lidsor_py, m)?)?;

    // Segmentation
    m.add_class::<segmentation::PyGroundResult>()?;
    m.add_function(wrap_pyfunction!(segmentation::ransac_ground_py, m)?)?;
    m.add_function(wrap_pyfunction!(segmentation::segment_and_filter_py, m)?)?;

    Ok(())
}
