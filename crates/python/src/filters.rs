use crate::cloud::{cloud_from_numpy, cloud_to_numpy};
use lidsor_filters::LidsorParams;
use numpy::PyArray2;
use pyo3::prelude::*;

type FilterOutput<'py> = (Bound<'py, PyArray2<f64>>, Vec<usize>, Vec<usize>);

/// Convert a Python-side `k` into a neighbor count, rejecting negatives
/// before they can wrap.
pub(crate) fn neighbor_count(k: i64) -> PyResult<usize> {
    usize::try_from(k)
        .ok()
        .filter(|&k| k >= 1)
        .ok_or_else(|| pyo3::exceptions::PyValueError::new_err(format!("k must be >= 1, got {k}")))
}

pub(crate) fn build_params(
    k: i64,
    s: f32,
    scaling_factor: f32,
    max_range: Option<f32>,
    range_multiplier: Option<f32>,
    intensity_rescue: Option<f32>,
) -> PyResult<LidsorParams> {
    let mut params = LidsorParams::new(neighbor_count(k)?, s).with_scaling_factor(scaling_factor);
    if let Some(r) = max_range {
        params = params.with_max_range(r);
    }
    if let Some(m) = range_multiplier {
        params = params.with_range_multiplier(m);
    }
    if let Some(t) = intensity_rescue {
        params = params.with_intensity_rescue(t);
    }
    params.validate().map_err(crate::to_py_err)?;
    Ok(params)
}

/// Remove statistical outliers from an `N x 3` or `N x 4` array.
///
/// Returns `(filtered_points, kept_indices, removed_indices)`; the filtered
/// array is float64 with the input's column count.
///
/// Computation runs in float32. float64 input is narrowed on the way in, so
/// the returned rows are the narrowed values widened back, not the original
/// float64 values. Use `kept_indices` to select from the original array when
/// full precision matters. Finite values outside the float32 range raise
/// `ValueError`.
#[pyfunction(name = "filtering_lidsor")]
#[pyo3(signature = (
    points,
    k = 30,
    s = 2.0,
    scaling_factor = 0.0,
    max_range = None,
    range_multiplier = None,
    intensity_rescue = None,
))]
#[allow(clippy::too_many_arguments)]
pub fn filtering_lidsor_py<'py>(
    py: Python<'py>,
    points: &Bound<'py, PyAny>,
    k: i64,
    s: f32,
    scaling_factor: f32,
    max_range: Option<f32>,
    range_multiplier: Option<f32>,
    intensity_rescue: Option<f32>,
) -> PyResult<FilterOutput<'py>> {
    let params = build_params(k, s, scaling_factor, max_range, range_multiplier, intensity_rescue)?;
    let cloud = cloud_from_numpy(points)?;
    let result = py
        .allow_threads(|| lidsor_filters::filter_lidsor(&cloud, &params))
        .map_err(crate::to_py_err)?;
    Ok((
        cloud_to_numpy(py, &result.kept)?,
        result.kept_indices,
        result.removed_indices,
    ))
}
