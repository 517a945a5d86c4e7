use crate::cloud::{cloud_from_numpy, cloud_to_numpy};
use crate::filters::build_params;
use lidsor_core::PointCloud;
use lidsor_segmentation::{GroundPartition, RansacGround, RansacGroundConfig};
use numpy::PyArray2;
use pyo3::prelude::*;

/// Ground split of a cloud. `normal` and `d` are `None` when no plane was
/// found, in which case `ground` is empty.
#[pyclass(name = "GroundResult")]
#[derive(Debug, Clone)]
pub struct PyGroundResult {
    #[pyo3(get)]
    pub normal: Option<[f32; 3]>,
    #[pyo3(get)]
    pub d: Option<f32>,
    #[pyo3(get)]
    pub ground: Vec<usize>,
    #[pyo3(get)]
    pub nonground: Vec<usize>,
}

#[pymethods]
impl PyGroundResult {
    pub fn __repr__(&self) -> String {
        let plane = match (self.normal, self.d) {
            (Some(normal), Some(d)) => format!("normal={normal:?}, d={d:.4}"),
            _ => "normal=None, d=None".to_string(),
        };
        format!(
            "GroundResult({plane}, ground={}, nonground={})",
            self.ground.len(),
            self.nonground.len()
        )
    }
}

fn ransac_config(
    distance_threshold: f32,
    iterations: usize,
    seed: u64,
    max_tilt_degrees: f32,
) -> PyResult<RansacGroundConfig> {
    let config = RansacGroundConfig {
        distance_threshold,
        iterations,
        seed,
        max_tilt_degrees,
    };
    config.validate().map_err(crate::to_py_err)?;
    Ok(config)
}

/// Fit a ground plane with RANSAC and split the points around it.
///
/// When no near-horizontal plane exists the result has `normal=None`,
/// `d=None` and every point in `nonground`.
#[pyfunction(name = "ransac_ground")]
#[pyo3(signature = (
    points,
    distance_threshold = 0.2,
    iterations = 200,
    seed = 42,
    max_tilt_degrees = 25.0,
))]
pub fn ransac_ground_py(
    py: Python<'_>,
    points: &Bound<'_, PyAny>,
    distance_threshold: f32,
    iterations: usize,
    seed: u64,
    max_tilt_degrees: f32,
) -> PyResult<PyGroundResult> {
    let config = ransac_config(distance_threshold, iterations, seed, max_tilt_degrees)?;
    let cloud = cloud_from_numpy(points)?;
    let segmenter = RansacGround::new(config);
    let (plane, partition) = py
        .allow_threads(|| segmenter.segment_with_plane(&cloud))
        .map_err(crate::to_py_err)?;
    Ok(PyGroundResult {
        normal: plane.map(|m| m.normal),
        d: plane.map(|m| m.d),
        ground: partition.ground().to_vec(),
        nonground: partition.nonground().to_vec(),
    })
}

/// Filter the non-ground part of a cloud and return ground rows followed by
/// the surviving non-ground rows.
///
/// When `ground_indices` is given it is taken as the ground set, every other
/// point being non-ground; this is the hook for an external segmenter.
/// Otherwise the ground is found with RANSAC using `ransac_*` settings.
#[pyfunction(name = "segment_and_filter")]
#[pyo3(signature = (
    points,
    ground_indices = None,
    k = 30,
    s = 2.0,
    scaling_factor = 0.0,
    max_range = None,
    range_multiplier = None,
    intensity_rescue = None,
    ransac_distance_threshold = 0.2,
    ransac_iterations = 200,
    ransac_seed = 42,
))]
#[allow(clippy::too_many_arguments)]
pub fn segment_and_filter_py<'py>(
    py: Python<'py>,
    points: &Bound<'py, PyAny>,
    ground_indices: Option<Vec<usize>>,
    k: i64,
    s: f32,
    scaling_factor: f32,
    max_range: Option<f32>,
    range_multiplier: Option<f32>,
    intensity_rescue: Option<f32>,
    ransac_distance_threshold: f32,
    ransac_iterations: usize,
    ransac_seed: u64,
) -> PyResult<(Bound<'py, PyArray2<f64>>, Vec<usize>)> {
    let params = build_params(k, s, scaling_factor, max_range, range_multiplier, intensity_rescue)?;
    let cloud = cloud_from_numpy(points)?;

    let merged = match ground_indices {
        Some(ground) => {
            let given = move |c: &PointCloud| GroundPartition::from_ground(ground.clone(), c.len());
            py.allow_threads(|| lidsor_segmentation::segment_and_filter(&cloud, &given, &params))
        }
        None => {
            let config = ransac_config(
                ransac_distance_threshold,
                ransac_iterations,
                ransac_seed,
                RansacGroundConfig::default().max_tilt_degrees,
            )?;
            let segmenter = RansacGround::new(config);
            py.allow_threads(|| {
                lidsor_segmentation::segment_and_filter(&cloud, &segmenter, &params)
            })
        }
    }
    .map_err(crate::to_py_err)?;

    Ok((
        cloud_to_numpy(py, &merged.merged)?,
        merged.merged_input_indices(),
    ))
}
