use lidsor_core::PointCloud;
use numpy::{PyArray1, PyArray2, PyArrayMethods, PyUntypedArrayMethods};
use pyo3::exceptions::{PyTypeError, PyValueError};
use pyo3::prelude::*;

/// Read an `N x 3` or `N x 4` NumPy array into a [`PointCloud`].
///
/// Accepts float32 or float64 arrays. float64 is narrowed to float32, so
/// precision beyond about 7 significant digits is lost, and finite values
/// outside the float32 range raise `ValueError`. The array
/// must be C-contiguous (row-major). Fortran-order arrays are rejected to
/// prevent silent data corruption.
pub fn cloud_from_numpy(array: &Bound<'_, PyAny>) -> PyResult<PointCloud> {
    if let Ok(arr) = array.downcast::<PyArray2<f32>>() {
        return from_f32_array(arr);
    }
    if let Ok(arr) = array.downcast::<PyArray2<f64>>() {
        return from_f64_array(arr);
    }
    Err(PyTypeError::new_err(
        "expected NumPy array with dtype float32 or float64, shape (N, 3) or (N, 4)",
    ))
}

/// Copy a cloud into an `N x C` float64 array, `C` being 3 or 4.
pub fn cloud_to_numpy<'py>(
    py: Python<'py>,
    cloud: &PointCloud,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    PyArray1::from_vec_bound(py, cloud.to_rows()).reshape([cloud.len(), cloud.columns()])
}

fn check_layout(c_contiguous: bool, shape: &[usize]) -> PyResult<usize> {
    if !c_contiguous {
        return Err(PyValueError::new_err(
            "array must be C-contiguous (row-major). \
             Use numpy.ascontiguousarray(arr) to convert.",
        ));
    }
    match shape {
        [_, cols @ (3 | 4)] => Ok(*cols),
        _ => Err(PyValueError::new_err(format!(
            "expected shape (N, 3) or (N, 4), got {shape:?}"
        ))),
    }
}

fn from_f32_array(array: &Bound<'_, PyArray2<f32>>) -> PyResult<PointCloud> {
    let cols = check_layout(array.is_c_contiguous(), array.shape())?;
    let readonly = array.readonly();
    let slice = readonly
        .as_slice()
        .map_err(|_| PyValueError::new_err("failed to read array as contiguous slice"))?;
    PointCloud::from_rows(slice, cols).map_err(crate::to_py_err)
}

fn from_f64_array(array: &Bound<'_, PyArray2<f64>>) -> PyResult<PointCloud> {
    let cols = check_layout(array.is_c_contiguous(), array.shape())?;
    let readonly = array.readonly();
    let slice = readonly
        .as_slice()
        .map_err(|_| PyValueError::new_err("failed to read array as contiguous slice"))?;
    PointCloud::from_rows_f64(slice, cols).map_err(crate::to_py_err)
}
