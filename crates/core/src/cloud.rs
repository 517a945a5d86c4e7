use crate::error::{LidsorError, Result};

/// Column layout of a row-major point array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointLayout {
    /// `x y z`
    Xyz,
    /// `x y z intensity`
    Xyzi,
}

impl PointLayout {
    pub fn from_columns(columns: usize) -> Result<Self> {
        match columns {
            3 => Ok(Self::Xyz),
            4 => Ok(Self::Xyzi),
            other => Err(LidsorError::invalid(format!(
                "expected 3 or 4 columns, got {other}"
            ))),
        }
    }

    pub fn columns(self) -> usize {
        match self {
            Self::Xyz => 3,
            Self::Xyzi => 4,
        }
    }
}

/// Largest accepted coordinate magnitude.
///
/// Squared distances are computed in f32; within this bound the squared
/// distance between any two points, `3 * (2 * MAX_COORDINATE)^2`, stays finite.
pub const MAX_COORDINATE: f32 = 5.0e18;

/// An ordered point cloud stored as structure-of-arrays.
///
/// Intensity is optional; when present it has exactly one value per point.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub z: Vec<f32>,
    pub intensity: Option<Vec<f32>>,
}

impl PointCloud {
    pub fn new() -> Self {
        Self {
            x: Vec::new(),
            y: Vec::new(),
            z: Vec::new(),
            intensity: None,
        }
    }

    pub fn from_xyz(x: Vec<f32>, y: Vec<f32>, z: Vec<f32>) -> Self {
        assert_eq!(x.len(), y.len(), "x and y must have same length");
        assert_eq!(x.len(), z.len(), "x and z must have same length");

        Self {
            x,
            y,
            z,
            intensity: None,
        }
    }

    pub fn from_xyzi(x: Vec<f32>, y: Vec<f32>, z: Vec<f32>, intensity: Vec<f32>) -> Self {
        assert_eq!(
            x.len(),
            intensity.len(),
            "x and intensity must have same length"
        );
        let mut cloud = Self::from_xyz(x, y, z);
        cloud.intensity = Some(intensity);
        cloud
    }

    /// Build a cloud from a row-major `N x columns` buffer.
    ///
    /// `columns` must be 3 (`x y z`) or 4 (`x y z intensity`). Values are
    /// copied as-is; finiteness is checked separately by [`validate_values`].
    ///
    /// [`validate_values`]: PointCloud::validate_values
    pub fn from_rows(data: &[f32], columns: usize) -> Result<Self> {
        let layout = PointLayout::from_columns(columns)?;
        if data.len() % columns != 0 {
            return Err(LidsorError::invalid(format!(
                "buffer of {} values is not a multiple of {columns} columns",
                data.len()
            )));
        }

        let n = data.len() / columns;
        let mut x = Vec::with_capacity(n);
        let mut y = Vec::with_capacity(n);
        let mut z = Vec::with_capacity(n);
        let mut intensity = match layout {
            PointLayout::Xyzi => Some(Vec::with_capacity(n)),
            PointLayout::Xyz => None,
        };

        for row in data.chunks_exact(columns) {
            x.push(row[0]);
            y.push(row[1]);
            z.push(row[2]);
            if let Some(it) = intensity.as_mut() {
                it.push(row[3]);
            }
        }

        Ok(Self { x, y, z, intensity })
    }

    /// Build a cloud from a row-major float64 buffer, narrowing to f32.
    ///
    /// Finite values whose magnitude exceeds `f32::MAX` are rejected rather
    /// than rounded to infinity. NaN and infinities pass through unchanged
    /// and are left to [`validate_values`].
    ///
    /// [`validate_values`]: PointCloud::validate_values
    pub fn from_rows_f64(data: &[f64], columns: usize) -> Result<Self> {
        PointLayout::from_columns(columns)?;
        if let Some(pos) = data
            .iter()
            .position(|v| v.is_finite() && v.abs() > f32::MAX as f64)
        {
            return Err(LidsorError::invalid(format!(
                "value {} at row {}, column {} is outside the float32 range",
                data[pos],
                pos / columns,
                pos % columns
            )));
        }
        let narrowed: Vec<f32> = data.iter().map(|&v| v as f32).collect();
        Self::from_rows(&narrowed, columns)
    }

    pub fn len(&self) -> usize {
        debug_assert_eq!(self.x.len(), self.y.len());
        debug_assert_eq!(self.x.len(), self.z.len());
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn layout(&self) -> PointLayout {
        if self.intensity.is_some() {
            PointLayout::Xyzi
        } else {
            PointLayout::Xyz
        }
    }

    pub fn columns(&self) -> usize {
        self.layout().columns()
    }

    pub fn point(&self, i: usize) -> [f32; 3] {
        [self.x[i], self.y[i], self.z[i]]
    }

    /// Distance of point `i` from the sensor origin.
    pub fn range(&self, i: usize) -> f32 {
        (self.x[i] * self.x[i] + self.y[i] * self.y[i] + self.z[i] * self.z[i]).sqrt()
    }

    pub fn iter_points(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.z)
            .map(|((x, y), z)| [*x, *y, *z])
    }

    /// Reject clouds with ragged columns, any NaN / infinite value, or a
    /// coordinate beyond [`MAX_COORDINATE`] in magnitude.
    ///
    /// The error names the first offending row and column.
    pub fn validate_values(&self) -> Result<()> {
        let n = self.x.len();
        if self.y.len() != n || self.z.len() != n {
            return Err(LidsorError::invalid(format!(
                "coordinate columns have mismatched lengths ({}, {}, {})",
                n,
                self.y.len(),
                self.z.len()
            )));
        }
        if let Some(it) = &self.intensity {
            if it.len() != n {
                return Err(LidsorError::invalid(format!(
                    "intensity has {} values for {n} points",
                    it.len()
                )));
            }
        }

        for i in 0..n {
            let row = [
                self.x[i],
                self.y[i],
                self.z[i],
                self.intensity.as_ref().map_or(0.0, |it| it[i]),
            ];
            if let Some(col) = row.iter().position(|v| !v.is_finite()) {
                return Err(LidsorError::invalid(format!(
                    "non-finite value {} at row {i}, column {col}",
                    row[col]
                )));
            }
            if let Some(col) = row[..3].iter().position(|v| v.abs() > MAX_COORDINATE) {
                return Err(LidsorError::invalid(format!(
                    "coordinate {} at row {i}, column {col} exceeds the supported magnitude {MAX_COORDINATE:e}",
                    row[col]
                )));
            }
        }
        Ok(())
    }

    pub fn select(&self, indices: &[usize]) -> Self {
        let mut x = Vec::with_capacity(indices.len());
        let mut y = Vec::with_capacity(indices.len());
        let mut z = Vec::with_capacity(indices.len());

        for &idx in indices {
            assert!(idx < self.len(), "index out of bounds in select");
            x.push(self.x[idx]);
            y.push(self.y[idx]);
            z.push(self.z[idx]);
        }

        let intensity = self
            .intensity
            .as_ref()
            .map(|it| indices.iter().map(|&idx| it[idx]).collect());

        Self { x, y, z, intensity }
    }

    /// Append `other` after `self`.
    ///
    /// Both clouds must share a layout; an empty cloud adopts the other's.
    pub fn concat(&self, other: &PointCloud) -> Result<Self> {
        if self.is_empty() {
            return Ok(other.clone());
        }
        if other.is_empty() {
            return Ok(self.clone());
        }
        if self.layout() != other.layout() {
            return Err(LidsorError::invalid(format!(
                "cannot concatenate {}-column and {}-column clouds",
                self.columns(),
                other.columns()
            )));
        }

        let join = |a: &[f32], b: &[f32]| a.iter().chain(b).copied().collect::<Vec<f32>>();
        let intensity = match (&self.intensity, &other.intensity) {
            (Some(a), Some(b)) => Some(join(a, b)),
            _ => None,
        };

        Ok(Self {
            x: join(&self.x, &other.x),
            y: join(&self.y, &other.y),
            z: join(&self.z, &other.z),
            intensity,
        })
    }

    /// Row-major `N x columns()` copy, widened to f64.
    pub fn to_rows(&self) -> Vec<f64> {
        let cols = self.columns();
        let mut out = Vec::with_capacity(self.len() * cols);
        for i in 0..self.len() {
            out.push(self.x[i] as f64);
            out.push(self.y[i] as f64);
            out.push(self.z[i] as f64);
            if let Some(it) = &self.intensity {
                out.push(it[i] as f64);
            }
        }
        out
    }
}

impl Default for PointCloud {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{PointCloud, PointLayout, MAX_COORDINATE};
    use crate::LidsorError;
    use proptest::prelude::*;

    #[test]
    fn new_is_empty() {
        let cloud = PointCloud::new();
        assert!(cloud.is_empty());
        assert_eq!(cloud.len(), 0);
        assert_eq!(cloud.layout(), PointLayout::Xyz);
    }

    #[test]
    fn from_rows_xyz() {
        let cloud = PointCloud::from_rows(&[1.0, 10.0, 100.0, 2.0, 20.0, 200.0], 3).unwrap();
        assert_eq!(cloud.x, vec![1.0, 2.0]);
        assert_eq!(cloud.y, vec![10.0, 20.0]);
        assert_eq!(cloud.z, vec![100.0, 200.0]);
        assert!(cloud.intensity.is_none());
    }

    #[test]
    fn from_rows_xyzi() {
        let cloud =
            PointCloud::from_rows(&[1.0, 2.0, 3.0, 0.5, 4.0, 5.0, 6.0, 0.25], 4).unwrap();
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.layout(), PointLayout::Xyzi);
        assert_eq!(cloud.intensity, Some(vec![0.5, 0.25]));
        assert_eq!(cloud.point(1), [4.0, 5.0, 6.0]);
    }

    #[test]
    fn from_rows_rejects_bad_column_count() {
        let err = PointCloud::from_rows(&[0.0; 10], 5).unwrap_err();
        assert!(matches!(err, LidsorError::InvalidInput(_)));
        assert!(err.to_string().contains("got 5"));
    }

    #[test]
    fn from_rows_rejects_ragged_buffer() {
        let err = PointCloud::from_rows(&[0.0; 7], 3).unwrap_err();
        assert!(matches!(err, LidsorError::InvalidInput(_)));
    }

    #[test]
    fn from_rows_f64_narrows_values() {
        let cloud = PointCloud::from_rows_f64(&[1.5, -2.0, 3.25, 1.0e30, 0.0, 0.0], 3).unwrap();
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.point(0), [1.5, -2.0, 3.25]);
        assert_eq!(cloud.x[1], 1.0e30_f64 as f32);
    }

    #[test]
    fn from_rows_f64_rejects_values_beyond_f32() {
        let err = PointCloud::from_rows_f64(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 1.0e39], 4)
            .unwrap_err();
        assert!(matches!(err, LidsorError::InvalidInput(_)));
        let msg = err.to_string();
        assert!(msg.contains("row 1, column 3"), "{msg}");
        assert!(msg.contains("float32 range"), "{msg}");

        let err = PointCloud::from_rows_f64(&[-1.0e300, 0.0, 0.0], 3).unwrap_err();
        assert!(err.to_string().contains("row 0, column 0"));
    }

    #[test]
    fn from_rows_f64_leaves_non_finite_to_validation() {
        let cloud = PointCloud::from_rows_f64(&[f64::NAN, 0.0, f64::INFINITY], 3).unwrap();
        assert!(cloud.x[0].is_nan());
        assert!(cloud.validate_values().is_err());
    }

    #[test]
    fn from_rows_empty() {
        let cloud = PointCloud::from_rows(&[], 4).unwrap();
        assert!(cloud.is_empty());
        assert_eq!(cloud.columns(), 4);
    }

    #[test]
    fn to_rows_keeps_intensity_column() {
        let cloud = PointCloud::from_xyzi(vec![1.0], vec![2.0], vec![3.0], vec![7.5]);
        assert_eq!(cloud.to_rows(), vec![1.0, 2.0, 3.0, 7.5]);
    }

    #[test]
    fn validate_values_names_offending_cell() {
        let cloud = PointCloud::from_xyzi(
            vec![0.0, 1.0, 2.0],
            vec![0.0; 3],
            vec![0.0; 3],
            vec![1.0, 1.0, f32::NAN],
        );
        let err = cloud.validate_values().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("row 2"), "{msg}");
        assert!(msg.contains("column 3"), "{msg}");
    }

    #[test]
    fn validate_values_rejects_infinity() {
        let cloud = PointCloud::from_xyz(vec![0.0, f32::INFINITY], vec![0.0; 2], vec![0.0; 2]);
        assert!(cloud.validate_values().is_err());
    }

    #[test]
    fn validate_values_rejects_huge_coordinates() {
        let cloud = PointCloud::from_xyz(vec![0.0, 1.0], vec![0.0, -1.0e20], vec![0.0; 2]);
        let msg = cloud.validate_values().unwrap_err().to_string();
        assert!(msg.contains("row 1, column 1"), "{msg}");
        assert!(msg.contains("magnitude"), "{msg}");
    }

    #[test]
    fn validate_values_accepts_bound_and_huge_intensity() {
        let cloud = PointCloud::from_xyzi(
            vec![MAX_COORDINATE, -MAX_COORDINATE],
            vec![0.0; 2],
            vec![0.0; 2],
            vec![1.0e30, 0.0],
        );
        assert!(cloud.validate_values().is_ok());
    }

    #[test]
    fn validate_values_rejects_short_intensity() {
        let mut cloud = PointCloud::from_xyz(vec![0.0, 1.0], vec![0.0; 2], vec![0.0; 2]);
        cloud.intensity = Some(vec![1.0]);
        assert!(cloud.validate_values().is_err());
    }

    #[test]
    fn range_is_origin_distance() {
        let cloud = PointCloud::from_xyz(vec![3.0], vec![4.0], vec![0.0]);
        assert!((cloud.range(0) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn select_carries_intensity() {
        let cloud = PointCloud::from_xyzi(
            vec![0.0, 1.0, 2.0, 3.0],
            vec![10.0, 11.0, 12.0, 13.0],
            vec![20.0, 21.0, 22.0, 23.0],
            vec![0.1, 0.2, 0.3, 0.4],
        );
        let selected = cloud.select(&[3, 1]);
        assert_eq!(selected.x, vec![3.0, 1.0]);
        assert_eq!(selected.z, vec![23.0, 21.0]);
        assert_eq!(selected.intensity, Some(vec![0.4, 0.2]));
    }

    #[test]
    fn concat_appends_rows() {
        let a = PointCloud::from_xyzi(vec![1.0], vec![1.0], vec![1.0], vec![5.0]);
        let b = PointCloud::from_xyzi(vec![2.0, 3.0], vec![2.0, 3.0], vec![2.0, 3.0], vec![6.0, 7.0]);
        let c = a.concat(&b).unwrap();
        assert_eq!(c.x, vec![1.0, 2.0, 3.0]);
        assert_eq!(c.intensity, Some(vec![5.0, 6.0, 7.0]));
    }

    #[test]
    fn concat_with_empty_adopts_layout() {
        let a = PointCloud::new();
        let b = PointCloud::from_xyzi(vec![2.0], vec![2.0], vec![2.0], vec![6.0]);
        assert_eq!(a.concat(&b).unwrap(), b);
        assert_eq!(b.concat(&a).unwrap(), b);
    }

    #[test]
    fn concat_rejects_mixed_layouts() {
        let a = PointCloud::from_xyz(vec![1.0], vec![1.0], vec![1.0]);
        let b = PointCloud::from_xyzi(vec![2.0], vec![2.0], vec![2.0], vec![6.0]);
        assert!(a.concat(&b).is_err());
    }

    #[test]
    #[should_panic]
    fn from_xyz_panics_on_mismatch() {
        let _ = PointCloud::from_xyz(vec![1.0], vec![2.0, 3.0], vec![4.0]);
    }

    proptest! {
        #[test]
        fn rows_survive_widening(
            pts in prop::collection::vec(
                (-1000.0f32..1000.0f32, -1000.0f32..1000.0f32, -1000.0f32..1000.0f32, 0.0f32..255.0f32),
                0..300
            )
        ) {
            let mut flat = Vec::with_capacity(pts.len() * 4);
            for (x, y, z, i) in &pts {
                flat.extend_from_slice(&[*x, *y, *z, *i]);
            }
            let cloud = PointCloud::from_rows(&flat, 4).unwrap();
            let widened: Vec<f64> = flat.iter().map(|&v| v as f64).collect();
            prop_assert_eq!(cloud.to_rows(), widened);
        }

        #[test]
        fn select_keeps_requested_rows(
            n in 1usize..100,
            idxs in prop::collection::vec(0usize..100, 0..100)
        ) {
            let cloud = PointCloud::from_xyzi(
                (0..n).map(|i| i as f32).collect(),
                vec![0.0; n],
                vec![0.0; n],
                (0..n).map(|i| i as f32 * 2.0).collect(),
            );
            let valid: Vec<usize> = idxs.into_iter().filter(|i| *i < n).collect();
            let picked = cloud.select(&valid);
            prop_assert_eq!(picked.len(), valid.len());
            for (row, &src) in valid.iter().enumerate() {
                prop_assert_eq!(picked.point(row), cloud.point(src));
                prop_assert_eq!(picked.intensity.as_ref().unwrap()[row], src as f32 * 2.0);
            }
        }
    }
}
