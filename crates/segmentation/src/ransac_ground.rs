use crate::ground::{GroundPartition, GroundSegmenter};
use lidsor_core::{LidsorError, PointCloud, Result};
use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A 3D plane model in the form `n . x + d = 0`, where `n` is a unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneModel {
    pub normal: [f32; 3],
    pub d: f32,
}

impl PlaneModel {
    /// Computes the absolute distance from a point to this plane.
    /// Assumes `normal` is a unit vector.
    #[inline]
    pub fn distance_to_point(&self, point: &[f32; 3]) -> f32 {
        (self.normal[0] * point[0] + self.normal[1] * point[1] + self.normal[2] * point[2] + self.d)
            .abs()
    }

    /// Angle between the plane normal and the vertical axis, in degrees.
    /// A downward-facing normal has the same tilt as its upward twin.
    pub fn tilt_degrees(&self) -> f32 {
        self.normal[2].abs().min(1.0).acos().to_degrees()
    }
}

impl Default for PlaneModel {
    fn default() -> Self {
        Self {
            normal: [0.0, 0.0, 1.0],
            d: 0.0,
        }
    }
}

fn default_distance_threshold() -> f32 {
    0.2
}

fn default_iterations() -> usize {
    200
}

fn default_seed() -> u64 {
    42
}

fn default_max_tilt_degrees() -> f32 {
    25.0
}

/// Settings for [`RansacGround`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RansacGroundConfig {
    /// Maximum point-to-plane distance for a ground point.
    #[serde(default = "default_distance_threshold")]
    pub distance_threshold: f32,

    /// Number of candidate planes to sample.
    #[serde(default = "default_iterations")]
    pub iterations: usize,

    /// Seed for the sampling RNG.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Candidate planes tilted further than this from horizontal are
    /// rejected, so walls and facades never win.
    #[serde(default = "default_max_tilt_degrees")]
    pub max_tilt_degrees: f32,
}

impl Default for RansacGroundConfig {
    fn default() -> Self {
        Self {
            distance_threshold: default_distance_threshold(),
            iterations: default_iterations(),
            seed: default_seed(),
            max_tilt_degrees: default_max_tilt_degrees(),
        }
    }
}

impl RansacGroundConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.distance_threshold.is_finite() || self.distance_threshold <= 0.0 {
            return Err(LidsorError::invalid(format!(
                "distance_threshold must be finite and > 0, got {}",
                self.distance_threshold
            )));
        }
        if !(0.0..=90.0).contains(&self.max_tilt_degrees) {
            return Err(LidsorError::invalid(format!(
                "max_tilt_degrees must be within [0, 90], got {}",
                self.max_tilt_degrees
            )));
        }
        Ok(())
    }
}

/// Ground segmentation by fitting the dominant near-horizontal plane.
///
/// Points within `distance_threshold` of the best plane are ground, the rest
/// non-ground. If no acceptable plane is found every point is non-ground.
#[derive(Debug, Clone, Default)]
pub struct RansacGround {
    config: RansacGroundConfig,
}

impl RansacGround {
    pub fn new(config: RansacGroundConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RansacGroundConfig {
        &self.config
    }

    /// Fit the ground plane, returning it with its inlier indices.
    ///
    /// # Algorithm
    ///
    /// 1. Pre-generate all random samples upfront for determinism.
    /// 2. For large clouds, evaluate candidates in parallel with rayon and
    ///    keep the earliest best-scoring one.
    /// 3. Otherwise evaluate sequentially with adaptive early termination
    ///    based on the inlier ratio.
    /// 4. Return the best plane and its inliers in ascending order.
    pub fn fit(&self, cloud: &PointCloud) -> Option<(PlaneModel, Vec<usize>)> {
        let n = cloud.len();
        if n < 3 {
            return None;
        }
        let RansacGroundConfig {
            distance_threshold,
            iterations,
            seed,
            max_tilt_degrees,
        } = self.config;

        let points: Vec<[f32; 3]> = cloud.iter_points().collect();

        let mut rng = StdRng::seed_from_u64(seed);
        let samples: Vec<(usize, usize, usize)> = (0..iterations)
            .filter_map(|_| sample_three_distinct(n, &mut rng))
            .collect();

        // Compare cosines so a 90 degree limit admits exactly vertical walls.
        let min_cos = max_tilt_degrees.to_radians().cos();
        let candidate = |&(i0, i1, i2): &(usize, usize, usize)| {
            fit_plane_from_three_points(&points[i0], &points[i1], &points[i2])
                .filter(|m| m.normal[2].abs() >= min_cos)
        };

        let use_parallel = n >= 10_000 && samples.len() >= 16;

        let best = if use_parallel {
            samples
                .par_iter()
                .filter_map(|s| {
                    let model = candidate(s)?;
                    Some((model, count_inliers(&points, &model, distance_threshold)))
                })
                .reduce_with(|a, b| if a.1 >= b.1 { a } else { b })
        } else {
            let mut best: Option<(PlaneModel, usize)> = None;
            for (iter, s) in samples.iter().enumerate() {
                let Some(model) = candidate(s) else {
                    continue;
                };
                let count = count_inliers(&points, &model, distance_threshold);
                if best.map_or(true, |(_, c)| count > c) {
                    best = Some((model, count));

                    // Adaptive early termination
                    let w = count as f64 / n as f64;
                    if w > 0.5 {
                        let needed = (1.0 - 0.999f64).ln() / (1.0 - w.powi(3)).ln();
                        if (iter as f64) > needed {
                            break;
                        }
                    }
                }
            }
            best
        };

        let (model, count) = best?;
        if count == 0 {
            return None;
        }
        let inliers: Vec<usize> = (0..n)
            .filter(|&j| model.distance_to_point(&points[j]) <= distance_threshold)
            .collect();
        Some((model, inliers))
    }

    /// Validate and segment, also returning the fitted plane.
    ///
    /// The plane is `None` when no acceptable candidate exists; every point
    /// is then non-ground.
    pub fn segment_with_plane(
        &self,
        cloud: &PointCloud,
    ) -> Result<(Option<PlaneModel>, GroundPartition)> {
        self.config.validate()?;
        cloud.validate_values()?;

        let (plane, ground) = match self.fit(cloud) {
            Some((model, inliers)) => {
                log::debug!(
                    "ground plane normal={:?} d={:.4} tilt={:.1}deg inliers={}",
                    model.normal,
                    model.d,
                    model.tilt_degrees(),
                    inliers.len()
                );
                (Some(model), inliers)
            }
            None => {
                log::warn!(
                    "no ground plane found in {} points; treating all as non-ground",
                    cloud.len()
                );
                (None, Vec::new())
            }
        };

        Ok((plane, GroundPartition::from_ground(ground, cloud.len())?))
    }
}

impl GroundSegmenter for RansacGround {
    fn segment(&self, cloud: &PointCloud) -> Result<GroundPartition> {
        self.segment_with_plane(cloud).map(|(_, partition)| partition)
    }
}

#[inline]
fn count_inliers(points: &[[f32; 3]], model: &PlaneModel, threshold: f32) -> usize {
    points
        .iter()
        .filter(|p| model.distance_to_point(p) <= threshold)
        .count()
}

/// Samples 3 distinct indices in [0, n).
fn sample_three_distinct(n: usize, rng: &mut StdRng) -> Option<(usize, usize, usize)> {
    if n < 3 {
        return None;
    }
    let i0 = rng.gen_range(0..n);
    let mut i1 = rng.gen_range(0..n);
    let mut attempts = 0;
    while i1 == i0 {
        if attempts > 100 {
            return None;
        }
        i1 = rng.gen_range(0..n);
        attempts += 1;
    }
    let mut i2 = rng.gen_range(0..n);
    attempts = 0;
    while i2 == i0 || i2 == i1 {
        if attempts > 100 {
            return None;
        }
        i2 = rng.gen_range(0..n);
        attempts += 1;
    }
    Some((i0, i1, i2))
}

/// Fits a plane through 3 points, returning `None` if they are collinear.
fn fit_plane_from_three_points(p0: &[f32; 3], p1: &[f32; 3], p2: &[f32; 3]) -> Option<PlaneModel> {
    let v1 = [p1[0] - p0[0], p1[1] - p0[1], p1[2] - p0[2]];
    let v2 = [p2[0] - p0[0], p2[1] - p0[1], p2[2] - p0[2]];

    let nx = v1[1] * v2[2] - v1[2] * v2[1];
    let ny = v1[2] * v2[0] - v1[0] * v2[2];
    let nz = v1[0] * v2[1] - v1[1] * v2[0];

    let len = (nx * nx + ny * ny + nz * nz).sqrt();
    if len < 1e-10 {
        return None;
    }

    let normal = [nx / len, ny / len, nz / len];
    let d = -(normal[0] * p0[0] + normal[1] * p0[1] + normal[2] * p0[2]);

    Some(PlaneModel { normal, d })
}
