use lidsor_core::PointCloud;
use lidsor_spatial::KdTree;
use rayon::prelude::*;

/// Distance between two points given their spatial distance and intensity
/// gap.
///
/// With `scaling_factor > 0` the scaled intensity gap is added in
/// quadrature:
///
/// ```text
/// d = sqrt(d_xyz^2 + (|dI| / scaling_factor)^2)
/// ```
///
/// With `scaling_factor == 0` this is `d_xyz`. The result never decreases
/// as `|dI|` grows, and strictly increases when `scaling_factor > 0`.
#[inline]
pub fn pair_distance(spatial: f32, intensity_gap: f64, scaling_factor: f32) -> f64 {
    let spatial = spatial as f64;
    if scaling_factor <= 0.0 {
        return spatial;
    }
    let scaled = intensity_gap.abs() / scaling_factor as f64;
    (spatial * spatial + scaled * scaled).sqrt()
}

/// Mean neighbor distance for every point of `cloud`, in input order.
///
/// `tree` must have been built from `cloud`. Neighbors are selected by
/// spatial distance only; intensity, when `scaling_factor > 0` and the cloud
/// carries it, affects the averaged distances but not who the neighbors are.
///
/// Points are scored in parallel; each score depends only on the shared
/// read-only tree and cloud. A point with no neighbors scores `0.0`.
pub fn score_points(cloud: &PointCloud, tree: &KdTree, k: usize, scaling_factor: f32) -> Vec<f64> {
    debug_assert_eq!(cloud.len(), tree.len());

    let intensity = cloud
        .intensity
        .as_deref()
        .filter(|_| scaling_factor > 0.0);

    (0..cloud.len())
        .into_par_iter()
        .map(|i| {
            let neighbors = tree.knn_excluding(i, k);
            if neighbors.is_empty() {
                return 0.0;
            }
            let sum: f64 = neighbors
                .iter()
                .map(|nb| match intensity {
                    Some(it) => {
                        let gap = it[i] as f64 - it[nb.index] as f64;
                        pair_distance(nb.distance, gap, scaling_factor)
                    }
                    None => nb.distance as f64,
                })
                .sum();
            sum / neighbors.len() as f64
        })
        .collect()
}
