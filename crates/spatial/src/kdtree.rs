use kiddo::float::distance::SquaredEuclidean;
use kiddo::immutable::float::kdtree::ImmutableKdTree;
use lidsor_core::PointCloud;
use std::cmp::Ordering;
use std::num::NonZero;

/// A neighbor returned by a spatial query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Index into the cloud the tree was built from.
    pub index: usize,
    /// Euclidean distance to the query.
    pub distance: f32,
}

/// Ascending distance, then ascending index.
fn by_distance_then_index(a: &Neighbor, b: &Neighbor) -> Ordering {
    a.distance
        .total_cmp(&b.distance)
        .then_with(|| a.index.cmp(&b.index))
}

/// A KdTree over the spatial coordinates of a point cloud.
///
/// Built on kiddo v5's `ImmutableKdTree`, which uses a cache-optimized
/// layout and is built once in a single balanced pass. Intensity is ignored;
/// only `x y z` take part in the index. The tree keeps its own copy of the
/// coordinates so a query can be issued by point index.
///
/// Callers are expected to validate finiteness first. The tree does not
/// check it; NaN coordinates produce unspecified neighbor sets.
#[derive(Debug, Clone)]
pub struct KdTree {
    tree: ImmutableKdTree<f32, u32, 3, 32>,
    points: Vec<[f32; 3]>,
}

impl KdTree {
    pub fn build(cloud: &PointCloud) -> Self {
        let points: Vec<[f32; 3]> = cloud.iter_points().collect();
        let tree = ImmutableKdTree::new_from_slice(&points);
        Self { tree, points }
    }

    /// Returns the number of points in the tree.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The `k` nearest neighbors of the point at `point_idx`, excluding that
    /// point itself.
    ///
    /// Results are sorted by ascending distance; points at equal distance are
    /// ordered by ascending index, and that ordering also decides which of
    /// several equidistant candidates make the cut at the k-th position. A
    /// coincident duplicate of the query is a regular neighbor at distance 0.
    ///
    /// If `k >= len() - 1` every other point is returned. Returns empty if
    /// `k == 0` or `point_idx` is out of range.
    pub fn knn_excluding(&self, point_idx: usize, k: usize) -> Vec<Neighbor> {
        let n = self.len();
        if k == 0 || point_idx >= n {
            return Vec::new();
        }

        let query = self.points[point_idx];
        let want = k.min(n - 1);

        if want == n - 1 {
            let mut all: Vec<Neighbor> = (0..n)
                .filter(|&j| j != point_idx)
                .map(|j| Neighbor {
                    index: j,
                    distance: euclidean(&query, &self.points[j]),
                })
                .collect();
            all.sort_by(by_distance_then_index);
            return all;
        }

        // One extra slot for the query itself. The farthest of these results
        // bounds the k-th neighbor distance from above.
        let Some(qty) = NonZero::new(want + 1) else {
            return Vec::new();
        };
        let nearest = self.tree.nearest_n::<SquaredEuclidean>(&query, qty);
        let boundary_sq = nearest.iter().map(|nn| nn.distance).fold(0.0f32, f32::max);

        // kiddo makes no promise about which equidistant items it returns, so
        // re-collect everything on or inside the boundary and rank by index.
        let mut candidates: Vec<Neighbor> = self
            .within_sq(&query, boundary_sq)
            .into_iter()
            .filter(|nb| nb.index != point_idx)
            .collect();
        candidates.sort_by(by_distance_then_index);
        candidates.truncate(want);
        candidates
    }

    fn within_sq(&self, query: &[f32; 3], radius_sq: f32) -> Vec<Neighbor> {
        // kiddo's `within_unsorted` uses strict `<`. Widen by an epsilon and
        // post-filter with `<=` so boundary points are kept.
        let query_radius_sq = radius_sq + f32::EPSILON * radius_sq.max(1.0);

        self.tree
            .within_unsorted::<SquaredEuclidean>(query, query_radius_sq)
            .into_iter()
            .filter(|nn| nn.distance <= radius_sq)
            .map(|nn| Neighbor {
                index: nn.item as usize,
                distance: nn.distance.sqrt(),
            })
            .collect()
    }
}

#[inline]
fn euclidean(a: &[f32; 3], b: &[f32; 3]) -> f32 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

#[cfg(test)]
mod tests {
    use super::KdTree;
    use lidsor_core::PointCloud;
    use proptest::prelude::*;

    fn indices(neighbors: &[super::Neighbor]) -> Vec<usize> {
        neighbors.iter().map(|nb| nb.index).collect()
    }

    #[test]
    fn knn_excludes_the_query_point() {
        let cloud = PointCloud::from_xyz(
            vec![0.0, 1.0, 2.0, 10.0],
            vec![0.0, 0.0, 0.0, 0.0],
            vec![0.0, 0.0, 0.0, 0.0],
        );
        let tree = KdTree::build(&cloud);
        let nbrs = tree.knn_excluding(0, 2);
        assert_eq!(indices(&nbrs), vec![1, 2]);
        assert!((nbrs[0].distance - 1.0).abs() < 1e-6);
        assert!((nbrs[1].distance - 2.0).abs() < 1e-6);
    }

    #[test]
    fn knn_ties_break_by_index() {
        // Query at origin; indices 1..=4 all sit at distance 1.
        let cloud = PointCloud::from_xyz(
            vec![0.0, 0.0, 1.0, -1.0, 0.0, 5.0],
            vec![0.0, 1.0, 0.0, 0.0, -1.0, 5.0],
            vec![0.0, 0.0, 0.0, 0.0, 0.0, 5.0],
        );
        let tree = KdTree::build(&cloud);
        assert_eq!(indices(&tree.knn_excluding(0, 2)), vec![1, 2]);
        assert_eq!(indices(&tree.knn_excluding(0, 3)), vec![1, 2, 3]);
    }

    #[test]
    fn knn_counts_coincident_duplicates() {
        let cloud = PointCloud::from_xyz(vec![1.0, 1.0, 3.0], vec![0.0; 3], vec![0.0; 3]);
        let tree = KdTree::build(&cloud);
        let nbrs = tree.knn_excluding(1, 1);
        assert_eq!(indices(&nbrs), vec![0]);
        assert_eq!(nbrs[0].distance, 0.0);
    }

    #[test]
    fn knn_large_k_returns_all_others() {
        let cloud = PointCloud::from_xyz(vec![0.0, 3.0, 1.0], vec![0.0; 3], vec![0.0; 3]);
        let tree = KdTree::build(&cloud);
        assert_eq!(indices(&tree.knn_excluding(0, 100)), vec![2, 1]);
    }

    #[test]
    fn knn_k_zero_or_bad_index() {
        let cloud = PointCloud::from_xyz(vec![1.0, 2.0], vec![0.0; 2], vec![0.0; 2]);
        let tree = KdTree::build(&cloud);
        assert!(tree.knn_excluding(0, 0).is_empty());
        assert!(tree.knn_excluding(5, 1).is_empty());
    }

    #[test]
    fn knn_single_point_has_no_neighbors() {
        let cloud = PointCloud::from_xyz(vec![1.0], vec![2.0], vec![3.0]);
        let tree = KdTree::build(&cloud);
        assert!(tree.knn_excluding(0, 3).is_empty());
    }

    #[test]
    fn empty_tree() {
        let tree = KdTree::build(&PointCloud::new());
        assert!(tree.is_empty());
        assert!(tree.knn_excluding(0, 1).is_empty());
    }

    fn brute_force(pts: &[(f32, f32, f32)], q: usize, k: usize) -> Vec<usize> {
        let p = pts[q];
        let mut all: Vec<(f32, usize)> = pts
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != q)
            .map(|(j, o)| {
                let d = ((p.0 - o.0).powi(2) + (p.1 - o.1).powi(2) + (p.2 - o.2).powi(2)).sqrt();
                (d, j)
            })
            .collect();
        all.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        all.into_iter().take(k).map(|(_, j)| j).collect()
    }

    proptest! {
        #[test]
        fn knn_matches_brute_force(
            pts in prop::collection::vec(
                (-100.0f32..100.0f32, -100.0f32..100.0f32, -100.0f32..100.0f32),
                2..150
            ),
            k in 1usize..20,
            q_seed in 0usize..1000,
        ) {
            let cloud = PointCloud::from_xyz(
                pts.iter().map(|p| p.0).collect(),
                pts.iter().map(|p| p.1).collect(),
                pts.iter().map(|p| p.2).collect(),
            );
            let tree = KdTree::build(&cloud);
            let q = q_seed % pts.len();
            let got = tree.knn_excluding(q, k);
            prop_assert_eq!(got.len(), k.min(pts.len() - 1));
            prop_assert!(got.iter().all(|nb| nb.index != q));
            let expected = brute_force(&pts, q, k);
            // Distances must agree; indices agree up to float ties.
            for (nb, &j) in got.iter().zip(&expected) {
                let p = pts[q];
                let o = pts[j];
                let d = ((p.0 - o.0).powi(2) + (p.1 - o.1).powi(2) + (p.2 - o.2).powi(2)).sqrt();
                prop_assert!((nb.distance - d).abs() <= 1e-3 * d.max(1.0));
            }
        }
    }
}
