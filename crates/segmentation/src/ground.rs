use lidsor_core::{LidsorError, PointCloud, Result};

/// An exact split of a cloud's indices into ground and non-ground.
///
/// Construction checks that every index in `0..n` appears exactly once
/// across the two lists. The order inside each list is the segmenter's and
/// is preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundPartition {
    ground: Vec<usize>,
    nonground: Vec<usize>,
}

impl GroundPartition {
    pub fn new(ground: Vec<usize>, nonground: Vec<usize>, n: usize) -> Result<Self> {
        let mut seen = vec![false; n];
        for (label, list) in [("ground", &ground), ("non-ground", &nonground)] {
            for &idx in list {
                if idx >= n {
                    return Err(LidsorError::invalid(format!(
                        "{label} index {idx} out of range for {n} points"
                    )));
                }
                if seen[idx] {
                    return Err(LidsorError::invalid(format!(
                        "index {idx} assigned more than once"
                    )));
                }
                seen[idx] = true;
            }
        }
        if let Some(missing) = seen.iter().position(|&s| !s) {
            return Err(LidsorError::invalid(format!(
                "index {missing} is neither ground nor non-ground"
            )));
        }

        Ok(Self { ground, nonground })
    }

    /// Partition with the given ground indices and everything else, in
    /// ascending order, as non-ground.
    pub fn from_ground(ground: Vec<usize>, n: usize) -> Result<Self> {
        let mut is_ground = vec![false; n];
        for &idx in &ground {
            if idx < n {
                is_ground[idx] = true;
            }
        }
        let nonground = (0..n).filter(|&i| !is_ground[i]).collect();
        Self::new(ground, nonground, n)
    }

    pub fn ground(&self) -> &[usize] {
        &self.ground
    }

    pub fn nonground(&self) -> &[usize] {
        &self.nonground
    }

    /// Number of points covered by the partition.
    pub fn len(&self) -> usize {
        self.ground.len() + self.nonground.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Splits a cloud into ground and non-ground points.
///
/// Implementors may hold any internal state; the pipeline only relies on the
/// returned partition. Closures of the matching shape implement the trait,
/// which makes it easy to plug in an external segmenter's precomputed
/// indices.
pub trait GroundSegmenter {
    fn segment(&self, cloud: &PointCloud) -> Result<GroundPartition>;
}

impl<F> GroundSegmenter for F
where
    F: Fn(&PointCloud) -> Result<GroundPartition>,
{
    fn segment(&self, cloud: &PointCloud) -> Result<GroundPartition> {
        self(cloud)
    }
}

#[cfg(test)]
mod tests {
    use super::{GroundPartition, GroundSegmenter};
    use lidsor_core::{LidsorError, PointCloud};
    use proptest::prelude::*;

    #[test]
    fn accepts_exact_partition() {
        let p = GroundPartition::new(vec![3, 0], vec![1, 2], 4).unwrap();
        assert_eq!(p.ground(), &[3, 0]);
        assert_eq!(p.nonground(), &[1, 2]);
        assert_eq!(p.len(), 4);
    }

    #[test]
    fn rejects_overlap() {
        let err = GroundPartition::new(vec![0, 1], vec![1, 2], 3).unwrap_err();
        assert!(matches!(err, LidsorError::InvalidInput(_)));
        assert!(err.to_string().contains("index 1"));
    }

    #[test]
    fn rejects_missing_index() {
        let err = GroundPartition::new(vec![0], vec![2], 3).unwrap_err();
        assert!(err.to_string().contains("index 1"));
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(GroundPartition::new(vec![0, 5], vec![1], 2).is_err());
    }

    #[test]
    fn empty_partition() {
        let p = GroundPartition::new(vec![], vec![], 0).unwrap();
        assert!(p.is_empty());
    }

    #[test]
    fn from_ground_fills_complement() {
        let p = GroundPartition::from_ground(vec![4, 1], 5).unwrap();
        assert_eq!(p.nonground(), &[0, 2, 3]);
    }

    #[test]
    fn from_ground_rejects_duplicates() {
        assert!(GroundPartition::from_ground(vec![1, 1], 3).is_err());
    }

    #[test]
    fn closures_are_segmenters() {
        let below_zero = |cloud: &PointCloud| {
            let ground = (0..cloud.len()).filter(|&i| cloud.z[i] <= 0.0).collect();
            GroundPartition::from_ground(ground, cloud.len())
        };
        let cloud = PointCloud::from_xyz(vec![0.0; 3], vec![0.0; 3], vec![-1.0, 2.0, 0.0]);
        let p = below_zero.segment(&cloud).unwrap();
        assert_eq!(p.ground(), &[0, 2]);
        assert_eq!(p.nonground(), &[1]);
    }

    proptest! {
        #[test]
        fn from_ground_always_partitions(
            n in 0usize..200,
            picks in prop::collection::vec(0usize..200, 0..100),
        ) {
            let mut ground: Vec<usize> = picks.into_iter().filter(|&i| i < n).collect();
            ground.sort_unstable();
            ground.dedup();
            let p = GroundPartition::from_ground(ground.clone(), n).unwrap();
            prop_assert_eq!(p.len(), n);
            prop_assert_eq!(p.ground(), &ground[..]);
        }
    }
}
