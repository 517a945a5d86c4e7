use crate::ground::{GroundPartition, GroundSegmenter};
use lidsor_core::{LidsorError, PointCloud, Result};
use lidsor_filters::{filter_lidsor, LidsorParams, LidsorResult};

/// Ground rows merged with the filtered non-ground rows.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedCloud {
    /// Ground rows in segmenter order, then kept non-ground rows in input
    /// order.
    pub merged: PointCloud,
    pub partition: GroundPartition,
    /// Filter output over the non-ground subset. Its indices refer to
    /// positions within `partition.nonground()`.
    pub filtered: LidsorResult,
}

impl MergedCloud {
    /// Input indices of the non-ground points the filter removed.
    pub fn removed_input_indices(&self) -> Vec<usize> {
        let nonground = self.partition.nonground();
        self.filtered
            .removed_indices
            .iter()
            .map(|&j| nonground[j])
            .collect()
    }

    /// Input indices of every merged row, in merged-row order.
    pub fn merged_input_indices(&self) -> Vec<usize> {
        let nonground = self.partition.nonground();
        self.partition
            .ground()
            .iter()
            .copied()
            .chain(self.filtered.kept_indices.iter().map(|&j| nonground[j]))
            .collect()
    }
}

/// Segment the ground, filter only the non-ground points, and merge.
///
/// Ground points pass through untouched. The filter's own errors propagate,
/// including [`LidsorError::InsufficientPoints`] when the non-ground subset
/// is non-empty but no larger than `k`.
pub fn segment_and_filter<S>(
    cloud: &PointCloud,
    segmenter: &S,
    params: &LidsorParams,
) -> Result<MergedCloud>
where
    S: GroundSegmenter + ?Sized,
{
    cloud.validate_values()?;
    params.validate()?;

    let partition = segmenter.segment(cloud)?;
    if partition.len() != cloud.len() {
        return Err(LidsorError::invalid(format!(
            "segmenter partitioned {} points for a cloud of {}",
            partition.len(),
            cloud.len()
        )));
    }
    log::debug!(
        "ground={} non-ground={}",
        partition.ground().len(),
        partition.nonground().len()
    );

    let ground = cloud.select(partition.ground());
    let nonground = cloud.select(partition.nonground());
    let filtered = filter_lidsor(&nonground, params)?;
    let merged = ground.concat(&filtered.kept)?;

    log::info!(
        "merged {} ground + {} kept non-ground points ({} removed)",
        ground.len(),
        filtered.kept_indices.len(),
        filtered.removed_indices.len()
    );

    Ok(MergedCloud {
        merged,
        partition,
        filtered,
    })
}
