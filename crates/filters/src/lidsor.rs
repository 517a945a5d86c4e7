use crate::params::LidsorParams;
use crate::score::score_points;
use crate::threshold::ThresholdSummary;
use lidsor_core::{LidsorError, PointCloud, Result};
use lidsor_spatial::KdTree;

/// Output of one LIDSOR invocation.
///
/// `kept_indices` and `removed_indices` are ascending, disjoint, and together
/// cover `0..N`. `kept` holds the input rows at `kept_indices`, in that order
/// and with the input's layout.
#[derive(Debug, Clone, PartialEq)]
pub struct LidsorResult {
    pub kept: PointCloud,
    pub kept_indices: Vec<usize>,
    pub removed_indices: Vec<usize>,
    /// Statistics of the scored points, `None` when nothing was scored.
    pub summary: Option<ThresholdSummary>,
}

impl LidsorResult {
    fn empty(layout_source: &PointCloud) -> Self {
        Self {
            kept: layout_source.select(&[]),
            kept_indices: Vec::new(),
            removed_indices: Vec::new(),
            summary: None,
        }
    }

    /// Total number of input points accounted for.
    pub fn len(&self) -> usize {
        self.kept_indices.len() + self.removed_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Statistical k-NN outlier removal with the plain global threshold.
///
/// Shorthand for [`filter_lidsor`] with only `k`, `s` and `scaling_factor`
/// set.
pub fn filter(cloud: &PointCloud, k: usize, s: f32, scaling_factor: f32) -> Result<LidsorResult> {
    let params = LidsorParams::new(k, s).with_scaling_factor(scaling_factor);
    filter_lidsor(cloud, &params)
}

/// Run the LIDSOR filter over `cloud`.
///
/// # Algorithm
///
/// 1. Validate parameters and reject non-finite or out-of-range input.
/// 2. Split off points at or beyond `max_range` (if set); they are kept
///    without scoring.
/// 3. Build a KdTree over the remaining points.
/// 4. Score each point by its mean distance to its `k` nearest neighbors,
///    in parallel.
/// 5. Reduce the scores to `mean`, population `std_dev` and
///    `tau = mean + s * std_dev`.
/// 6. Keep a point if its score is `<= tau` (or `<= tau * range_multiplier
///    * range` when set), or if its intensity reaches `intensity_rescue`.
///
/// # Errors
///
/// - [`LidsorError::InvalidInput`] for bad parameters, non-finite values,
///   or coordinates beyond [`lidsor_core::MAX_COORDINATE`].
/// - [`LidsorError::InsufficientPoints`] when the number of scored points
///   is non-zero but not larger than `k`.
///
/// An empty cloud returns an empty result.
pub fn filter_lidsor(cloud: &PointCloud, params: &LidsorParams) -> Result<LidsorResult> {
    params.validate()?;
    cloud.validate_values()?;

    let n = cloud.len();
    if n > u32::MAX as usize {
        return Err(LidsorError::invalid(format!(
            "cloud of {n} points exceeds the index limit of {}",
            u32::MAX
        )));
    }
    if n == 0 {
        return Ok(LidsorResult::empty(cloud));
    }

    let scored: Vec<usize> = match params.max_range {
        Some(max_range) => (0..n).filter(|&i| cloud.range(i) < max_range).collect(),
        None => (0..n).collect(),
    };
    let m = scored.len();
    if m > 0 && m <= params.k {
        return Err(LidsorError::InsufficientPoints { k: params.k, n: m });
    }

    // Bypassed points are kept unconditionally.
    let mut keep = vec![true; n];
    let mut summary = None;

    if m > 0 {
        let subset = if m == n {
            None
        } else {
            Some(cloud.select(&scored))
        };
        let subset_ref = subset.as_ref().unwrap_or(cloud);

        let tree = KdTree::build(subset_ref);
        log::debug!("indexed {m} of {n} points");

        let scores = score_points(subset_ref, &tree, params.k, params.scaling_factor);
        log::debug!("scored {} points with k={}", scores.len(), params.k);

        // An empty score list leaves every point kept, so the partition
        // stays complete.
        if let Some(stats) = ThresholdSummary::from_scores(&scores, params.std_multiplier) {
            log::debug!(
                "mean={:.6} std_dev={:.6} threshold={:.6}",
                stats.mean,
                stats.std_dev,
                stats.threshold
            );

            let rescue = params
                .intensity_rescue
                .and_then(|t| cloud.intensity.as_deref().map(|it| (t, it)));

            for (j, &i) in scored.iter().enumerate() {
                let inlier = match params.range_multiplier {
                    Some(mult) => stats.accepts_at_range(scores[j], mult, cloud.range(i)),
                    None => stats.accepts(scores[j]),
                };
                let rescued = rescue.is_some_and(|(t, it)| it[i].abs() >= t);
                keep[i] = inlier || rescued;
            }
            summary = Some(stats);
        }
    }

    let (kept_indices, removed_indices): (Vec<usize>, Vec<usize>) =
        (0..n).partition(|&i| keep[i]);

    log::info!(
        "LIDSOR kept {} of {} points ({} removed)",
        kept_indices.len(),
        n,
        removed_indices.len()
    );

    Ok(LidsorResult {
        kept: cloud.select(&kept_indices),
        kept_indices,
        removed_indices,
        summary,
    })
}
