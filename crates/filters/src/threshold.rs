use serde::{Deserialize, Serialize};

/// Global statistics of the per-point scores and the derived cut-off.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSummary {
    pub mean: f64,
    /// Population standard deviation (divides by N).
    pub std_dev: f64,
    /// `mean + s * std_dev`
    pub threshold: f64,
}

impl ThresholdSummary {
    /// Reduce the scores to mean, standard deviation and threshold.
    ///
    /// Returns `None` for an empty slice. Sums run sequentially in input
    /// order so the result does not depend on thread scheduling. When every
    /// score is identical the mean is that score and the deviation is
    /// exactly zero, so every point passes regardless of `s`.
    pub fn from_scores(scores: &[f64], std_multiplier: f32) -> Option<Self> {
        let first = *scores.first()?;
        let s = std_multiplier as f64;

        if scores.iter().all(|&d| d == first) {
            return Some(Self {
                mean: first,
                std_dev: 0.0,
                threshold: first,
            });
        }

        let n = scores.len() as f64;
        let mean = scores.iter().sum::<f64>() / n;
        let variance = scores.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt();

        Some(Self {
            mean,
            std_dev,
            threshold: mean + s * std_dev,
        })
    }

    /// Whether `score` is an inlier. The boundary is inclusive.
    #[inline]
    pub fn accepts(&self, score: f64) -> bool {
        score <= self.threshold
    }

    /// Like [`accepts`](Self::accepts) with the threshold stretched by
    /// `range_multiplier * range`.
    #[inline]
    pub fn accepts_at_range(&self, score: f64, range_multiplier: f32, range: f32) -> bool {
        score <= self.threshold * range_multiplier as f64 * range as f64
    }
}
