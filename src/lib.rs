//! Statistical k-nearest-neighbor outlier removal for LiDAR point clouds.
//!
//! Each point is scored by the mean distance to its `k` nearest neighbors,
//! optionally folding in intensity differences. Points whose score exceeds
//! `mean + s * std_dev` over the whole cloud are removed.
//!
//! ```no_run
//! use lidsor::{filter_lidsor, LidsorParams, PointCloud};
//!
//! let cloud = PointCloud::from_rows(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], 3)?;
//! let result = filter_lidsor(&cloud, &LidsorParams::new(1, 2.0))?;
//! println!("kept {} of {}", result.kept.len(), cloud.len());
//! # Ok::<(), lidsor::LidsorError>(())
//! ```
#![forbid(unsafe_code)]

pub mod config;

pub use config::{ConfigError, LidsorConfig};
pub use lidsor_core::{LidsorError, PointCloud, PointLayout, Result, MAX_COORDINATE};
pub use lidsor_filters::{
    filter, filter_lidsor, pair_distance, score_points, LidsorParams, LidsorResult,
    ThresholdSummary,
};
pub use lidsor_segmentation::{
    segment_and_filter, GroundPartition, GroundSegmenter, MergedCloud, PlaneModel, RansacGround,
    RansacGroundConfig,
};
pub use lidsor_spatial::{KdTree, Neighbor};
