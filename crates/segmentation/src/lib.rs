#![forbid(unsafe_code)]

pub mod ground;
pub mod pipeline;
pub mod ransac_ground;

pub use ground::{GroundPartition, GroundSegmenter};
pub use pipeline::{segment_and_filter, MergedCloud};
pub use ransac_ground::{PlaneModel, RansacGround, RansacGroundConfig};
