#![forbid(unsafe_code)]

pub mod lidsor;
pub mod params;
pub mod score;
pub mod threshold;

pub use lidsor::{filter, filter_lidsor, LidsorResult};
pub use params::LidsorParams;
pub use score::{pair_distance, score_points};
pub use threshold::ThresholdSummary;
