#![forbid(unsafe_code)]

pub mod cloud;
pub mod error;

pub use cloud::{PointCloud, PointLayout, MAX_COORDINATE};
pub use error::{LidsorError, Result};
