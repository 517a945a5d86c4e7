use thiserror::Error;

/// Errors raised by the LIDSOR pipeline.
///
/// Every variant is produced during validation, before any spatial index is
/// built. A cloud whose neighbor statistics all coincide (zero standard
/// deviation) is a valid input and never yields an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LidsorError {
    /// Malformed points or parameters: wrong column count, ragged buffer,
    /// non-finite coordinate, negative parameter, or a broken partition.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Not enough points to satisfy a `k`-neighborhood for every point.
    #[error("insufficient points: k={k} >= N={n}")]
    InsufficientPoints { k: usize, n: usize },
}

impl LidsorError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

pub type Result<T, E = LidsorError> = std::result::Result<T, E>;
