use thiserror::Error;

// -----------------------------------------------------------------------------
// Error

/// Errors raised while building a [`BravoData`](crate::BravoData).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum BuildError {
    #[error("no override resolver was configured")]
    MissingResolver,
}
