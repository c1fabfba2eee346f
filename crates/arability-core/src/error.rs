//! Error types for the arability pipeline.

use thiserror::Error;

/// Failures surfaced by [`compute_arability`](crate::compute_arability).
///
/// An empty observation set or a boundary with no classified area is not
/// an error; it yields a result with every tracked class at 0.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArabilityError {
    /// Malformed caller input, detected before the provider is queried.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The raster provider could not be reached or returned a fault.
    #[error("raster provider unavailable: {0}")]
    ProviderUnavailable(String),
}

impl ArabilityError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        ArabilityError::InvalidRequest(msg.into())
    }

    pub(crate) fn provider(msg: impl Into<String>) -> Self {
        ArabilityError::ProviderUnavailable(msg.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ArabilityError>;
