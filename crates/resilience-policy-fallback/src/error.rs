//! Error types for the fallback service.

use thiserror::Error;

/// Error type for the fallback service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FallbackError<E> {
    /// The inner service failed and the error did not match the fallback
    /// predicate, so it was propagated as-is.
    #[error("inner service error: {0}")]
    Inner(E),

    /// The fallback operation itself failed.
    #[error("fallback failed: {0}")]
    FallbackFailed(E),
}

impl<E> FallbackError<E> {
    /// Returns `true` if this is an inner service error.
    pub fn is_inner(&self) -> bool {
        matches!(self, Self::Inner(_))
    }

    /// Returns `true` if the fallback itself failed.
    pub fn is_fallback_failed(&self) -> bool {
        matches!(self, Self::FallbackFailed(_))
    }

    /// Converts into the wrapped error.
    pub fn into_inner(self) -> E {
        match self {
            Self::Inner(e) | Self::FallbackFailed(e) => e,
        }
    }

    /// Returns a reference to the wrapped error.
    pub fn inner(&self) -> &E {
        match self {
            Self::Inner(e) | Self::FallbackFailed(e) => e,
        }
    }
}
