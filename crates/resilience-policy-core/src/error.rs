//! The error type returned by policy execution.
//!
//! [`PolicyError`] separates the three ways a protected call can fail:
//!
//! - [`PolicyError::InvalidArgument`]: the caller broke the call contract
//!   (for example a fallback-enabled strategy without a fallback operation).
//!   Raised before anything is executed.
//! - [`PolicyError::CircuitOpen`]: the circuit breaker rejected the call
//!   without invoking the operation.
//! - [`PolicyError::Operation`]: the primary or fallback operation itself
//!   failed. The operation's error is carried unchanged.
//!
//! ```rust
//! use resilience_policy_core::PolicyError;
//!
//! # #[derive(Debug)]
//! # struct AppError;
//! # impl std::fmt::Display for AppError {
//! #     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "app") }
//! # }
//! fn describe(error: &PolicyError<AppError>) -> &'static str {
//!     match error {
//!         PolicyError::InvalidArgument { .. } => "caller bug",
//!         PolicyError::CircuitOpen => "downstream unhealthy",
//!         PolicyError::Operation(_) => "operation failed",
//!     }
//! }
//! ```

use thiserror::Error;

/// Errors surfaced to the caller of a policy-protected operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError<E> {
    /// The call contract was violated; nothing was executed.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with the call.
        reason: &'static str,
    },

    /// The circuit breaker is open and rejected the call.
    #[error("circuit is open; call not permitted")]
    CircuitOpen,

    /// The wrapped operation (primary or fallback) failed.
    #[error("{0}")]
    Operation(E),
}

impl<E> PolicyError<E> {
    /// Returns true if the call was rejected for a contract violation.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, PolicyError::InvalidArgument { .. })
    }

    /// Returns true if the circuit breaker rejected the call.
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, PolicyError::CircuitOpen)
    }

    /// Returns true if the error came from the operation itself.
    pub fn is_operation(&self) -> bool {
        matches!(self, PolicyError::Operation(_))
    }

    /// Returns a reference to the operation's error, if any.
    pub fn operation_error(&self) -> Option<&E> {
        match self {
            PolicyError::Operation(e) => Some(e),
            _ => None,
        }
    }

    /// Consumes the error, returning the operation's error if any.
    pub fn into_operation_error(self) -> Option<E> {
        match self {
            PolicyError::Operation(e) => Some(e),
            _ => None,
        }
    }

    /// Maps the operation's error, leaving the other variants untouched.
    pub fn map_operation<F, U>(self, f: F) -> PolicyError<U>
    where
        F: FnOnce(E) -> U,
    {
        match self {
            PolicyError::InvalidArgument { reason } => PolicyError::InvalidArgument { reason },
            PolicyError::CircuitOpen => PolicyError::CircuitOpen,
            PolicyError::Operation(e) => PolicyError::Operation(f(e)),
        }
    }
}

impl<E> From<E> for PolicyError<E> {
    fn from(err: E) -> Self {
        PolicyError::Operation(err)
    }
}
