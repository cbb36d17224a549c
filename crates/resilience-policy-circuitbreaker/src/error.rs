use resilience_policy_core::PolicyError;
use thiserror::Error;

/// Errors returned by the circuit breaker.
#[derive(Debug, Error)]
pub enum CircuitBreakerError<E> {
    /// The circuit is open; calls are not permitted.
    #[error("circuit is open; call not permitted")]
    OpenCircuit,

    /// An error returned by the guarded operation.
    #[error("inner service error: {0}")]
    Inner(E),
}

impl<E> CircuitBreakerError<E> {
    /// Returns true if the error indicates the circuit is open.
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, CircuitBreakerError::OpenCircuit)
    }

    /// Returns the inner error if present.
    pub fn into_inner(self) -> Option<E> {
        match self {
            CircuitBreakerError::Inner(e) => Some(e),
            _ => None,
        }
    }
}

impl<E> CircuitBreakerError<PolicyError<E>> {
    /// Flattens a breaker error around a policy error into a single policy error.
    pub fn into_policy_error(self) -> PolicyError<E> {
        match self {
            CircuitBreakerError::OpenCircuit => PolicyError::CircuitOpen,
            CircuitBreakerError::Inner(e) => e,
        }
    }
}

impl<E> From<E> for CircuitBreakerError<E> {
    fn from(err: E) -> Self {
        CircuitBreakerError::Inner(err)
    }
}
