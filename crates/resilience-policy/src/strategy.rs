//! Strategy identifiers and the behaviors they enable.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Selects which resilience behaviors apply to a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Strategy {
    /// Execute the primary operation directly.
    None,
    /// Retry only.
    Retry,
    /// Fallback only.
    Fallback,
    /// Retry, then fallback once retries are exhausted.
    RetryWithFallback,
    /// Circuit breaker only.
    CircuitBreaker,
    /// Circuit breaker, then fallback if the call fails or the circuit is open.
    CircuitBreakerWithFallback,
    /// Retry guarded by the circuit breaker, then fallback.
    CircuitBreakerWithRetryAndFallback,
}

/// The set of behaviors a [`Strategy`] enables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Behaviors {
    /// Re-invoke the primary operation on failure.
    pub retry: bool,
    /// Route the call through the executor's circuit breaker.
    pub circuit_breaker: bool,
    /// Substitute the fallback operation when everything inside fails.
    pub fallback: bool,
}

impl Behaviors {
    const fn new(retry: bool, circuit_breaker: bool, fallback: bool) -> Self {
        Self {
            retry,
            circuit_breaker,
            fallback,
        }
    }

    /// Returns true if no behavior is enabled.
    pub fn is_empty(&self) -> bool {
        !(self.retry || self.circuit_breaker || self.fallback)
    }
}

impl Strategy {
    /// Every strategy, in declaration order.
    pub const ALL: [Strategy; 7] = [
        Strategy::None,
        Strategy::Retry,
        Strategy::Fallback,
        Strategy::RetryWithFallback,
        Strategy::CircuitBreaker,
        Strategy::CircuitBreakerWithFallback,
        Strategy::CircuitBreakerWithRetryAndFallback,
    ];

    /// Returns the behaviors this strategy enables.
    pub const fn behaviors(self) -> Behaviors {
        match self {
            Strategy::None => Behaviors::new(false, false, false),
            Strategy::Retry => Behaviors::new(true, false, false),
            Strategy::Fallback => Behaviors::new(false, false, true),
            Strategy::RetryWithFallback => Behaviors::new(true, false, true),
            Strategy::CircuitBreaker => Behaviors::new(false, true, false),
            Strategy::CircuitBreakerWithFallback => Behaviors::new(false, true, true),
            Strategy::CircuitBreakerWithRetryAndFallback => Behaviors::new(true, true, true),
        }
    }

    /// Returns true if calls with this strategy must supply a fallback operation.
    pub const fn requires_fallback(self) -> bool {
        self.behaviors().fallback
    }

    /// Returns the identifier of this strategy.
    pub const fn as_str(self) -> &'static str {
        match self {
            Strategy::None => "None",
            Strategy::Retry => "Retry",
            Strategy::Fallback => "Fallback",
            Strategy::RetryWithFallback => "RetryWithFallback",
            Strategy::CircuitBreaker => "CircuitBreaker",
            Strategy::CircuitBreakerWithFallback => "CircuitBreakerWithFallback",
            Strategy::CircuitBreakerWithRetryAndFallback => "CircuitBreakerWithRetryAndFallback",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown strategy identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown strategy `{0}`")]
pub struct ParseStrategyError(String);

impl FromStr for Strategy {
    type Err = ParseStrategyError;

    /// Parses an identifier, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseStrategyError(s.to_string()))
    }
}
