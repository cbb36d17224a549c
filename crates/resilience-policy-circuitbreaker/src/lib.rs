//! Consecutive-failure circuit breaker for async operations.
//!
//! A circuit breaker stops invoking an operation that keeps failing, giving
//! the dependency behind it time to recover.
//!
//! ## States
//! - **Closed**: calls pass through; consecutive failures are counted
//! - **Open**: the failure threshold was reached; calls are rejected with
//!   [`CircuitBreakerError::OpenCircuit`] without invoking the operation
//! - **Half-Open**: the break duration elapsed; one trial call is let through.
//!   Success closes the circuit, failure opens it again for a full break.
//!
//! ## Usage
//!
//! A [`CircuitBreaker`] is a cheap, cloneable handle. Clones share the same
//! circuit, so one breaker can guard every call to a dependency:
//!
//! ```rust
//! use resilience_policy_circuitbreaker::{CircuitBreakerConfig, CircuitState};
//! use std::time::Duration;
//!
//! # async fn example() {
//! let breaker = CircuitBreakerConfig::builder()
//!     .failure_threshold(5)
//!     .break_duration(Duration::from_secs(30))
//!     .name("inventory")
//!     .build();
//!
//! let result = breaker
//!     .execute(|| async { Ok::<_, std::io::Error>("in stock") })
//!     .await;
//!
//! assert_eq!(result.unwrap(), "in stock");
//! assert_eq!(breaker.state().await, CircuitState::Closed);
//! # }
//! ```
//!
//! ### As a Tower layer
//!
//! ```rust
//! use resilience_policy_circuitbreaker::CircuitBreakerConfig;
//! use tower::{ServiceBuilder, service_fn};
//!
//! let breaker = CircuitBreakerConfig::builder().failure_threshold(3).build();
//!
//! let service = ServiceBuilder::new()
//!     .layer(breaker.layer())
//!     .service(service_fn(|req: String| async move { Ok::<_, std::io::Error>(req) }));
//! ```
//!
//! ## Feature Flags
//! - `metrics`: records `circuitbreaker_calls_total`,
//!   `circuitbreaker_transitions_total` and `circuitbreaker_state`
//! - `tracing`: logs state transitions and rejected calls
//! - `serde`: enables `Serialize`/`Deserialize` for `CircuitState` and `CircuitMetrics`

use crate::circuit::Circuit;
#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter, describe_gauge};
use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
#[cfg(feature = "metrics")]
use std::sync::Once;
use tokio::sync::Mutex;

pub use circuit::{CircuitMetrics, CircuitState};
pub use config::{
    CircuitBreakerConfig, CircuitBreakerConfigBuilder, DEFAULT_BREAK_DURATION,
    DEFAULT_FAILURE_THRESHOLD,
};
pub use error::CircuitBreakerError;
pub use events::CircuitBreakerEvent;
pub use layer::{CircuitBreakerLayer, CircuitBreakerService};

mod circuit;
mod config;
mod error;
mod events;
mod layer;

#[cfg(feature = "metrics")]
static METRICS_INIT: Once = Once::new();

/// Gates execution of operations based on their recent failure history.
///
/// The circuit's counter, state and transition timestamp live behind a
/// mutex shared by every clone of the handle.
pub struct CircuitBreaker {
    circuit: Arc<Mutex<Circuit>>,
    state_atomic: Arc<AtomicU8>,
    config: Arc<CircuitBreakerConfig>,
}

impl CircuitBreaker {
    /// Creates a closed circuit breaker from the given configuration.
    pub fn new(config: CircuitBreakerConfig) -> Self {
        #[cfg(feature = "metrics")]
        METRICS_INIT.call_once(|| {
            describe_counter!(
                "circuitbreaker_calls_total",
                "Total number of calls through the circuit breaker"
            );
            describe_counter!(
                "circuitbreaker_transitions_total",
                "Total number of circuit breaker state transitions"
            );
            describe_gauge!(
                "circuitbreaker_state",
                "Current state of the circuit breaker (0 closed, 1 open, 2 half-open)"
            );
        });

        let state_atomic = Arc::new(AtomicU8::new(CircuitState::Closed as u8));
        Self {
            circuit: Arc::new(Mutex::new(Circuit::new(Arc::clone(&state_atomic)))),
            state_atomic,
            config: Arc::new(config),
        }
    }

    /// Returns a new configuration builder.
    pub fn builder() -> CircuitBreakerConfigBuilder {
        CircuitBreakerConfigBuilder::new()
    }

    /// Runs `operation` through the breaker.
    ///
    /// While the circuit is open the operation is not invoked and
    /// [`CircuitBreakerError::OpenCircuit`] is returned. Otherwise the
    /// operation runs and its outcome is recorded: success closes the circuit
    /// and clears the failure count, failure counts toward the threshold.
    /// An outcome only counts against the state that admitted the call: a
    /// slow call that finishes after the circuit has changed state, or a
    /// half-open trial that has been superseded, leaves the circuit as it is.
    /// The operation's own error is returned as
    /// [`CircuitBreakerError::Inner`].
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let permit = {
            let mut circuit = self.circuit.lock().await;
            circuit.try_acquire(&self.config)
        };

        let Some(permit) = permit else {
            #[cfg(feature = "tracing")]
            tracing::trace!(breaker = %self.config.name, "circuit breaker rejected call (circuit open)");

            #[cfg(feature = "metrics")]
            counter!("circuitbreaker_calls_total", "circuitbreaker" => self.config.name.clone(), "outcome" => "rejected").increment(1);

            return Err(CircuitBreakerError::OpenCircuit);
        };

        #[cfg(feature = "tracing")]
        tracing::trace!(breaker = %self.config.name, "circuit breaker permitted call");

        let result = operation().await;

        let mut circuit = self.circuit.lock().await;
        match &result {
            Ok(_) => circuit.record_success(permit, &self.config),
            Err(_) => circuit.record_failure(permit, &self.config),
        }

        result.map_err(CircuitBreakerError::Inner)
    }

    /// Returns a Tower layer whose services share this breaker's circuit.
    pub fn layer(&self) -> CircuitBreakerLayer {
        CircuitBreakerLayer::new(self.clone())
    }

    /// Forces the circuit open until [`reset`](Self::reset) is called.
    pub async fn force_open(&self) {
        let mut circuit = self.circuit.lock().await;
        circuit.force_open(&self.config);
    }

    /// Closes the circuit and clears the failure count.
    pub async fn reset(&self) {
        let mut circuit = self.circuit.lock().await;
        circuit.reset(&self.config);
    }

    /// Returns the current state of the circuit.
    pub async fn state(&self) -> CircuitState {
        let circuit = self.circuit.lock().await;
        circuit.state()
    }

    /// Returns the current state of the circuit without requiring async context.
    pub fn state_sync(&self) -> CircuitState {
        CircuitState::from_u8(self.state_atomic.load(Ordering::Acquire))
    }

    /// Returns whether the circuit is currently open.
    pub fn is_open(&self) -> bool {
        self.state_sync() == CircuitState::Open
    }

    /// Returns a snapshot of the circuit's counters.
    pub async fn metrics(&self) -> CircuitMetrics {
        let circuit = self.circuit.lock().await;
        circuit.metrics()
    }

    /// Returns the configuration this breaker was built with.
    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }
}

impl Clone for CircuitBreaker {
    fn clone(&self) -> Self {
        Self {
            circuit: Arc::clone(&self.circuit),
            state_atomic: Arc::clone(&self.state_atomic),
            config: Arc::clone(&self.config),
        }
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.config.name)
            .field("state", &self.state_sync())
            .finish()
    }
}
