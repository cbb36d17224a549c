//! Run fallible async operations under a named resilience strategy.
//!
//! A [`PolicyExecutor`] combines three behaviors:
//!
//! - **Retry**: re-invokes a failing operation up to a fixed number of times
//! - **Circuit breaker**: after consecutive failures, rejects calls for a
//!   break period without invoking the operation
//! - **Fallback**: substitutes an alternative operation when everything
//!   inside it fails
//!
//! Which behaviors apply is chosen per call with a [`Strategy`]. The circuit
//! breaker is owned by the executor and shared by all calls and clones;
//! retry and fallback are scoped to one call.
//!
//! ```rust
//! use resilience_policy::{operation, PolicyExecutor, Strategy};
//! use resilience_policy_core::MemoryLogger;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let logger = Arc::new(MemoryLogger::new());
//! let executor = PolicyExecutor::builder()
//!     .shared_logger(logger.clone())
//!     .build();
//!
//! let primary = operation(|| async { Err::<&str, _>("unavailable") });
//! let fallback = operation(|| async { Ok("cached") });
//!
//! let value = executor
//!     .get_with_policy(Strategy::RetryWithFallback, primary, Some(fallback))
//!     .await
//!     .unwrap();
//!
//! assert_eq!(value, "cached");
//! assert!(logger.contains("FallbackPolicy invoked"));
//! # }
//! ```
//!
//! ## Logger notifications
//!
//! The executor writes to its [`PolicyLogger`]:
//! - `"RetryPolicy invoked"` before each retry
//! - `"FallbackPolicy invoked"` before the fallback operation runs
//! - `"Breaking circuit"` each time the circuit opens
//!
//! ## Feature Flags
//! - `tracing`: pattern tracing and [`TracingLogger`](resilience_policy_core::TracingLogger)
//! - `metrics`: Prometheus metrics from every pattern
//! - `serde`: `Serialize`/`Deserialize` for [`Strategy`] and circuit state

mod config;
mod executor;
mod operation;
mod strategy;

pub use config::{PolicyExecutorConfig, PolicyExecutorConfigBuilder};
pub use executor::PolicyExecutor;
pub use operation::{operation, Operation};
pub use strategy::{Behaviors, ParseStrategyError, Strategy};

pub use resilience_policy_circuitbreaker::{
    CircuitBreaker, CircuitMetrics, CircuitState, DEFAULT_BREAK_DURATION,
    DEFAULT_FAILURE_THRESHOLD,
};
pub use resilience_policy_core::{
    MemoryLogger, NoopLogger, PolicyError, PolicyLogger, SharedLogger, BREAKING_CIRCUIT,
    FALLBACK_INVOKED, RETRY_INVOKED,
};
pub use resilience_policy_retry::{Backoff, DEFAULT_MAX_RETRIES};
