//! Core infrastructure for resilience-policy.
//!
//! This crate provides functionality shared by every resilience pattern:
//! - Event system for observability
//! - The [`PolicyLogger`] capability the policy executor reports to
//! - The unified [`PolicyError`] returned to callers

pub mod error;
pub mod events;
pub mod logger;

pub use error::PolicyError;
pub use events::{EventListeners, ResilienceEvent};
#[cfg(feature = "tracing")]
pub use logger::TracingLogger;
pub use logger::{
    FnLogger, MemoryLogger, NoopLogger, PolicyLogger, SharedLogger, BREAKING_CIRCUIT,
    FALLBACK_INVOKED, RETRY_INVOKED,
};
