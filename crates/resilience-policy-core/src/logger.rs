//! The logging capability reported to by the policy executor.
//!
//! The executor only needs to "write a message". Every resilience event it
//! reports uses one of the literal notification strings below so callers and
//! tests can observe behavior without depending on a concrete sink.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// Written before every retry attempt.
pub const RETRY_INVOKED: &str = "RetryPolicy invoked";

/// Written when the fallback operation is about to substitute a failure.
pub const FALLBACK_INVOKED: &str = "FallbackPolicy invoked";

/// Written each time the circuit breaker transitions into the open state.
pub const BREAKING_CIRCUIT: &str = "Breaking circuit";

/// A sink for policy notifications.
pub trait PolicyLogger: Send + Sync {
    /// Writes a single message.
    fn write(&self, message: &str);
}

/// Shared, type-erased logger handle.
pub type SharedLogger = Arc<dyn PolicyLogger>;

impl<L: PolicyLogger + ?Sized> PolicyLogger for Arc<L> {
    fn write(&self, message: &str) {
        (**self).write(message)
    }
}

/// Discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl PolicyLogger for NoopLogger {
    fn write(&self, _message: &str) {}
}

/// Adapts a closure into a [`PolicyLogger`].
pub struct FnLogger<F>(F);

impl<F> FnLogger<F>
where
    F: Fn(&str) + Send + Sync,
{
    /// Creates a logger that calls `f` for every message.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> PolicyLogger for FnLogger<F>
where
    F: Fn(&str) + Send + Sync,
{
    fn write(&self, message: &str) {
        (self.0)(message)
    }
}

impl<F> fmt::Debug for FnLogger<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnLogger").finish_non_exhaustive()
    }
}

/// Records messages in memory.
///
/// Clones share the same buffer, so a clone can be handed to an executor
/// while the original is kept for assertions.
///
/// ```rust
/// use resilience_policy_core::{MemoryLogger, PolicyLogger, RETRY_INVOKED};
///
/// let logger = MemoryLogger::new();
/// logger.write(RETRY_INVOKED);
/// logger.write("something else");
///
/// assert_eq!(logger.count(RETRY_INVOKED), 1);
/// assert_eq!(logger.messages().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryLogger {
    messages: Arc<Mutex<Vec<String>>>,
}

impl MemoryLogger {
    /// Creates an empty logger.
    pub fn new() -> Self {
        Self::default()
    }

    // A panicking writer elsewhere must not hide messages from assertions.
    fn buffer(&self) -> MutexGuard<'_, Vec<String>> {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns a copy of every message written so far, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.buffer().clone()
    }

    /// Counts the messages containing `needle`.
    pub fn count(&self, needle: &str) -> usize {
        self.buffer().iter().filter(|m| m.contains(needle)).count()
    }

    /// Returns true if any message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.count(needle) > 0
    }

    /// Forgets every recorded message.
    pub fn clear(&self) {
        self.buffer().clear();
    }
}

impl PolicyLogger for MemoryLogger {
    fn write(&self, message: &str) {
        self.buffer().push(message.to_string());
    }
}

/// Forwards messages to the `tracing` crate at `INFO` level.
#[cfg(feature = "tracing")]
#[derive(Debug, Clone, Default)]
pub struct TracingLogger {
    name: Option<String>,
}

#[cfg(feature = "tracing")]
impl TracingLogger {
    /// Creates a logger without a name field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a logger that tags every message with `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

#[cfg(feature = "tracing")]
impl PolicyLogger for TracingLogger {
    fn write(&self, message: &str) {
        match &self.name {
            Some(name) => tracing::info!(target: "resilience_policy", policy = %name, "{}", message),
            None => tracing::info!(target: "resilience_policy", "{}", message),
        }
    }
}
