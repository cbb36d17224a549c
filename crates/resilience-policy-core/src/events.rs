//! Listener plumbing shared by the breaker, retry and fallback layers.
//!
//! Each pattern defines its own event enum and keeps an [`EventListeners`]
//! in its configuration. Builder callbacks such as `on_retry` or
//! `on_state_transition` register a closure that picks out the events it
//! cares about; the policy executor uses the same hooks to write its logger
//! notifications.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

/// An event emitted by one of the resilience patterns.
pub trait ResilienceEvent: Send + Sync + fmt::Debug {
    /// Short snake-case name of the event, stable for logs and tests.
    fn event_type(&self) -> &'static str;

    /// When the event occurred.
    fn timestamp(&self) -> Instant;

    /// Name of the pattern instance that emitted the event.
    fn pattern_name(&self) -> &str;
}

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Callbacks registered on a pattern configuration.
///
/// Cloning is cheap; every service built from a configuration shares its
/// listeners.
pub struct EventListeners<E> {
    listeners: Vec<Listener<E>>,
}

impl<E: ResilienceEvent> EventListeners<E> {
    /// Creates an empty set of listeners.
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Registers a callback for every event.
    pub fn add<F>(&mut self, listener: F)
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.listeners.push(Arc::new(listener));
    }

    /// Calls every listener with `event`, in registration order.
    ///
    /// A panicking listener is skipped; the remaining listeners still run and
    /// the observed call is unaffected.
    pub fn emit(&self, event: &E) {
        for listener in &self.listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    pattern = event.pattern_name(),
                    event = event.event_type(),
                    "event listener panicked"
                );
            }
        }
    }
}

impl<E: ResilienceEvent> Default for EventListeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for EventListeners<E> {
    fn clone(&self) -> Self {
        Self {
            listeners: self.listeners.clone(),
        }
    }
}

impl<E> fmt::Debug for EventListeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListeners")
            .field("count", &self.listeners.len())
            .finish()
    }
}
