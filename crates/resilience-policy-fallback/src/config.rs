//! Configuration for the fallback service.

use crate::{FallbackEvent, FallbackFn, FallbackLayer, FallbackOutcome, HandlePredicate};
use futures::future::BoxFuture;
use resilience_policy_core::EventListeners;
use std::future::Future;
use std::sync::Arc;

/// Configuration for the fallback service.
pub struct FallbackConfig<Req, Res, E> {
    pub(crate) name: String,
    pub(crate) operation: FallbackFn<Req, Res, E>,
    pub(crate) handle_predicate: Option<HandlePredicate<E>>,
    pub(crate) event_listeners: EventListeners<FallbackEvent>,
}

impl<Req, Res, E> FallbackConfig<Req, Res, E> {
    /// Starts a configuration around the operation substituted on failure.
    ///
    /// The operation receives the original request.
    pub fn builder<F, Fut>(operation: F) -> FallbackConfigBuilder<Req, Res, E>
    where
        F: Fn(Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Res, E>> + Send + 'static,
    {
        FallbackConfigBuilder::new(operation)
    }

    /// Returns true if `error` should be substituted by the fallback.
    pub(crate) fn handles(&self, error: &E) -> bool {
        self.handle_predicate
            .as_ref()
            .map(|p| p(error))
            .unwrap_or(true)
    }

    pub(crate) fn emit(&self, outcome: FallbackOutcome) {
        #[cfg(feature = "metrics")]
        if outcome != FallbackOutcome::Invoked {
            metrics::counter!(
                "fallback_calls_total",
                "fallback" => self.name.clone(),
                "result" => outcome.as_str()
            )
            .increment(1);
        }

        self.event_listeners
            .emit(&FallbackEvent::now(&self.name, outcome));
    }
}

/// Builder for constructing a [`FallbackConfig`].
pub struct FallbackConfigBuilder<Req, Res, E> {
    name: String,
    operation: FallbackFn<Req, Res, E>,
    handle_predicate: Option<HandlePredicate<E>>,
    event_listeners: EventListeners<FallbackEvent>,
}

impl<Req, Res, E> FallbackConfigBuilder<Req, Res, E> {
    /// Creates a new builder around the fallback operation.
    pub fn new<F, Fut>(operation: F) -> Self
    where
        F: Fn(Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Res, E>> + Send + 'static,
    {
        Self {
            name: "fallback".to_string(),
            operation: Arc::new(move |req| -> BoxFuture<'static, Result<Res, E>> {
                Box::pin(operation(req))
            }),
            handle_predicate: None,
            event_listeners: EventListeners::new(),
        }
    }

    /// Sets the name for this fallback instance (used in metrics and events).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Only trigger fallback for errors matching this predicate.
    ///
    /// Errors that don't match the predicate are propagated as-is.
    pub fn handle<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.handle_predicate = Some(Arc::new(predicate));
        self
    }

    /// Registers a callback invoked right before the fallback operation runs.
    pub fn on_fallback<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.event_listeners
            .add(move |event: &FallbackEvent| {
                if event.outcome == FallbackOutcome::Invoked {
                    f();
                }
            });
        self
    }

    /// Adds an event listener.
    pub fn on_event<F>(mut self, listener: F) -> Self
    where
        F: Fn(&FallbackEvent) + Send + Sync + 'static,
    {
        self.event_listeners.add(listener);
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> FallbackConfig<Req, Res, E> {
        FallbackConfig {
            name: self.name,
            operation: self.operation,
            handle_predicate: self.handle_predicate,
            event_listeners: self.event_listeners,
        }
    }

    /// Builds the configuration and wraps it in a layer.
    pub fn layer(self) -> FallbackLayer<Req, Res, E> {
        FallbackLayer::new(self.build())
    }
}
