use crate::backoff::Backoff;
use crate::events::RetryEvent;
use crate::layer::RetryLayer;
use resilience_policy_core::events::EventListeners;
use std::sync::Arc;
use std::time::Duration;

/// Retries made after the initial attempt unless configured otherwise.
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// Predicate deciding whether an error is worth retrying.
pub type RetryPredicate<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Configuration for the retry middleware.
pub struct RetryConfig<E> {
    pub(crate) max_retries: usize,
    pub(crate) backoff: Backoff,
    pub(crate) retry_predicate: Option<RetryPredicate<E>>,
    pub(crate) event_listeners: EventListeners<RetryEvent>,
    pub(crate) name: String,
}

impl<E> RetryConfig<E> {
    /// Creates a new configuration builder.
    pub fn builder() -> RetryConfigBuilder<E> {
        RetryConfigBuilder::new()
    }

    /// Retries allowed after the initial attempt.
    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    /// Returns true if `error` should be retried.
    pub fn should_retry(&self, error: &E) -> bool {
        self.retry_predicate
            .as_ref()
            .map(|predicate| predicate(error))
            .unwrap_or(true)
    }

    /// Returns a layer applying this configuration.
    pub fn layer(self) -> RetryLayer<E> {
        RetryLayer::new(self)
    }
}

/// Builder for [`RetryConfig`].
pub struct RetryConfigBuilder<E> {
    max_retries: usize,
    backoff: Backoff,
    retry_predicate: Option<RetryPredicate<E>>,
    event_listeners: EventListeners<RetryEvent>,
    name: String,
}

impl<E> Default for RetryConfigBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> RetryConfigBuilder<E> {
    /// Creates a new builder with defaults.
    ///
    /// Defaults:
    /// - max_retries: 3
    /// - backoff: none (retries are immediate)
    /// - every error is retried
    /// - name: `"<unnamed>"`
    pub fn new() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: Backoff::None,
            retry_predicate: None,
            event_listeners: EventListeners::new(),
            name: "<unnamed>".to_string(),
        }
    }

    /// Sets how many retries follow a failed initial attempt.
    ///
    /// `max_retries(3)` means up to 4 invocations of the operation.
    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the delay strategy between attempts.
    pub fn backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Waits a fixed interval before every retry.
    pub fn fixed_backoff(self, delay: Duration) -> Self {
        self.backoff(Backoff::Fixed(delay))
    }

    /// Sets a predicate to determine which errors should be retried.
    ///
    /// Errors rejected by the predicate are returned immediately.
    pub fn retry_on<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.retry_predicate = Some(Arc::new(predicate));
        self
    }

    /// Sets the name for this retry instance (used in events).
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback invoked before each retry.
    ///
    /// # Callback Signature
    /// `Fn(usize, Duration)` - the one-based retry number and the delay that
    /// precedes it.
    pub fn on_retry<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, Duration) + Send + Sync + 'static,
    {
        self.event_listeners
            .add(move |event: &RetryEvent| {
                if let RetryEvent::Retry { attempt, delay, .. } = event {
                    f(*attempt, *delay);
                }
            });
        self
    }

    /// Registers a callback invoked when the call finally succeeds.
    ///
    /// Receives the total number of attempts made.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners
            .add(move |event: &RetryEvent| {
                if let RetryEvent::Success { attempts, .. } = event {
                    f(*attempts);
                }
            });
        self
    }

    /// Registers a callback invoked when the retry budget is exhausted.
    ///
    /// Receives the total number of attempts made.
    pub fn on_exhausted<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners
            .add(move |event: &RetryEvent| {
                if let RetryEvent::Error { attempts, .. } = event {
                    f(*attempts);
                }
            });
        self
    }

    /// Registers a callback for every retry event.
    pub fn on_event<F>(mut self, f: F) -> Self
    where
        F: Fn(&RetryEvent) + Send + Sync + 'static,
    {
        self.event_listeners.add(f);
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> RetryConfig<E> {
        RetryConfig {
            max_retries: self.max_retries,
            backoff: self.backoff,
            retry_predicate: self.retry_predicate,
            event_listeners: self.event_listeners,
            name: self.name,
        }
    }
}
