use crate::events::CircuitBreakerEvent;
use crate::{CircuitBreaker, CircuitState};
use resilience_policy_core::EventListeners;
use std::time::Duration;

/// Consecutive failures that open the circuit unless configured otherwise.
pub const DEFAULT_FAILURE_THRESHOLD: usize = 5;

/// How long the circuit stays open unless configured otherwise.
pub const DEFAULT_BREAK_DURATION: Duration = Duration::from_secs(30);

/// Configuration for the circuit breaker.
pub struct CircuitBreakerConfig {
    pub(crate) failure_threshold: usize,
    pub(crate) break_duration: Duration,
    pub(crate) event_listeners: EventListeners<CircuitBreakerEvent>,
    pub(crate) name: String,
}

impl CircuitBreakerConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> CircuitBreakerConfigBuilder {
        CircuitBreakerConfigBuilder::new()
    }

    /// Number of consecutive failures that opens the circuit.
    pub fn failure_threshold(&self) -> usize {
        self.failure_threshold
    }

    /// How long the circuit rejects calls before allowing a trial.
    pub fn break_duration(&self) -> Duration {
        self.break_duration
    }

    /// The breaker's name, as reported in events.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        CircuitBreakerConfigBuilder::new().into_config()
    }
}

/// Builder for configuring and constructing a circuit breaker.
pub struct CircuitBreakerConfigBuilder {
    failure_threshold: usize,
    break_duration: Duration,
    event_listeners: EventListeners<CircuitBreakerEvent>,
    name: String,
}

impl Default for CircuitBreakerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CircuitBreakerConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            break_duration: DEFAULT_BREAK_DURATION,
            event_listeners: EventListeners::new(),
            name: String::from("<unnamed>"),
        }
    }

    /// Sets how many consecutive failures open the circuit.
    ///
    /// A threshold of zero is treated as one.
    ///
    /// Default: 5
    pub fn failure_threshold(mut self, threshold: usize) -> Self {
        self.failure_threshold = threshold.max(1);
        self
    }

    /// Sets how long the circuit stays open before a trial call is allowed.
    ///
    /// Default: 30 seconds
    pub fn break_duration(mut self, duration: Duration) -> Self {
        self.break_duration = duration;
        self
    }

    /// Give this breaker a human-readable name for observability.
    ///
    /// Default: `<unnamed>`
    pub fn name<N: Into<String>>(mut self, n: N) -> Self {
        self.name = n.into();
        self
    }

    /// Registers a callback invoked on every state transition.
    ///
    /// The callback receives the state being left and the state being entered.
    ///
    /// ```rust
    /// use resilience_policy_circuitbreaker::{CircuitBreakerConfig, CircuitState};
    ///
    /// let breaker = CircuitBreakerConfig::builder()
    ///     .on_state_transition(|from, to| {
    ///         if to == CircuitState::Open {
    ///             eprintln!("circuit opened (was {:?})", from);
    ///         }
    ///     })
    ///     .build();
    /// ```
    pub fn on_state_transition<F>(mut self, f: F) -> Self
    where
        F: Fn(CircuitState, CircuitState) + Send + Sync + 'static,
    {
        self.event_listeners
            .add(move |event: &CircuitBreakerEvent| {
                if let CircuitBreakerEvent::StateTransition {
                    from_state,
                    to_state,
                    ..
                } = event
                {
                    f(*from_state, *to_state);
                }
            });
        self
    }

    /// Registers a callback invoked when a call is rejected by an open circuit.
    pub fn on_call_rejected<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.event_listeners
            .add(move |event: &CircuitBreakerEvent| {
                if matches!(event, CircuitBreakerEvent::CallRejected { .. }) {
                    f();
                }
            });
        self
    }

    /// Registers a callback for every circuit breaker event.
    pub fn on_event<F>(mut self, f: F) -> Self
    where
        F: Fn(&CircuitBreakerEvent) + Send + Sync + 'static,
    {
        self.event_listeners.add(f);
        self
    }

    pub(crate) fn into_config(self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: self.failure_threshold,
            break_duration: self.break_duration,
            event_listeners: self.event_listeners,
            name: self.name,
        }
    }

    /// Builds a circuit breaker in the closed state.
    pub fn build(self) -> CircuitBreaker {
        CircuitBreaker::new(self.into_config())
    }
}
