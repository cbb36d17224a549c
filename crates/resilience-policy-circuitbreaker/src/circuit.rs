use crate::config::CircuitBreakerConfig;
use crate::events::CircuitBreakerEvent;
#[cfg(feature = "metrics")]
use metrics::{counter, gauge};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Represents the state of the circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum CircuitState {
    /// The circuit is closed and calls are allowed.
    Closed = 0,
    /// The circuit is open and calls are rejected.
    Open = 1,
    /// The break has elapsed and a single trial call is allowed.
    HalfOpen = 2,
}

impl CircuitState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => CircuitState::Open,
            2 => CircuitState::HalfOpen,
            _ => CircuitState::Closed,
        }
    }

    #[cfg(any(feature = "metrics", feature = "tracing"))]
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            CircuitState::Closed => "Closed",
            CircuitState::Open => "Open",
            CircuitState::HalfOpen => "HalfOpen",
        }
    }
}

/// Point-in-time view of a circuit breaker.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CircuitMetrics {
    /// Current state of the circuit breaker.
    pub state: CircuitState,
    /// Failures recorded since the last success or state change.
    pub consecutive_failures: usize,
    /// Calls rejected without invoking the operation, over the breaker's lifetime.
    pub rejected_calls: u64,
    /// Whether the circuit was forced open and waits for a manual reset.
    pub isolated: bool,
    /// Time since the last state transition.
    pub time_since_state_change: Duration,
}

/// Admission handed out by [`Circuit::try_acquire`].
///
/// A result only counts while the circuit is still in the generation that
/// admitted the call. Every transition, and every half-open trial, starts a
/// new generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Permit {
    generation: u64,
}

pub(crate) struct Circuit {
    state: CircuitState,
    generation: u64,
    state_atomic: Arc<AtomicU8>,
    last_state_change: Instant,
    consecutive_failures: usize,
    // Start of the half-open trial currently in flight.
    trial_started: Option<Instant>,
    isolated: bool,
    rejected_calls: u64,
}

impl Circuit {
    pub(crate) fn new(state_atomic: Arc<AtomicU8>) -> Self {
        state_atomic.store(CircuitState::Closed as u8, Ordering::Release);
        Self {
            state: CircuitState::Closed,
            generation: 0,
            state_atomic,
            last_state_change: Instant::now(),
            consecutive_failures: 0,
            trial_started: None,
            isolated: false,
            rejected_calls: 0,
        }
    }

    pub fn state(&self) -> CircuitState {
        self.state
    }

    pub fn metrics(&self) -> CircuitMetrics {
        CircuitMetrics {
            state: self.state,
            consecutive_failures: self.consecutive_failures,
            rejected_calls: self.rejected_calls,
            isolated: self.isolated,
            time_since_state_change: self.last_state_change.elapsed(),
        }
    }

    /// Decides whether a call may proceed, moving Open to HalfOpen once the
    /// break has elapsed.
    pub fn try_acquire(&mut self, config: &CircuitBreakerConfig) -> Option<Permit> {
        let permitted = match self.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                if !self.isolated && self.last_state_change.elapsed() >= config.break_duration {
                    self.transition_to(CircuitState::HalfOpen, config);
                    self.trial_started = Some(Instant::now());
                    true
                } else {
                    false
                }
            }
            CircuitState::HalfOpen => match self.trial_started {
                // An abandoned trial never reports back; let another through
                // once a full break has passed.
                Some(started) if started.elapsed() < config.break_duration => false,
                _ => {
                    self.generation += 1;
                    self.trial_started = Some(Instant::now());
                    true
                }
            },
        };

        if permitted {
            config
                .event_listeners
                .emit(&CircuitBreakerEvent::CallPermitted {
                    pattern_name: config.name.clone(),
                    timestamp: std::time::Instant::now(),
                    state: self.state,
                });
        } else {
            self.rejected_calls += 1;
            config
                .event_listeners
                .emit(&CircuitBreakerEvent::CallRejected {
                    pattern_name: config.name.clone(),
                    timestamp: std::time::Instant::now(),
                });
        }

        permitted.then_some(Permit {
            generation: self.generation,
        })
    }

    /// Whether `permit` was issued in the current generation. Results of
    /// calls admitted before the last transition, or by an abandoned trial,
    /// are not counted.
    fn is_current(&self, permit: Permit) -> bool {
        permit.generation == self.generation
    }

    pub fn record_success(&mut self, permit: Permit, config: &CircuitBreakerConfig) {
        #[cfg(feature = "metrics")]
        counter!("circuitbreaker_calls_total", "circuitbreaker" => config.name.clone(), "outcome" => "success").increment(1);

        if !self.is_current(permit) {
            #[cfg(feature = "tracing")]
            tracing::trace!(breaker = %config.name, "ignoring result admitted in an earlier generation");
            return;
        }

        config
            .event_listeners
            .emit(&CircuitBreakerEvent::SuccessRecorded {
                pattern_name: config.name.clone(),
                timestamp: std::time::Instant::now(),
                state: self.state,
            });

        match self.state {
            CircuitState::Closed => self.consecutive_failures = 0,
            CircuitState::HalfOpen => self.transition_to(CircuitState::Closed, config),
            CircuitState::Open => {}
        }
    }

    pub fn record_failure(&mut self, permit: Permit, config: &CircuitBreakerConfig) {
        #[cfg(feature = "metrics")]
        counter!("circuitbreaker_calls_total", "circuitbreaker" => config.name.clone(), "outcome" => "failure").increment(1);

        if !self.is_current(permit) {
            #[cfg(feature = "tracing")]
            tracing::trace!(breaker = %config.name, "ignoring result admitted in an earlier generation");
            return;
        }

        self.consecutive_failures += 1;

        config
            .event_listeners
            .emit(&CircuitBreakerEvent::FailureRecorded {
                pattern_name: config.name.clone(),
                timestamp: std::time::Instant::now(),
                state: self.state,
                consecutive_failures: self.consecutive_failures,
            });

        match self.state {
            CircuitState::Closed if self.consecutive_failures >= config.failure_threshold => {
                self.transition_to(CircuitState::Open, config);
            }
            CircuitState::HalfOpen => self.transition_to(CircuitState::Open, config),
            _ => {}
        }
    }

    pub fn force_open(&mut self, config: &CircuitBreakerConfig) {
        self.isolated = true;
        self.transition_to(CircuitState::Open, config);
    }

    /// Closes the circuit. Calls still in flight from before the reset no
    /// longer count.
    pub fn reset(&mut self, config: &CircuitBreakerConfig) {
        self.isolated = false;
        self.transition_to(CircuitState::Closed, config);
        self.generation += 1;
        self.consecutive_failures = 0;
        self.trial_started = None;
    }

    fn transition_to(&mut self, state: CircuitState, config: &CircuitBreakerConfig) {
        if self.state == state {
            return;
        }

        let from_state = self.state;

        config
            .event_listeners
            .emit(&CircuitBreakerEvent::StateTransition {
                pattern_name: config.name.clone(),
                timestamp: std::time::Instant::now(),
                from_state,
                to_state: state,
            });

        #[cfg(feature = "tracing")]
        tracing::info!(
            breaker = %config.name,
            from = from_state.as_str(),
            to = state.as_str(),
            "Circuit state transition"
        );

        #[cfg(feature = "metrics")]
        {
            counter!(
                "circuitbreaker_transitions_total",
                "circuitbreaker" => config.name.clone(),
                "from" => from_state.as_str(),
                "to" => state.as_str()
            )
            .increment(1);

            gauge!("circuitbreaker_state", "circuitbreaker" => config.name.clone())
                .set(state as u8 as f64);
        }

        self.state = state;
        self.generation += 1;
        self.state_atomic.store(state as u8, Ordering::Release);
        self.last_state_change = Instant::now();
        self.consecutive_failures = 0;
        self.trial_started = None;
    }
}
