use crate::PolicyExecutor;
use resilience_policy_circuitbreaker::{DEFAULT_BREAK_DURATION, DEFAULT_FAILURE_THRESHOLD};
use resilience_policy_core::{NoopLogger, PolicyLogger, SharedLogger};
use resilience_policy_retry::{Backoff, DEFAULT_MAX_RETRIES};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for a [`PolicyExecutor`].
#[derive(Clone)]
pub struct PolicyExecutorConfig {
    pub(crate) failure_threshold: usize,
    pub(crate) break_duration: Duration,
    pub(crate) max_retries: usize,
    pub(crate) backoff: Backoff,
    pub(crate) logger: SharedLogger,
    pub(crate) name: String,
}

impl PolicyExecutorConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> PolicyExecutorConfigBuilder {
        PolicyExecutorConfigBuilder::new()
    }

    /// Consecutive failures that open the circuit.
    pub fn failure_threshold(&self) -> usize {
        self.failure_threshold
    }

    /// How long the circuit stays open before a trial call.
    pub fn break_duration(&self) -> Duration {
        self.break_duration
    }

    /// Retries performed after the initial attempt.
    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    /// Delay schedule between retries.
    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    /// Name used for the breaker and the per-call patterns.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Default for PolicyExecutorConfig {
    fn default() -> Self {
        PolicyExecutorConfigBuilder::new().into_config()
    }
}

impl fmt::Debug for PolicyExecutorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyExecutorConfig")
            .field("failure_threshold", &self.failure_threshold)
            .field("break_duration", &self.break_duration)
            .field("max_retries", &self.max_retries)
            .field("backoff", &self.backoff)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Builder for [`PolicyExecutorConfig`].
pub struct PolicyExecutorConfigBuilder {
    failure_threshold: usize,
    break_duration: Duration,
    max_retries: usize,
    backoff: Backoff,
    logger: SharedLogger,
    name: String,
}

impl Default for PolicyExecutorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyExecutorConfigBuilder {
    /// Creates a builder with defaults:
    /// - failure threshold: 5
    /// - break duration: 30 seconds
    /// - max retries: 3, without delay
    /// - logger: discards messages
    pub fn new() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            break_duration: DEFAULT_BREAK_DURATION,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: Backoff::None,
            logger: Arc::new(NoopLogger),
            name: "policy-executor".to_string(),
        }
    }

    /// Sets how many consecutive failures open the circuit.
    ///
    /// A threshold of zero is treated as one.
    pub fn failure_threshold(mut self, threshold: usize) -> Self {
        self.failure_threshold = threshold.max(1);
        self
    }

    /// Sets how long the circuit stays open.
    pub fn break_duration(mut self, duration: Duration) -> Self {
        self.break_duration = duration;
        self
    }

    /// Sets the number of retries after the initial attempt.
    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the delay schedule between retries.
    pub fn backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Sets the logger notified when policies act.
    pub fn logger<L>(mut self, logger: L) -> Self
    where
        L: PolicyLogger + 'static,
    {
        self.logger = Arc::new(logger);
        self
    }

    /// Sets an already shared logger.
    pub fn shared_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Sets the name used for the breaker and per-call patterns.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn into_config(self) -> PolicyExecutorConfig {
        PolicyExecutorConfig {
            failure_threshold: self.failure_threshold,
            break_duration: self.break_duration,
            max_retries: self.max_retries,
            backoff: self.backoff,
            logger: self.logger,
            name: self.name,
        }
    }

    /// Builds the configuration.
    pub fn build_config(self) -> PolicyExecutorConfig {
        self.into_config()
    }

    /// Builds a [`PolicyExecutor`] with this configuration.
    pub fn build(self) -> PolicyExecutor {
        PolicyExecutor::new(self.into_config())
    }
}
