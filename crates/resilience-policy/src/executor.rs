use crate::{Operation, PolicyExecutorConfig, PolicyExecutorConfigBuilder, Strategy};
use futures::TryFutureExt;
use resilience_policy_circuitbreaker::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitState,
};
use resilience_policy_core::{
    PolicyError, PolicyLogger, SharedLogger, BREAKING_CIRCUIT, FALLBACK_INVOKED, RETRY_INVOKED,
};
use resilience_policy_fallback::{FallbackConfig, FallbackError};
use resilience_policy_retry::RetryConfig;
use std::fmt;
use std::sync::Arc;
use tower::util::BoxCloneService;
use tower::{service_fn, Layer, ServiceExt};

type Pipeline<T, E> = BoxCloneService<(), T, PolicyError<E>>;

/// Runs operations under a [`Strategy`].
///
/// The executor owns one circuit breaker shared by every call made through it
/// and by every clone of it. Retry and fallback state is scoped to a single
/// call.
///
/// Behaviors compose in a fixed order, outermost first: fallback, circuit
/// breaker, retry, primary operation. The circuit breaker therefore sees one
/// outcome per call, after retries are exhausted, and a rejection by an open
/// circuit goes straight to the fallback without retrying.
#[derive(Clone)]
pub struct PolicyExecutor {
    breaker: CircuitBreaker,
    config: Arc<PolicyExecutorConfig>,
}

impl PolicyExecutor {
    /// Creates an executor from a configuration.
    pub fn new(config: PolicyExecutorConfig) -> Self {
        let logger = Arc::clone(&config.logger);
        let breaker = CircuitBreakerConfig::builder()
            .failure_threshold(config.failure_threshold)
            .break_duration(config.break_duration)
            .name(config.name.clone())
            .on_state_transition(move |_, to| {
                if to == CircuitState::Open {
                    logger.write(BREAKING_CIRCUIT);
                }
            })
            .build();

        Self {
            breaker,
            config: Arc::new(config),
        }
    }

    /// Creates a configuration builder.
    pub fn builder() -> PolicyExecutorConfigBuilder {
        PolicyExecutorConfigBuilder::new()
    }

    /// Creates an executor with default settings reporting to `logger`.
    pub fn with_logger<L>(logger: L) -> Self
    where
        L: PolicyLogger + 'static,
    {
        Self::builder().logger(logger).build()
    }

    /// Returns the circuit breaker shared by calls through this executor.
    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Returns the executor's configuration.
    pub fn config(&self) -> &PolicyExecutorConfig {
        &self.config
    }

    /// Runs `primary` under `strategy`.
    ///
    /// Strategies that include fallback require `fallback`; without it the
    /// call fails with [`PolicyError::InvalidArgument`] before anything runs.
    /// Strategies without fallback ignore it.
    ///
    /// Errors:
    /// - [`PolicyError::CircuitOpen`] if the circuit rejected the call and no
    ///   fallback applies
    /// - [`PolicyError::Operation`] carrying the last failure of the primary
    ///   operation, or the fallback's failure when the fallback ran
    pub async fn get_with_policy<T, E>(
        &self,
        strategy: Strategy,
        primary: Operation<T, E>,
        fallback: Option<Operation<T, E>>,
    ) -> Result<T, PolicyError<E>>
    where
        T: Send + 'static,
        E: Send + 'static,
    {
        let behaviors = strategy.behaviors();

        let fallback = match (behaviors.fallback, fallback) {
            (true, None) => {
                return Err(PolicyError::InvalidArgument {
                    reason: "strategy requires a fallback operation",
                });
            }
            (true, Some(op)) => Some(op),
            (false, _) => None,
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(executor = %self.config.name, %strategy, "executing operation");

        if behaviors.is_empty() {
            return primary().await.map_err(PolicyError::Operation);
        }

        let mut pipeline: Pipeline<T, E> = BoxCloneService::new(service_fn(move |_: ()| {
            primary().map_err(PolicyError::Operation)
        }));

        if behaviors.retry {
            pipeline = self.with_retry(pipeline);
        }

        if behaviors.circuit_breaker {
            let guarded = self.breaker.layer().layer(pipeline);
            pipeline = BoxCloneService::new(ServiceExt::<()>::map_err(
                guarded,
                CircuitBreakerError::into_policy_error,
            ));
        }

        if let Some(fallback) = fallback {
            pipeline = self.with_fallback(pipeline, fallback);
        }

        pipeline.oneshot(()).await
    }

    fn with_retry<T, E>(&self, pipeline: Pipeline<T, E>) -> Pipeline<T, E>
    where
        T: Send + 'static,
        E: Send + 'static,
    {
        let logger: SharedLogger = Arc::clone(&self.config.logger);
        let layer = RetryConfig::<PolicyError<E>>::builder()
            .max_retries(self.config.max_retries)
            .backoff(self.config.backoff.clone())
            .name(self.config.name.clone())
            .on_retry(move |_, _| logger.write(RETRY_INVOKED))
            .build()
            .layer();

        BoxCloneService::new(layer.layer(pipeline))
    }

    fn with_fallback<T, E>(
        &self,
        pipeline: Pipeline<T, E>,
        fallback: Operation<T, E>,
    ) -> Pipeline<T, E>
    where
        T: Send + 'static,
        E: Send + 'static,
    {
        let logger: SharedLogger = Arc::clone(&self.config.logger);
        let layer = FallbackConfig::<(), T, PolicyError<E>>::builder(move |_: ()| {
            fallback().map_err(PolicyError::Operation)
        })
        .name(self.config.name.clone())
        .on_fallback(move || logger.write(FALLBACK_INVOKED))
        .layer();

        BoxCloneService::new(ServiceExt::<()>::map_err(
            layer.layer(pipeline),
            FallbackError::into_inner,
        ))
    }
}

impl Default for PolicyExecutor {
    fn default() -> Self {
        Self::new(PolicyExecutorConfig::default())
    }
}

impl fmt::Debug for PolicyExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyExecutor")
            .field("config", &self.config)
            .field("circuit_state", &self.breaker.state_sync())
            .finish()
    }
}
