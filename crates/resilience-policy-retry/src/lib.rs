//! Retry middleware with a fixed retry budget.
//!
//! Each call gets its own budget: the operation is attempted once and, on
//! failure, retried up to `max_retries` more times. Every retry is announced
//! through a [`RetryEvent::Retry`] event before it is made. When the budget is
//! exhausted the last error is returned unchanged.
//!
//! Retries are immediate by default. A [`Backoff`] can insert a delay.
//!
//! ```
//! use resilience_policy_retry::RetryConfig;
//! use tower::{ServiceBuilder, ServiceExt};
//!
//! # #[derive(Debug)]
//! # struct MyError;
//! # async fn example() {
//! let config: RetryConfig<MyError> = RetryConfig::builder()
//!     .max_retries(3)
//!     .on_retry(|attempt, _delay| println!("retry #{}", attempt))
//!     .build();
//!
//! let service = ServiceBuilder::new()
//!     .layer(config.layer())
//!     .service(tower::service_fn(|req: String| async move {
//!         Ok::<_, MyError>(format!("Response: {}", req))
//!     }));
//!
//! let response = service.oneshot("hello".to_string()).await;
//! # }
//! ```

mod backoff;
mod config;
mod events;
mod layer;

pub use backoff::Backoff;
pub use config::{RetryConfig, RetryConfigBuilder, RetryPredicate, DEFAULT_MAX_RETRIES};
pub use events::RetryEvent;
pub use layer::RetryLayer;

use futures::future::BoxFuture;
#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter};
use std::sync::Arc;
#[cfg(feature = "metrics")]
use std::sync::Once;
use std::task::{Context, Poll};
use std::time::Instant;
use tower::{Service, ServiceExt};

#[cfg(feature = "metrics")]
static METRICS_INIT: Once = Once::new();

/// A Tower [`Service`] that retries failed requests.
///
/// Attempts are strictly sequential; the next attempt starts only after the
/// previous one has completed.
pub struct Retry<S, E> {
    inner: S,
    config: Arc<RetryConfig<E>>,
}

impl<S, E> Retry<S, E> {
    /// Creates a new `Retry` service wrapping the given service.
    pub fn new(inner: S, config: Arc<RetryConfig<E>>) -> Self {
        #[cfg(feature = "metrics")]
        METRICS_INIT.call_once(|| {
            describe_counter!("retry_calls_total", "Total number of calls through retry");
            describe_counter!("retry_attempts_total", "Total number of retries made");
        });

        Self { inner, config }
    }
}

impl<S, E> Clone for Retry<S, E>
where
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S, Req, E> Service<Req> for Retry<S, E>
where
    S: Service<Req, Error = E> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Response: Send + 'static,
    Req: Clone + Send + 'static,
    E: Send + 'static,
{
    type Response = S::Response;
    type Error = E;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Req) -> Self::Future {
        let mut service = self.inner.clone();
        let config = Arc::clone(&self.config);

        Box::pin(async move {
            let mut retries = 0;

            loop {
                let result = match ServiceExt::<Req>::ready(&mut service).await {
                    Ok(ready) => ready.call(req.clone()).await,
                    Err(error) => Err(error),
                };

                let error = match result {
                    Ok(response) => {
                        #[cfg(feature = "metrics")]
                        counter!("retry_calls_total", "retry" => config.name.clone(), "result" => "success").increment(1);

                        config.event_listeners.emit(&RetryEvent::Success {
                            pattern_name: config.name.clone(),
                            timestamp: Instant::now(),
                            attempts: retries + 1,
                        });
                        return Ok(response);
                    }
                    Err(error) => error,
                };

                if !config.should_retry(&error) {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(retry = %config.name, "error not retryable");

                    #[cfg(feature = "metrics")]
                    counter!("retry_calls_total", "retry" => config.name.clone(), "result" => "ignored").increment(1);

                    config.event_listeners.emit(&RetryEvent::IgnoredError {
                        pattern_name: config.name.clone(),
                        timestamp: Instant::now(),
                    });
                    return Err(error);
                }

                if retries >= config.max_retries {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(retry = %config.name, attempts = retries + 1, "retries exhausted");

                    #[cfg(feature = "metrics")]
                    counter!("retry_calls_total", "retry" => config.name.clone(), "result" => "exhausted").increment(1);

                    config.event_listeners.emit(&RetryEvent::Error {
                        pattern_name: config.name.clone(),
                        timestamp: Instant::now(),
                        attempts: retries + 1,
                    });
                    return Err(error);
                }

                let delay = config.backoff.delay(retries);
                retries += 1;

                #[cfg(feature = "tracing")]
                tracing::debug!(retry = %config.name, attempt = retries, ?delay, "retrying");

                #[cfg(feature = "metrics")]
                counter!("retry_attempts_total", "retry" => config.name.clone()).increment(1);

                config.event_listeners.emit(&RetryEvent::Retry {
                    pattern_name: config.name.clone(),
                    timestamp: Instant::now(),
                    attempt: retries,
                    delay,
                });

                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        })
    }
}
