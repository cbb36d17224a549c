//! Fallback middleware.
//!
//! Substitutes the result of an alternative operation when the inner service
//! fails, enabling graceful degradation.
//!
//! Any error escaping the inner service triggers the fallback unless a
//! [`handle`](FallbackConfigBuilder::handle) predicate says otherwise. The
//! fallback operation is run once: it is not retried, and its own failure is
//! returned as [`FallbackError::FallbackFailed`].
//!
//! ```rust
//! use resilience_policy_fallback::FallbackConfig;
//! use tower::{Layer, ServiceExt, service_fn};
//!
//! # #[derive(Debug)]
//! # struct MyError;
//! # async fn example() {
//! let layer = FallbackConfig::builder(|_req: String| async {
//!     Ok::<_, MyError>("cached response".to_string())
//! })
//! .name("profile")
//! .layer();
//!
//! let service = layer.layer(service_fn(|_req: String| async { Err::<String, _>(MyError) }));
//! let response = service.oneshot("user-1".to_string()).await.unwrap();
//! assert_eq!(response, "cached response");
//! # }
//! ```
//!
//! # Events
//!
//! Every call emits one [`FallbackEvent`] per step, tagged with a
//! [`FallbackOutcome`]: `PrimarySucceeded`, or `Invoked` followed by
//! `Recovered` or `FallbackFailed`, or `Unhandled` when the predicate rejects
//! the error. With the `metrics` feature the final outcome is counted in
//! `fallback_calls_total` under the `result` label.

mod config;
mod error;
mod events;
mod layer;

pub use config::{FallbackConfig, FallbackConfigBuilder};
pub use error::FallbackError;
pub use events::{FallbackEvent, FallbackOutcome};
pub use layer::FallbackLayer;

use futures::future::BoxFuture;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::Service;

#[cfg(feature = "metrics")]
use metrics::describe_counter;

#[cfg(feature = "metrics")]
use std::sync::Once;

#[cfg(feature = "metrics")]
static METRICS_INIT: Once = Once::new();

/// The alternative operation, called with the original request.
pub type FallbackFn<Req, Res, E> =
    Arc<dyn Fn(Req) -> BoxFuture<'static, Result<Res, E>> + Send + Sync>;

/// Predicate to determine if an error should trigger the fallback.
pub type HandlePredicate<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// A Tower service that substitutes a fallback operation when the inner
/// service fails.
///
/// See the [module-level documentation](crate) for usage examples.
pub struct Fallback<S, Req, Res, E> {
    inner: S,
    config: Arc<FallbackConfig<Req, Res, E>>,
}

impl<S, Req, Res, E> Fallback<S, Req, Res, E> {
    /// Creates a new `Fallback` service wrapping the given service.
    pub fn new(inner: S, config: Arc<FallbackConfig<Req, Res, E>>) -> Self {
        #[cfg(feature = "metrics")]
        METRICS_INIT.call_once(|| {
            describe_counter!(
                "fallback_calls_total",
                "Total number of calls through the fallback service"
            );
        });

        Self { inner, config }
    }
}

impl<S, Req, Res, E> Clone for Fallback<S, Req, Res, E>
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

impl<S, Req, Res, E> Service<Req> for Fallback<S, Req, Res, E>
where
    S: Service<Req, Response = Res, Error = E> + Clone + Send + 'static,
    S::Future: Send + 'static,
    Req: Clone + Send + 'static,
    Res: Send + 'static,
    E: Send + 'static,
{
    type Response = Res;
    type Error = FallbackError<E>;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(FallbackError::Inner)
    }

    fn call(&mut self, req: Req) -> Self::Future {
        let clone = self.inner.clone();
        let mut service = std::mem::replace(&mut self.inner, clone);
        let config = Arc::clone(&self.config);
        let req_clone = req.clone();

        Box::pin(async move {
            let error = match service.call(req).await {
                Ok(response) => {
                    config.emit(FallbackOutcome::PrimarySucceeded);
                    return Ok(response);
                }
                Err(error) => error,
            };

            if !config.handles(&error) {
                #[cfg(feature = "tracing")]
                tracing::debug!(fallback = %config.name, "error does not match predicate, skipping fallback");

                config.emit(FallbackOutcome::Unhandled);
                return Err(FallbackError::Inner(error));
            }

            #[cfg(feature = "tracing")]
            tracing::debug!(fallback = %config.name, "inner service failed, applying fallback");

            config.emit(FallbackOutcome::Invoked);

            match (config.operation)(req_clone).await {
                Ok(response) => {
                    config.emit(FallbackOutcome::Recovered);
                    Ok(response)
                }
                Err(fallback_error) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(fallback = %config.name, "fallback operation failed");

                    config.emit(FallbackOutcome::FallbackFailed);
                    Err(FallbackError::FallbackFailed(fallback_error))
                }
            }
        })
    }
}
