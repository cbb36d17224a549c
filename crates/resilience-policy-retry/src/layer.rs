use crate::{Retry, RetryConfig};
use std::sync::Arc;
use tower::Layer;

/// A Tower [`Layer`] that applies retry logic to a service.
///
/// ```
/// use resilience_policy_retry::RetryConfig;
/// use tower::ServiceBuilder;
///
/// # #[derive(Debug)]
/// # struct MyError;
/// let service = ServiceBuilder::new()
///     .layer(RetryConfig::<MyError>::builder().max_retries(3).build().layer())
///     .service(tower::service_fn(|req: String| async move {
///         Ok::<_, MyError>(req)
///     }));
/// ```
pub struct RetryLayer<E> {
    config: Arc<RetryConfig<E>>,
}

impl<E> RetryLayer<E> {
    /// Creates a retry layer from the given configuration.
    pub fn new(config: impl Into<Arc<RetryConfig<E>>>) -> Self {
        Self {
            config: config.into(),
        }
    }
}

impl<E> Clone for RetryLayer<E> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
        }
    }
}

impl<S, E> Layer<S> for RetryLayer<E> {
    type Service = Retry<S, E>;

    fn layer(&self, service: S) -> Self::Service {
        Retry::new(service, Arc::clone(&self.config))
    }
}
