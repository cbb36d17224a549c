use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// A zero-argument asynchronous operation producing `T` or failing with `E`.
///
/// Operations are shared so the retry layer can invoke them repeatedly.
pub type Operation<T, E> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, E>> + Send + Sync>;

/// Wraps a closure returning a future into an [`Operation`].
///
/// ```rust
/// use resilience_policy::operation;
///
/// let fetch = operation(|| async { Ok::<_, std::io::Error>(42) });
/// ```
pub fn operation<T, E, F, Fut>(f: F) -> Operation<T, E>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    Arc::new(move || -> BoxFuture<'static, Result<T, E>> { Box::pin(f()) })
}
