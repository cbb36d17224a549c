//! Retry series

use super::recorded::{counter, install};
use resilience_policy_retry::RetryConfig;
use serial_test::serial;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use tower::{Layer, ServiceExt};

#[tokio::test]
#[serial]
async fn attempts_and_results_are_counted() {
    install();

    let layer = RetryConfig::<&'static str>::builder()
        .name("quotes")
        .max_retries(3)
        .build()
        .layer();

    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let flaky = tower::service_fn(move |_: ()| {
        let n = c.fetch_add(1, Ordering::SeqCst);
        async move { if n == 0 { Err("BOEM") } else { Ok("quote") } }
    });
    let _ = layer.layer(flaky).oneshot(()).await;

    let failing = tower::service_fn(|_: ()| async { Err::<(), _>("BOEM") });
    let _ = layer.layer(failing).oneshot(()).await;

    let calls = |result| counter("retry_calls_total", &[("retry", "quotes"), ("result", result)]);
    assert_eq!(calls("success"), 1);
    assert_eq!(calls("exhausted"), 1);

    // one retry for the flaky call, the full budget for the failing one
    assert_eq!(counter("retry_attempts_total", &[("retry", "quotes")]), 4);
}
