//! Fallback series

use super::recorded::{counter, install};
use resilience_policy_fallback::FallbackConfig;
use serial_test::serial;
use tower::{Layer, ServiceExt};

#[tokio::test]
#[serial]
async fn final_outcome_is_counted() {
    install();

    let layer = FallbackConfig::<u32, &'static str, &'static str>::builder(|req: u32| async move {
        if req == 2 { Err("also down") } else { Ok("cached") }
    })
    .name("profiles")
    .layer();

    let service = tower::service_fn(|req: u32| async move {
        if req == 0 { Ok("fresh") } else { Err("BOEM") }
    });

    for req in [0, 1, 2] {
        let _ = layer.layer(service.clone()).oneshot(req).await;
    }

    let calls = |result| {
        counter(
            "fallback_calls_total",
            &[("fallback", "profiles"), ("result", result)],
        )
    };
    assert_eq!(calls("primary_succeeded"), 1);
    assert_eq!(calls("recovered"), 1);
    assert_eq!(calls("fallback_failed"), 1);
    assert_eq!(calls("invoked"), 0);
}
