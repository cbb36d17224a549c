//! Circuit breaker series

use super::recorded::{counter, gauge, install};
use resilience_policy_circuitbreaker::CircuitBreaker;
use serial_test::serial;
use std::time::Duration;
use tower::{Layer, Service, ServiceExt};

#[tokio::test]
#[serial]
async fn calls_are_counted_by_outcome() {
    install();

    let breaker = CircuitBreaker::builder()
        .name("inventory")
        .failure_threshold(2)
        .break_duration(Duration::from_secs(30))
        .build();

    let service = tower::service_fn(|req: u64| async move {
        if req == 0 {
            Ok::<_, &'static str>("in stock")
        } else {
            Err("BOEM")
        }
    });
    let mut service = breaker.layer().layer(service);

    // success, two failures to open, then one rejection
    for req in [0, 1, 1, 0] {
        let _ = service.ready().await.unwrap().call(req).await;
    }

    let calls = |outcome| {
        counter(
            "circuitbreaker_calls_total",
            &[("circuitbreaker", "inventory"), ("outcome", outcome)],
        )
    };
    assert_eq!(calls("success"), 1);
    assert_eq!(calls("failure"), 2);
    assert_eq!(calls("rejected"), 1);

    assert_eq!(
        counter(
            "circuitbreaker_transitions_total",
            &[("circuitbreaker", "inventory"), ("from", "Closed"), ("to", "Open")],
        ),
        1
    );
    assert_eq!(
        gauge("circuitbreaker_state", &[("circuitbreaker", "inventory")]),
        Some(1.0)
    );
}

#[tokio::test]
#[serial]
async fn recovery_records_every_transition() {
    install();

    let breaker = CircuitBreaker::builder()
        .name("recovering")
        .failure_threshold(1)
        .break_duration(Duration::from_millis(20))
        .build();

    let _ = breaker.execute(|| async { Err::<(), _>("BOEM") }).await;
    tokio::time::sleep(Duration::from_millis(40)).await;
    let _ = breaker.execute(|| async { Ok::<_, &str>(()) }).await;

    for (from, to) in [("Closed", "Open"), ("Open", "HalfOpen"), ("HalfOpen", "Closed")] {
        assert_eq!(
            counter(
                "circuitbreaker_transitions_total",
                &[("circuitbreaker", "recovering"), ("from", from), ("to", to)],
            ),
            1,
            "{from} -> {to}"
        );
    }
    assert_eq!(
        gauge("circuitbreaker_state", &[("circuitbreaker", "recovering")]),
        Some(0.0)
    );
}
