//! One executor shared by concurrent callers.

use super::test_utils::*;
use resilience_policy::{CircuitState, PolicyError, Strategy};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_failures_open_circuit_once() {
    let (executor, logger) = executor(5, Duration::from_secs(60));
    let calls = Calls::new();

    let mut handles = vec![];
    for _ in 0..50 {
        let executor = executor.clone();
        let calls = calls.clone();
        handles.push(tokio::spawn(async move {
            executor
                .get_with_policy(Strategy::CircuitBreaker, always_failing(&calls), None)
                .await
        }));
    }

    let mut rejected = 0;
    for handle in handles {
        if let Err(PolicyError::CircuitOpen) = handle.await.unwrap() {
            rejected += 1;
        }
    }

    assert_eq!(executor.circuit_breaker().state().await, CircuitState::Open);
    assert_eq!(logger.count("Breaking circuit"), 1);
    assert!(calls.get() >= 5);
    assert_eq!(calls.get() + rejected, 50);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_successes_keep_circuit_closed() {
    let (executor, logger) = executor(1, Duration::from_secs(60));
    let executor = Arc::new(executor);
    let calls = Calls::new();

    let mut handles = vec![];
    for _ in 0..100 {
        let executor = Arc::clone(&executor);
        let calls = calls.clone();
        handles.push(tokio::spawn(async move {
            executor
                .get_with_policy(
                    Strategy::CircuitBreakerWithRetryAndFallback,
                    succeeding(&calls, "value"),
                    Some(succeeding(&Calls::new(), "test")),
                )
                .await
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), "value");
    }

    assert_eq!(calls.get(), 100);
    assert!(logger.messages().is_empty());
    assert_eq!(executor.circuit_breaker().state_sync(), CircuitState::Closed);
}

/// Retry state is scoped to each call
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn retry_budgets_are_independent_per_call() {
    let (executor, logger) = default_executor();

    let mut handles = vec![];
    for _ in 0..10 {
        let executor = executor.clone();
        handles.push(tokio::spawn(async move {
            let calls = Calls::new();
            let result = executor
                .get_with_policy(Strategy::Retry, always_failing(&calls), None)
                .await;
            (result, calls.get())
        }));
    }

    for handle in handles {
        let (result, calls) = handle.await.unwrap();
        assert!(result.is_err());
        assert_eq!(calls, 4);
    }

    assert_eq!(logger.count("RetryPolicy invoked"), 30);
}
