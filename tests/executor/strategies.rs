use super::test_utils::*;
use resilience_policy::{CircuitState, PolicyError, Strategy};

#[tokio::test]
async fn none_returns_primary_result() {
    let (executor, logger) = default_executor();
    let calls = Calls::new();

    let result = executor
        .get_with_policy(Strategy::None, succeeding(&calls, "value"), None)
        .await;

    assert_eq!(result.unwrap(), "value");
    assert_eq!(calls.get(), 1);
    assert!(logger.messages().is_empty());
}

#[tokio::test]
async fn none_propagates_failure_unchanged() {
    let (executor, logger) = default_executor();
    let calls = Calls::new();

    let result = executor
        .get_with_policy(Strategy::None, always_failing(&calls), None)
        .await;

    assert_eq!(result, Err(PolicyError::Operation(Boom("BOEM"))));
    assert_eq!(calls.get(), 1);
    assert!(logger.messages().is_empty());
}

/// Repeated None calls are idempotent and never touch the breaker
#[tokio::test]
async fn none_is_idempotent() {
    let (executor, _logger) = executor(1, std::time::Duration::from_secs(30));
    let calls = Calls::new();

    for _ in 0..10 {
        let result = executor
            .get_with_policy(Strategy::None, succeeding(&calls, "same"), None)
            .await;
        assert_eq!(result.unwrap(), "same");
    }

    for _ in 0..5 {
        let _ = executor
            .get_with_policy(Strategy::None, always_failing(&calls), None)
            .await;
    }

    let metrics = executor.circuit_breaker().metrics().await;
    assert_eq!(metrics.state, CircuitState::Closed);
    assert_eq!(metrics.consecutive_failures, 0);
}

#[tokio::test]
async fn retry_exhausts_budget_and_surfaces_last_error() {
    let (executor, _logger) = default_executor();
    let calls = Calls::new();

    let result = executor
        .get_with_policy(Strategy::Retry, always_failing(&calls), None)
        .await;

    let error = result.unwrap_err();
    assert!(error.is_operation());
    assert_eq!(error.to_string(), "BOEM");
    assert_eq!(calls.get(), 4);
}

#[tokio::test]
async fn retry_stops_at_first_success() {
    let (executor, _logger) = default_executor();
    let calls = Calls::new();

    let result = executor
        .get_with_policy(Strategy::Retry, failing_times(&calls, 3), None)
        .await;

    assert_eq!(result.unwrap(), "recovered");
    assert_eq!(calls.get(), 4);
}

#[tokio::test]
async fn retry_budget_is_configurable() {
    let logger = std::sync::Arc::new(resilience_policy::MemoryLogger::new());
    let executor = resilience_policy::PolicyExecutor::builder()
        .max_retries(1)
        .shared_logger(logger.clone())
        .build();
    let calls = Calls::new();

    let result = executor
        .get_with_policy(Strategy::Retry, always_failing(&calls), None)
        .await;

    assert!(result.is_err());
    assert_eq!(calls.get(), 2);
    assert_eq!(logger.count("RetryPolicy invoked"), 1);
}

#[tokio::test]
async fn fallback_substitutes_failed_primary() {
    let (executor, _logger) = default_executor();
    let calls = Calls::new();
    let fallback_calls = Calls::new();

    let result = executor
        .get_with_policy(
            Strategy::Fallback,
            always_failing(&calls),
            Some(succeeding(&fallback_calls, "test")),
        )
        .await;

    assert_eq!(result.unwrap(), "test");
    assert_eq!(calls.get(), 1);
    assert_eq!(fallback_calls.get(), 1);
}

#[tokio::test]
async fn fallback_not_invoked_on_success() {
    let (executor, logger) = default_executor();
    let calls = Calls::new();
    let fallback_calls = Calls::new();

    let result = executor
        .get_with_policy(
            Strategy::Fallback,
            succeeding(&calls, "primary"),
            Some(succeeding(&fallback_calls, "test")),
        )
        .await;

    assert_eq!(result.unwrap(), "primary");
    assert_eq!(fallback_calls.get(), 0);
    assert!(logger.messages().is_empty());
}

/// A failing fallback is terminal and is not retried
#[tokio::test]
async fn fallback_failure_is_terminal() {
    let (executor, logger) = default_executor();
    let calls = Calls::new();
    let fallback_calls = Calls::new();

    let result = executor
        .get_with_policy(
            Strategy::RetryWithFallback,
            always_failing(&calls),
            Some(failing_with(&fallback_calls, "fallback down")),
        )
        .await;

    assert_eq!(result, Err(PolicyError::Operation(Boom("fallback down"))));
    assert_eq!(calls.get(), 4);
    assert_eq!(fallback_calls.get(), 1);
    assert_eq!(logger.count("FallbackPolicy invoked"), 1);
}

#[tokio::test]
async fn retry_with_fallback_prefers_recovered_primary() {
    let (executor, logger) = default_executor();
    let calls = Calls::new();
    let fallback_calls = Calls::new();

    let result = executor
        .get_with_policy(
            Strategy::RetryWithFallback,
            failing_times(&calls, 2),
            Some(succeeding(&fallback_calls, "test")),
        )
        .await;

    assert_eq!(result.unwrap(), "recovered");
    assert_eq!(fallback_calls.get(), 0);
    assert_eq!(logger.count("RetryPolicy invoked"), 2);
    assert_eq!(logger.count("FallbackPolicy invoked"), 0);
}

#[tokio::test]
async fn circuit_breaker_passes_success_through() {
    let (executor, logger) = default_executor();
    let calls = Calls::new();

    let result = executor
        .get_with_policy(Strategy::CircuitBreaker, succeeding(&calls, "value"), None)
        .await;

    assert_eq!(result.unwrap(), "value");
    assert_eq!(executor.circuit_breaker().state().await, CircuitState::Closed);
    assert!(logger.messages().is_empty());
}

/// Breaker counts one failure per call, after retries are exhausted
#[tokio::test]
async fn breaker_sees_one_outcome_per_retried_call() {
    let (executor, _logger) = executor(2, std::time::Duration::from_secs(30));
    let calls = Calls::new();
    let fallback_calls = Calls::new();

    let _ = executor
        .get_with_policy(
            Strategy::CircuitBreakerWithRetryAndFallback,
            always_failing(&calls),
            Some(succeeding(&fallback_calls, "test")),
        )
        .await;

    assert_eq!(calls.get(), 4);
    let metrics = executor.circuit_breaker().metrics().await;
    assert_eq!(metrics.state, CircuitState::Closed);
    assert_eq!(metrics.consecutive_failures, 1);
}

/// Retries that recover count as a success for the breaker
#[tokio::test]
async fn recovered_retry_clears_failures() {
    let (executor, _logger) = executor(2, std::time::Duration::from_secs(30));
    let calls = Calls::new();
    let fallback_calls = Calls::new();

    let _ = executor
        .get_with_policy(
            Strategy::CircuitBreakerWithRetryAndFallback,
            always_failing(&calls),
            Some(succeeding(&fallback_calls, "test")),
        )
        .await;

    let result = executor
        .get_with_policy(
            Strategy::CircuitBreakerWithRetryAndFallback,
            failing_times(&Calls::new(), 3),
            Some(succeeding(&fallback_calls, "test")),
        )
        .await;

    assert_eq!(result.unwrap(), "recovered");
    assert_eq!(executor.circuit_breaker().metrics().await.consecutive_failures, 0);
}

/// Open circuit goes straight to the fallback, without retries
#[tokio::test]
async fn open_circuit_skips_retry_and_uses_fallback() {
    let (executor, logger) = executor(1, std::time::Duration::from_secs(30));
    let calls = Calls::new();
    let fallback_calls = Calls::new();

    executor.circuit_breaker().force_open().await;

    let result = executor
        .get_with_policy(
            Strategy::CircuitBreakerWithRetryAndFallback,
            always_failing(&calls),
            Some(succeeding(&fallback_calls, "test")),
        )
        .await;

    assert_eq!(result.unwrap(), "test");
    assert_eq!(calls.get(), 0);
    assert_eq!(fallback_calls.get(), 1);
    assert_eq!(logger.count("RetryPolicy invoked"), 0);
}
