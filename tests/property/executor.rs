//! Property tests for the policy executor.
//!
//! Invariants tested:
//! - Strategies with fallback never fail when the fallback succeeds
//! - Notification counts follow from the strategy's behaviors
//! - None never touches the breaker

use proptest::prelude::*;
use resilience_policy::{
    CircuitState, MemoryLogger, PolicyExecutor, Strategy, FALLBACK_INVOKED, RETRY_INVOKED,
    operation,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::runtime::Runtime;

fn any_strategy() -> impl proptest::strategy::Strategy<Value = Strategy> {
    prop::sample::select(Strategy::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: a single call's notifications match its behaviors
    #[test]
    fn single_call_notifications(strategy in any_strategy(), failures in 0usize..=5) {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let logger = Arc::new(MemoryLogger::new());
            let executor = PolicyExecutor::builder()
                .shared_logger(logger.clone())
                .build();
            let behaviors = strategy.behaviors();

            let calls = Arc::new(AtomicUsize::new(0));
            let c = Arc::clone(&calls);
            let primary = operation(move || {
                let n = c.fetch_add(1, Ordering::SeqCst);
                async move { if n < failures { Err("error") } else { Ok("primary") } }
            });
            let fallback = operation(|| async { Ok("fallback") });

            let result = executor
                .get_with_policy(strategy, primary, Some(fallback))
                .await;

            let attempts = if behaviors.retry { failures.min(3) + 1 } else { 1 };
            let primary_failed = failures >= attempts;

            prop_assert_eq!(calls.load(Ordering::SeqCst), attempts);
            prop_assert_eq!(logger.count(RETRY_INVOKED), attempts - 1);
            prop_assert_eq!(
                logger.count(FALLBACK_INVOKED),
                usize::from(behaviors.fallback && primary_failed)
            );

            match (primary_failed, behaviors.fallback) {
                (false, _) => {
                    prop_assert_eq!(result, Ok("primary"));
                }
                (true, true) => {
                    prop_assert_eq!(result, Ok("fallback"));
                }
                (true, false) => {
                    prop_assert!(result.unwrap_err().is_operation());
                }
            }
            Ok(())
        })?;
    }

    /// Property: only breaker strategies move the circuit
    #[test]
    fn breaker_state_follows_strategy(strategy in any_strategy(), rounds in 1usize..=10) {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let executor = PolicyExecutor::builder().failure_threshold(1).build();

            for _ in 0..rounds {
                let _ = executor
                    .get_with_policy(
                        strategy,
                        operation(|| async { Err::<(), _>("error") }),
                        Some(operation(|| async { Ok(()) })),
                    )
                    .await;
            }

            let expected = if strategy.behaviors().circuit_breaker {
                CircuitState::Open
            } else {
                CircuitState::Closed
            };
            prop_assert_eq!(executor.circuit_breaker().state_sync(), expected);
            Ok(())
        })?;
    }
}
