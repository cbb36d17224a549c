//! Shared helpers for executor tests.

use resilience_policy::{MemoryLogger, Operation, PolicyExecutor, operation};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Error returned by the test operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boom(pub &'static str);

impl fmt::Display for Boom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl std::error::Error for Boom {}

/// Counts invocations of an operation.
#[derive(Debug, Clone, Default)]
pub struct Calls(Arc<AtomicUsize>);

impl Calls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn next(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst)
    }
}

/// An operation that always fails with `"BOEM"`.
pub fn always_failing(calls: &Calls) -> Operation<String, Boom> {
    failing_with(calls, "BOEM")
}

/// An operation that always fails with `message`.
pub fn failing_with(calls: &Calls, message: &'static str) -> Operation<String, Boom> {
    let calls = calls.clone();
    operation(move || {
        calls.next();
        async move { Err(Boom(message)) }
    })
}

/// An operation that always returns `value`.
pub fn succeeding(calls: &Calls, value: &'static str) -> Operation<String, Boom> {
    let calls = calls.clone();
    operation(move || {
        calls.next();
        async move { Ok(value.to_string()) }
    })
}

/// An operation failing its first `failures` invocations, then returning `"recovered"`.
pub fn failing_times(calls: &Calls, failures: usize) -> Operation<String, Boom> {
    let calls = calls.clone();
    operation(move || {
        let n = calls.next();
        async move {
            if n < failures {
                Err(Boom("BOEM"))
            } else {
                Ok("recovered".to_string())
            }
        }
    })
}

/// An executor with the given threshold and break duration, logging to memory.
pub fn executor(threshold: usize, break_duration: Duration) -> (PolicyExecutor, Arc<MemoryLogger>) {
    let logger = Arc::new(MemoryLogger::new());
    let executor = PolicyExecutor::builder()
        .failure_threshold(threshold)
        .break_duration(break_duration)
        .shared_logger(logger.clone())
        .build();
    (executor, logger)
}

/// An executor with default settings, logging to memory.
pub fn default_executor() -> (PolicyExecutor, Arc<MemoryLogger>) {
    let logger = Arc::new(MemoryLogger::new());
    let executor = PolicyExecutor::builder()
        .shared_logger(logger.clone())
        .build();
    (executor, logger)
}
