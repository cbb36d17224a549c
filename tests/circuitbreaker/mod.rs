//! Tests for the circuit breaker used on its own.
//!
//! Test organization:
//! - integration.rs: the breaker as a Tower layer
//! - half_open.rs: trial call handling after the break
//! - reset.rs: manual isolation and reset
//! - listeners.rs: event callbacks
//! - concurrency.rs: shared breaker under concurrent calls
