use resilience_policy_core::ResilienceEvent;
use std::time::Instant;

/// How a single call through the fallback service went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackOutcome {
    /// The primary succeeded; the fallback was not needed.
    PrimarySucceeded,
    /// The primary failed and the fallback is about to run.
    Invoked,
    /// The fallback produced the result returned to the caller.
    Recovered,
    /// The fallback itself failed.
    FallbackFailed,
    /// The primary's error is not handled by this fallback and was propagated.
    Unhandled,
}

impl FallbackOutcome {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            FallbackOutcome::PrimarySucceeded => "primary_succeeded",
            FallbackOutcome::Invoked => "invoked",
            FallbackOutcome::Recovered => "recovered",
            FallbackOutcome::FallbackFailed => "fallback_failed",
            FallbackOutcome::Unhandled => "unhandled",
        }
    }
}

/// Event emitted by the fallback service.
#[derive(Debug, Clone)]
pub struct FallbackEvent {
    /// Name of the fallback instance.
    pub pattern_name: String,
    /// When the event occurred.
    pub timestamp: Instant,
    /// What happened.
    pub outcome: FallbackOutcome,
}

impl FallbackEvent {
    pub(crate) fn now(pattern_name: &str, outcome: FallbackOutcome) -> Self {
        Self {
            pattern_name: pattern_name.to_string(),
            timestamp: Instant::now(),
            outcome,
        }
    }
}

impl ResilienceEvent for FallbackEvent {
    fn event_type(&self) -> &'static str {
        self.outcome.as_str()
    }

    fn timestamp(&self) -> Instant {
        self.timestamp
    }

    fn pattern_name(&self) -> &str {
        &self.pattern_name
    }
}
