use std::time::Duration;

/// Delay inserted before each retry.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Backoff {
    /// Retry immediately.
    #[default]
    None,
    /// Wait the same duration before every retry.
    Fixed(Duration),
    /// Wait `initial * multiplier^n` before retry `n` (zero-based), capped at `max`.
    ///
    /// A negative or NaN multiplier is treated as zero.
    Exponential {
        initial: Duration,
        multiplier: f64,
        max: Option<Duration>,
    },
}

impl Backoff {
    /// Exponential backoff doubling from `initial`, uncapped.
    pub fn exponential(initial: Duration) -> Self {
        Backoff::Exponential {
            initial,
            multiplier: 2.0,
            max: None,
        }
    }

    /// Returns the delay before the retry with the given zero-based index.
    pub fn delay(&self, retry: usize) -> Duration {
        match self {
            Backoff::None => Duration::ZERO,
            Backoff::Fixed(delay) => *delay,
            Backoff::Exponential {
                initial,
                multiplier,
                max,
            } => {
                let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
                let secs = initial.as_secs_f64() * multiplier.max(0.0).powi(exponent);
                let delay = if secs.is_nan() || secs <= 0.0 {
                    Duration::ZERO
                } else {
                    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
                };
                match max {
                    Some(max) => delay.min(*max),
                    None => delay,
                }
            }
        }
    }
}
