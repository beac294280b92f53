//! Retry delays for rate-limited and failed requests.
//!
//! Server hints win: a `Retry-After` delta or date is honored exactly.
//! Without one the delay is `base * 2^attempt` plus uniform jitter, with a
//! wider jitter band for network errors than for 429s.

use chrono::{DateTime, Utc};
use tokio::time::Duration;

use pokedex_core::FetchSettings;

/// Largest exponent applied to the base delay.
const MAX_EXPONENT: u32 = 16;

/// Which kind of failure is being retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryKind {
    RateLimited,
    Network,
}

/// A server-provided wait instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryHint {
    After(Duration),
    At(DateTime<Utc>),
}

impl RetryHint {
    /// Time left to wait as of `now`. A date in the past means no wait.
    pub fn wait_from(&self, now: DateTime<Utc>) -> Duration {
        match self {
            Self::After(d) => *d,
            Self::At(t) => (*t - now).to_std().unwrap_or(Duration::ZERO),
        }
    }
}

/// Parse a `Retry-After` header value (delta-seconds or HTTP-date).
pub fn parse_retry_after(value: &str) -> Option<RetryHint> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(secs) = value.parse::<f64>() {
        if secs < 0.0 {
            return None;
        }
        return Duration::try_from_secs_f64(secs).ok().map(RetryHint::After);
    }
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|t| RetryHint::At(t.with_timezone(&Utc)))
}

#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    /// Retries after the first try. `max_retries + 1` requests at most.
    pub max_retries: u32,
    pub base: Duration,
    pub rate_limit_jitter: Duration,
    pub network_jitter: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from_settings(&FetchSettings::default())
    }
}

impl BackoffPolicy {
    pub fn from_settings(settings: &FetchSettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            base: Duration::from_millis(settings.base_delay_ms),
            rate_limit_jitter: Duration::from_millis(settings.rate_limit_jitter_ms),
            network_jitter: Duration::from_millis(settings.network_jitter_ms),
        }
    }

    /// True when `attempt` (0-based) was the last one allowed.
    pub fn is_last(&self, attempt: u32) -> bool {
        attempt >= self.max_retries
    }

    /// Wait before retrying after the failure of `attempt`.
    pub fn delay(&self, attempt: u32, kind: RetryKind, hint: Option<RetryHint>) -> Duration {
        if let Some(hint) = hint {
            return hint.wait_from(Utc::now());
        }
        self.exponential(attempt) + jitter(self.jitter_bound(kind))
    }

    /// `base * 2^attempt`, without jitter.
    pub fn exponential(&self, attempt: u32) -> Duration {
        self.base
            .saturating_mul(1u32 << attempt.min(MAX_EXPONENT))
    }

    pub fn jitter_bound(&self, kind: RetryKind) -> Duration {
        match kind {
            RetryKind::RateLimited => self.rate_limit_jitter,
            RetryKind::Network => self.network_jitter,
        }
    }
}

/// Uniform random duration in `[0, bound)`.
pub fn jitter(bound: Duration) -> Duration {
    let ms = bound.as_millis() as u64;
    if ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::random_range(0..ms))
}
