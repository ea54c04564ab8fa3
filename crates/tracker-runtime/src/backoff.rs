//! Reconnect delays for the live-update socket.
//!
//! The delay before attempt *n* (the number of consecutive failures so far)
//! is `min(max, initial * multiplier^n)`, then scaled by a random factor in
//! `[1 - jitter, 1 + jitter]`. A successful open resets *n* to zero.

use std::time::Duration;

use rand::Rng;
use tracker_core::settings::Settings;

/// Default first delay; the dashboard always waited this long.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(3);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);
pub const DEFAULT_MULTIPLIER: f64 = 2.0;
pub const DEFAULT_JITTER: f64 = 0.2;

// ── ReconnectPolicy ───────────────────────────────────────────────────────────

/// Tunables for [`Backoff`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    /// Fraction of the delay randomly added or removed, clamped to `0..=1`.
    pub jitter: f64,
    /// Give up after this many consecutive failures; `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: DEFAULT_INITIAL_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            multiplier: DEFAULT_MULTIPLIER,
            jitter: DEFAULT_JITTER,
            max_attempts: None,
        }
    }
}

impl ReconnectPolicy {
    /// Build a policy from the reconnect flags in `settings`.
    ///
    /// Negative or non-finite durations fall back to the defaults.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            initial_delay: secs_or(settings.reconnect_initial_secs, DEFAULT_INITIAL_DELAY),
            max_delay: secs_or(settings.reconnect_max_secs, DEFAULT_MAX_DELAY),
            max_attempts: settings.reconnect_max_attempts,
            ..Self::default()
        }
    }

    /// Same policy without randomness; handy where delays must be exact.
    pub fn without_jitter(mut self) -> Self {
        self.jitter = 0.0;
        self
    }

    /// The un-jittered delay after `failures` consecutive failures.
    pub fn base_delay(&self, failures: u32) -> Duration {
        let initial = self.initial_delay.as_secs_f64();
        let max = self.max_delay.as_secs_f64().max(initial);
        let exponent = failures.min(i32::MAX as u32) as i32;
        let raw = initial * self.multiplier.max(1.0).powi(exponent);
        Duration::from_secs_f64(if raw.is_finite() { raw.min(max) } else { max })
    }

    /// Apply jitter to `base`; `unit` is a sample from `[-1, 1]`.
    pub fn jittered(&self, base: Duration, unit: f64) -> Duration {
        let jitter = self.jitter.clamp(0.0, 1.0);
        let factor = 1.0 + jitter * unit.clamp(-1.0, 1.0);
        Duration::from_secs_f64((base.as_secs_f64() * factor).max(0.0))
    }
}

fn secs_or(secs: f64, fallback: Duration) -> Duration {
    if secs.is_finite() && secs >= 0.0 {
        Duration::from_secs_f64(secs)
    } else {
        tracing::warn!(secs, "invalid reconnect delay, using default");
        fallback
    }
}

// ── Backoff ───────────────────────────────────────────────────────────────────

/// Consecutive-failure counter that hands out reconnect delays.
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: ReconnectPolicy,
    failures: u32,
}

impl Backoff {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            failures: 0,
        }
    }

    /// Delay before the next attempt, counting this call as one more
    /// failure. `None` once `max_attempts` failures have been handed out.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if let Some(max) = self.policy.max_attempts {
            if self.failures >= max {
                return None;
            }
        }

        let base = self.policy.base_delay(self.failures);
        let delay = if self.policy.jitter > 0.0 {
            let unit = rand::rng().random_range(-1.0..=1.0);
            self.policy.jittered(base, unit)
        } else {
            base
        };

        self.failures = self.failures.saturating_add(1);
        Some(delay)
    }

    /// Forget past failures after a successful open.
    pub fn reset(&mut self) {
        self.failures = 0;
    }

    /// Consecutive failures handed out since the last reset.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
