use crate::error::QuotaError;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Quota limits, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaConfig {
    #[serde(default = "default_session_call_limit")]
    pub session_call_limit: u64,

    #[serde(default = "default_rate_limit_enabled")]
    pub rate_limit_enabled: bool,

    #[serde(default = "default_calls_per_minute")]
    pub calls_per_minute: u32,
}

fn default_session_call_limit() -> u64 {
    40
}

fn default_rate_limit_enabled() -> bool {
    true
}

fn default_calls_per_minute() -> u32 {
    60
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            session_call_limit: default_session_call_limit(),
            rate_limit_enabled: default_rate_limit_enabled(),
            calls_per_minute: default_calls_per_minute(),
        }
    }
}

/// Granted call slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    /// Calls made this session, including this one.
    pub session_calls: u64,
    pub session_remaining: u64,
}

/// Point-in-time usage counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotaSnapshot {
    pub session_calls: u64,
    pub session_call_limit: u64,
    pub window_calls: usize,
    pub calls_per_minute: u32,
    pub rate_limit_enabled: bool,
}

#[derive(Debug, Default)]
struct QuotaState {
    session_calls: u64,
    window: VecDeque<Instant>,
}

impl QuotaState {
    /// Drop entries that are 60 seconds old or older.
    fn prune(&mut self, now: Instant) {
        while let Some(&ts) = self.window.front() {
            if now.saturating_duration_since(ts) >= RATE_WINDOW {
                self.window.pop_front();
            } else {
                break;
            }
        }
    }
}

const RATE_WINDOW: Duration = Duration::from_secs(60);

/// Sole owner of the session's quota state.
#[derive(Debug)]
pub struct QuotaGuard {
    config: QuotaConfig,
    state: Mutex<QuotaState>,
}

impl QuotaGuard {
    pub fn new(config: QuotaConfig) -> Self {
        Self {
            config,
            state: Mutex::new(QuotaState::default()),
        }
    }

    pub fn config(&self) -> &QuotaConfig {
        &self.config
    }

    /// Admit one provider call now, or refuse it.
    pub fn admit(&self) -> Result<Admission, QuotaError> {
        self.admit_at(Instant::now())
    }

    /// Admit one provider call at `now`.
    ///
    /// Pruning, both checks and recording happen under one lock, so two
    /// racing callers can never both take the last slot.
    pub fn admit_at(&self, now: Instant) -> Result<Admission, QuotaError> {
        let mut state = self.lock();

        if state.session_calls >= self.config.session_call_limit {
            warn!(
                session_calls = state.session_calls,
                ceiling = self.config.session_call_limit,
                "Session call ceiling reached"
            );
            return Err(QuotaError::SessionQuotaExceeded {
                ceiling: self.config.session_call_limit,
            });
        }

        if self.config.rate_limit_enabled {
            state.prune(now);

            if state.window.len() >= self.config.calls_per_minute as usize {
                let retry_after_secs = state
                    .window
                    .front()
                    .map(|oldest| (*oldest + RATE_WINDOW).saturating_duration_since(now))
                    .map(|remaining| remaining.as_millis().div_ceil(1000) as u64)
                    .unwrap_or(0);
                warn!(
                    window_calls = state.window.len(),
                    limit = self.config.calls_per_minute,
                    retry_after_secs,
                    "Per-minute rate limit reached"
                );
                return Err(QuotaError::RateLimited {
                    limit: self.config.calls_per_minute,
                    retry_after_secs,
                });
            }

            state.window.push_back(now);
        }

        state.session_calls += 1;
        let admission = Admission {
            session_calls: state.session_calls,
            session_remaining: self.config.session_call_limit - state.session_calls,
        };
        debug!(
            session_calls = admission.session_calls,
            session_remaining = admission.session_remaining,
            "Call admitted"
        );
        Ok(admission)
    }

    pub fn snapshot(&self) -> QuotaSnapshot {
        self.snapshot_at(Instant::now())
    }

    /// Usage counters as seen at `now`. Does not record anything.
    pub fn snapshot_at(&self, now: Instant) -> QuotaSnapshot {
        let mut state = self.lock();
        state.prune(now);
        QuotaSnapshot {
            session_calls: state.session_calls,
            session_call_limit: self.config.session_call_limit,
            window_calls: state.window.len(),
            calls_per_minute: self.config.calls_per_minute,
            rate_limit_enabled: self.config.rate_limit_enabled,
        }
    }

    fn lock(&self) -> MutexGuard<'_, QuotaState> {
        // The state is updated with plain field writes, so a poisoned lock
        // still holds consistent counters.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for QuotaGuard {
    fn default() -> Self {
        Self::new(QuotaConfig::default())
    }
}
