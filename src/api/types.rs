//! Shared state for the triage HTTP API.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::triage::TriageOrchestrator;

const PER_MINUTE: u32 = 60;
const PER_HOUR: u32 = 600;

/// Keys tracked before idle windows are swept.
const SWEEP_THRESHOLD: usize = 10_000;

// ═══════════════════════════════════════════════════════════
// API context
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub orchestrator: Arc<TriageOrchestrator>,
    pub rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl ApiContext {
    pub fn new(orchestrator: TriageOrchestrator) -> Self {
        Self::with_rate_limiter(orchestrator, RateLimiter::new())
    }

    pub fn with_rate_limiter(orchestrator: TriageOrchestrator, limiter: RateLimiter) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            rate_limiter: Arc::new(Mutex::new(limiter)),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Rate limiter
// ═══════════════════════════════════════════════════════════

/// Sliding-window rate limiter keyed by client address.
pub struct RateLimiter {
    windows: HashMap<String, Vec<Instant>>,
    per_minute: u32,
    per_hour: u32,
}

impl RateLimiter {
    /// 60 requests per minute, 600 per hour.
    pub fn new() -> Self {
        Self::with_limits(PER_MINUTE, PER_HOUR)
    }

    pub fn with_limits(per_minute: u32, per_hour: u32) -> Self {
        Self {
            windows: HashMap::new(),
            per_minute,
            per_hour,
        }
    }

    /// Check if a client is within rate limits. Returns `Ok(())` or
    /// `Err(retry_after_secs)` if exceeded.
    pub fn check(&mut self, key: &str) -> Result<(), u64> {
        let now = Instant::now();
        if self.windows.len() > SWEEP_THRESHOLD {
            self.sweep(now);
        }

        let entries = self.windows.entry(key.to_string()).or_default();

        // Clean entries older than 1 hour
        entries.retain(|ts| now.duration_since(*ts) < Duration::from_secs(3600));

        let last_minute = entries
            .iter()
            .filter(|ts| now.duration_since(**ts) < Duration::from_secs(60))
            .count() as u32;
        if last_minute >= self.per_minute {
            return Err(60);
        }

        if entries.len() as u32 >= self.per_hour {
            return Err(3600);
        }

        entries.push(now);
        Ok(())
    }

    /// Number of clients currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }

    fn sweep(&mut self, now: Instant) {
        self.windows.retain(|_, entries| {
            entries
                .last()
                .is_some_and(|ts| now.duration_since(*ts) < Duration::from_secs(3600))
        });
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
