//! Fixed-window, per-client submission limiter held in process memory.
//!
//! This is spam deterrence, not a security control. State lives in one
//! process; separate instances behind a load balancer each keep their own
//! counts. Entries are never evicted, only overwritten when their window
//! has expired.
//!
//! The whole check-and-consume for a key runs under one mutex, so two
//! concurrent requests from the same client cannot both take the last slot.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const DEFAULT_WINDOW: Duration = Duration::from_secs(15 * 60);
pub const DEFAULT_MAX: u32 = 3;

/// Result of [`RateLimiter::check_and_consume`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    /// The client used up its window; `retry_after` is the time left in it.
    Denied { retry_after: Duration },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    count: u32,
    /// `None` when `now + window` is not representable; the window never ends.
    reset_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.reset_at.map_or(true, |reset_at| now < reset_at)
    }
}

#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    max: u32,
    entries: Mutex<HashMap<String, Entry>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW, DEFAULT_MAX)
    }
}

impl RateLimiter {
    pub fn new(window: Duration, max: u32) -> Self {
        Self {
            window,
            max,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Record one attempt for `client` now.
    pub fn check_and_consume(&self, client: Option<&str>) -> Decision {
        self.check_and_consume_at(client, Instant::now())
    }

    /// Record one attempt for `client` at `now`.
    ///
    /// A missing or blank client id is not limited and leaves no entry.
    pub fn check_and_consume_at(&self, client: Option<&str>, now: Instant) -> Decision {
        let Some(key) = client.map(str::trim).filter(|k| !k.is_empty()) else {
            return Decision::Allowed;
        };

        // A poisoned lock only means another request panicked mid-update;
        // the counts are still usable.
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        match entries.get_mut(key) {
            Some(entry) if entry.is_live(now) => {
                if entry.count >= self.max {
                    let retry_after = entry
                        .reset_at
                        .map_or(self.window, |reset_at| reset_at - now);
                    return Decision::Denied { retry_after };
                }
                entry.count += 1;
                Decision::Allowed
            }
            _ => {
                entries.insert(
                    key.to_string(),
                    Entry {
                        count: 1,
                        reset_at: now.checked_add(self.window),
                    },
                );
                Decision::Allowed
            }
        }
    }

    /// Number of tracked clients, including stale ones.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .map(|e| e.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_allows_max_then_denies() {
        let limiter = RateLimiter::default();
        let t0 = Instant::now();
        let ip = Some("203.0.113.7");

        for i in 0..3 {
            let at = t0 + Duration::from_secs(i * 60);
            assert_eq!(limiter.check_and_consume_at(ip, at), Decision::Allowed);
        }

        let fourth = limiter.check_and_consume_at(ip, t0 + Duration::from_secs(600));
        assert_eq!(
            fourth,
            Decision::Denied {
                retry_after: Duration::from_secs(300)
            }
        );
    }

    #[test]
    fn test_window_resets() {
        let limiter = RateLimiter::default();
        let t0 = Instant::now();
        let ip = Some("203.0.113.7");
        for _ in 0..3 {
            limiter.check_and_consume_at(ip, t0);
        }
        assert!(!limiter.check_and_consume_at(ip, t0).is_allowed());

        let later = t0 + DEFAULT_WINDOW + Duration::from_secs(1);
        assert!(limiter.check_and_consume_at(ip, later).is_allowed());
        // Fresh window: two more fit, then denied again.
        assert!(limiter.check_and_consume_at(ip, later).is_allowed());
        assert!(limiter.check_and_consume_at(ip, later).is_allowed());
        assert!(!limiter.check_and_consume_at(ip, later).is_allowed());
    }

    #[test]
    fn test_huge_window_does_not_overflow() {
        let limiter = RateLimiter::new(Duration::MAX, 1);
        let t0 = Instant::now();
        assert!(limiter.check_and_consume_at(Some("a"), t0).is_allowed());
        assert_eq!(
            limiter.check_and_consume_at(Some("a"), t0),
            Decision::Denied {
                retry_after: Duration::MAX
            }
        );
    }

    #[test]
    fn test_clients_are_independent() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 1);
        let t0 = Instant::now();
        assert!(limiter.check_and_consume_at(Some("a"), t0).is_allowed());
        assert!(!limiter.check_and_consume_at(Some("a"), t0).is_allowed());
        assert!(limiter.check_and_consume_at(Some("b"), t0).is_allowed());
        assert_eq!(limiter.len(), 2);
    }

    #[test]
    fn test_unknown_client_fails_open() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 1);
        for _ in 0..5 {
            assert!(limiter.check_and_consume(None).is_allowed());
            assert!(limiter.check_and_consume(Some("   ")).is_allowed());
        }
        assert!(limiter.is_empty());
    }

    #[test]
    fn test_concurrent_same_key_never_exceeds_max() {
        use std::sync::Arc;
        use std::thread;

        let limiter = Arc::new(RateLimiter::new(Duration::from_secs(60), 3));
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                thread::spawn(move || limiter.check_and_consume(Some("shared")).is_allowed())
            })
            .collect();
        let allowed = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(allowed, 3);
    }
}
