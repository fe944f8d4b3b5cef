//! Minimum-interval gate between search sessions.
//!
//! One throttle is shared by the whole process. A request arriving less than
//! `min_interval` after the last admitted session waits out the remainder; a
//! newer request arriving while one is waiting supersedes it, so rapid
//! re-typing only ever searches the latest query.

use tokio::sync::{watch, Mutex};
use tokio::time::{sleep_until, Duration, Instant};
use tracing::debug;

use crate::metrics::THROTTLE_ADMISSIONS;

/// Default minimum interval between sessions.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(5000);

/// Result of asking the throttle for admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Admitted without waiting.
    Immediate { at: Instant },
    /// Admitted after waiting out the interval.
    Delayed { at: Instant, waited: Duration },
    /// A newer request took this one's place; do not search.
    Superseded,
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        !matches!(self, Admission::Superseded)
    }
}

/// Process-wide session gate.
pub struct SearchThrottle {
    min_interval: Duration,
    last_started_at: Mutex<Option<Instant>>,
    /// Ticket of the most recent `admit` call.
    latest: watch::Sender<u64>,
}

impl SearchThrottle {
    pub fn new(min_interval: Duration) -> Self {
        let (latest, _) = watch::channel(0);
        Self {
            min_interval,
            last_started_at: Mutex::new(None),
            latest,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// When the last admitted session started, if any.
    pub async fn last_started_at(&self) -> Option<Instant> {
        *self.last_started_at.lock().await
    }

    /// Wait until a new session may start.
    ///
    /// Returns [`Admission::Superseded`] as soon as a later call replaces this
    /// one, without waiting for its deadline.
    pub async fn admit(&self) -> Admission {
        let now = Instant::now();

        let (ticket, deadline, mut rx) = {
            let mut last = self.last_started_at.lock().await;

            let mut ticket = 0;
            self.latest.send_modify(|latest| {
                *latest += 1;
                ticket = *latest;
            });

            match *last {
                Some(prev) if now.saturating_duration_since(prev) < self.min_interval => {
                    // Subscribing under the lock: every later ticket bump is
                    // observed as a change.
                    (ticket, prev + self.min_interval, self.latest.subscribe())
                }
                _ => {
                    *last = Some(now);
                    debug!("Search admitted immediately");
                    THROTTLE_ADMISSIONS.with_label_values(&["immediate"]).inc();
                    return Admission::Immediate { at: now };
                }
            }
        };

        debug!(
            wait_ms = deadline.saturating_duration_since(now).as_millis() as u64,
            "Search throttled, scheduling admission"
        );

        let sleep = sleep_until(deadline);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => break,
                changed = rx.changed() => {
                    if changed.is_err() || *rx.borrow_and_update() != ticket {
                        debug!("Scheduled search superseded by a newer request");
                        THROTTLE_ADMISSIONS.with_label_values(&["superseded"]).inc();
                        return Admission::Superseded;
                    }
                }
            }
        }

        let mut last = self.last_started_at.lock().await;
        if *self.latest.borrow() != ticket {
            THROTTLE_ADMISSIONS.with_label_values(&["superseded"]).inc();
            return Admission::Superseded;
        }

        let at = Instant::now();
        *last = Some(at);
        THROTTLE_ADMISSIONS.with_label_values(&["delayed"]).inc();
        Admission::Delayed {
            at,
            waited: at.saturating_duration_since(now),
        }
    }
}

impl Default for SearchThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}
