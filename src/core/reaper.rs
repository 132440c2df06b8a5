use crate::core::table::ReservationTable;
use chrono::{DateTime, Duration, Utc};

/// Throttled sweep of released reservations older than the TTL.
#[derive(Debug, Clone, Copy)]
pub struct Reaper {
    ttl: Duration,
    interval: Duration,
}

impl Reaper {
    pub fn new(ttl: std::time::Duration, interval: std::time::Duration) -> Self {
        Self {
            ttl: Duration::from_std(ttl).unwrap_or(Duration::MAX),
            interval: Duration::from_std(interval).unwrap_or(Duration::MAX),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns `None` when throttled, otherwise the number of evicted entries.
    pub fn run(&self, table: &mut ReservationTable, now: DateTime<Utc>) -> Option<usize> {
        if let Some(last) = table.last_sweep() {
            if now - last < self.interval {
                return None;
            }
        }

        table.mark_swept(now);
        let ttl = self.ttl;
        let evicted = table.remove_where(|reservation| reservation.is_expired(now, ttl));
        if evicted > 0 {
            tracing::debug!("Reaper evicted {} expired reservations", evicted);
        }
        Some(evicted)
    }
}
