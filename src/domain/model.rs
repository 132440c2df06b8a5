use crate::utils::error::{PortError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const MIN_PORT: i64 = 0;
pub const MAX_PORT: i64 = 65535;

/// Inclusive port range, validated on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    start: u16,
    end: u16,
}

impl PortRange {
    pub fn new(start: i64, end: i64) -> Result<Self> {
        if start > end {
            return Err(PortError::InvalidRange {
                start,
                end,
                reason: "start port cannot be greater than end port".to_string(),
            });
        }
        if start < MIN_PORT || end > MAX_PORT {
            return Err(PortError::InvalidRange {
                start,
                end,
                reason: format!("ports must be within {}-{}", MIN_PORT, MAX_PORT),
            });
        }
        Ok(Self {
            start: start as u16,
            end: end as u16,
        })
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn end(&self) -> u16 {
        self.end
    }

    /// Candidates in ascending order.
    pub fn ports(&self) -> impl Iterator<Item = u16> {
        self.start..=self.end
    }
}

/// A port claimed by the service. Never mutated once stored; releasing
/// replaces the entry with a released copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub port: u16,
    pub allocated_at: DateTime<Utc>,
    pub in_use: bool,
}

impl Reservation {
    pub fn new(port: u16, allocated_at: DateTime<Utc>) -> Self {
        Self {
            port,
            allocated_at,
            in_use: true,
        }
    }

    pub fn released(&self) -> Self {
        Self {
            in_use: false,
            ..self.clone()
        }
    }

    /// Released and at least `ttl` old.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        !self.in_use && now - self.allocated_at >= ttl
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub port: u16,
    pub allocated_at: DateTime<Utc>,
}

impl From<&Reservation> for Allocation {
    fn from(reservation: &Reservation) -> Self {
        Self {
            port: reservation.port,
            allocated_at: reservation.allocated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub port: u16,
    pub available: bool,
    pub checked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeVerdict {
    Free,
    Occupied,
}

impl ProbeVerdict {
    pub fn is_free(self) -> bool {
        matches!(self, ProbeVerdict::Free)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_port_range_rejects_reversed_bounds() {
        assert!(matches!(
            PortRange::new(100, 50),
            Err(PortError::InvalidRange { start: 100, end: 50, .. })
        ));
    }

    #[test]
    fn test_port_range_rejects_out_of_bounds() {
        assert!(PortRange::new(-1, 100).is_err());
        assert!(PortRange::new(100, 70000).is_err());
        assert!(PortRange::new(0, 65535).is_ok());
    }

    #[test]
    fn test_single_port_range() {
        let range = PortRange::new(8000, 8000).unwrap();
        assert_eq!(range.ports().collect::<Vec<_>>(), vec![8000]);
        assert_eq!((range.start(), range.end()), (8000, 8000));
    }

    #[test]
    fn test_full_range_iterates_to_max_port() {
        let range = PortRange::new(65530, 65535).unwrap();
        assert_eq!(range.ports().count(), 6);
    }

    #[test]
    fn test_reservation_expiry_requires_release() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let ttl = Duration::seconds(60);
        let reservation = Reservation::new(10000, t0);
        let later = t0 + Duration::seconds(61);

        assert!(!reservation.is_expired(later, ttl));
        assert!(reservation.released().is_expired(later, ttl));
        assert!(!reservation.released().is_expired(t0 + Duration::seconds(59), ttl));
    }

    #[test]
    fn test_availability_serializes_snake_case() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let json = serde_json::to_value(Availability {
            port: 10000,
            available: true,
            checked_at: t0,
        })
        .unwrap();
        assert_eq!(json["port"], 10000);
        assert_eq!(json["available"], true);
        assert!(json["checked_at"].as_str().unwrap().starts_with("2024-01-01T00:00:00"));
    }
}
