use crate::domain::model::Reservation;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Reservation map plus the last-sweep timestamp. Only ever touched
/// through the service lock.
#[derive(Debug, Default)]
pub struct ReservationTable {
    entries: HashMap<u16, Reservation>,
    last_sweep: Option<DateTime<Utc>>,
}

impl ReservationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, port: u16) -> bool {
        self.entries.contains_key(&port)
    }

    pub fn get(&self, port: u16) -> Option<&Reservation> {
        self.entries.get(&port)
    }

    pub fn insert(&mut self, reservation: Reservation) {
        self.entries.insert(reservation.port, reservation);
    }

    /// Swaps an in-use entry for its released copy.
    pub fn release(&mut self, port: u16) -> bool {
        match self.entries.get(&port) {
            Some(reservation) if reservation.in_use => {
                let released = reservation.released();
                self.entries.insert(port, released);
                true
            }
            _ => false,
        }
    }

    pub fn remove_where(&mut self, mut predicate: impl FnMut(&Reservation) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, reservation| !predicate(reservation));
        before - self.entries.len()
    }

    pub fn last_sweep(&self) -> Option<DateTime<Utc>> {
        self.last_sweep
    }

    pub fn mark_swept(&mut self, at: DateTime<Utc>) {
        self.last_sweep = Some(at);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sorted by port.
    pub fn snapshot(&self) -> Vec<Reservation> {
        let mut reservations: Vec<Reservation> = self.entries.values().cloned().collect();
        reservations.sort_by_key(|r| r.port);
        reservations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_release() {
        let now = Utc::now();
        let mut table = ReservationTable::new();
        table.insert(Reservation::new(10001, now));

        assert!(table.contains(10001));
        assert!(table.release(10001));
        assert!(!table.get(10001).unwrap().in_use);
        assert_eq!(table.get(10001).unwrap().allocated_at, now);

        // already released, and unknown
        assert!(!table.release(10001));
        assert!(!table.release(10002));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_remove_where_counts_evictions() {
        let now = Utc::now();
        let mut table = ReservationTable::new();
        table.insert(Reservation::new(3, now));
        table.insert(Reservation::new(1, now));
        table.insert(Reservation::new(2, now));
        table.release(2);

        assert_eq!(table.remove_where(|r| !r.in_use), 1);
        let ports: Vec<u16> = table.snapshot().iter().map(|r| r.port).collect();
        assert_eq!(ports, vec![1, 3]);
    }
}
