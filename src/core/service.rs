use crate::adapters::SystemClock;
use crate::config::ServiceConfig;
use crate::core::probe::LayeredProbe;
use crate::core::reaper::Reaper;
use crate::core::table::ReservationTable;
use crate::domain::model::{Availability, PortRange, Reservation};
use crate::domain::ports::{Clock, PortProbe};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory port allocator.
///
/// Every operation runs inside one critical section: the reaper sweep, the
/// table lookup, the host probe and the insertion all happen under the same
/// lock, so two callers can never be handed the same port.
pub struct PortService {
    table: Mutex<ReservationTable>,
    probe: Arc<dyn PortProbe>,
    clock: Arc<dyn Clock>,
    reaper: Reaper,
    default_start: i64,
    default_end: i64,
}

impl PortService {
    /// Production wiring: layered host probe and the system clock.
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let probe = Arc::new(LayeredProbe::from_config(config));
        Self::with_parts(config, probe, Arc::new(SystemClock))
    }

    pub fn with_parts(
        config: &ServiceConfig,
        probe: Arc<dyn PortProbe>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            table: Mutex::new(ReservationTable::new()),
            probe,
            clock,
            reaper: Reaper::new(config.ttl(), config.sweep_interval()),
            default_start: config.range.default_start,
            default_end: config.range.default_end,
        })
    }

    // Poisoning is recovered: entries are only inserted after a probe
    // completes, so a panic never leaves a half-written table.
    fn lock(&self) -> MutexGuard<'_, ReservationTable> {
        self.table.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_and_reap(&self) -> MutexGuard<'_, ReservationTable> {
        let mut table = self.lock();
        self.reaper.run(&mut table, self.clock.now());
        table
    }

    /// Reserve the lowest free port in `range_start..=range_end`, falling
    /// back to the configured defaults for missing bounds. `Ok(None)` means
    /// every candidate was taken.
    pub fn allocate(
        &self,
        range_start: Option<i64>,
        range_end: Option<i64>,
    ) -> Result<Option<Reservation>> {
        let range = PortRange::new(
            range_start.unwrap_or(self.default_start),
            range_end.unwrap_or(self.default_end),
        )?;
        Ok(self.allocate_range(range))
    }

    pub fn allocate_range(&self, range: PortRange) -> Option<Reservation> {
        let mut table = self.lock_and_reap();

        for port in range.ports() {
            if table.contains(port) {
                continue;
            }
            if self.probe.probe(port).is_free() {
                let reservation = Reservation::new(port, self.clock.now());
                table.insert(reservation.clone());
                tracing::info!("✅ Reserved port {}", port);
                return Some(reservation);
            }
        }

        tracing::info!(
            "No free port in range {}-{}",
            range.start(),
            range.end()
        );
        None
    }

    pub fn is_available(&self, port: u16) -> bool {
        let table = self.lock_and_reap();
        if table.contains(port) {
            return false;
        }
        self.probe.probe(port).is_free()
    }

    pub fn check_availability(&self, port: u16) -> Availability {
        let available = self.is_available(port);
        Availability {
            port,
            available,
            checked_at: self.clock.now(),
        }
    }

    /// Mark a reservation as no longer in use. The port stays reserved until
    /// the reaper evicts it once its TTL has passed.
    pub fn release(&self, port: u16) -> bool {
        let mut table = self.lock_and_reap();
        let released = table.release(port);
        if released {
            tracing::info!("Released port {}", port);
        } else {
            tracing::debug!("Release ignored for untracked or released port {}", port);
        }
        released
    }

    pub fn reservation(&self, port: u16) -> Option<Reservation> {
        self.lock().get(port).cloned()
    }

    pub fn reservations(&self) -> Vec<Reservation> {
        self.lock().snapshot()
    }

    pub fn ttl(&self) -> chrono::Duration {
        self.reaper.ttl()
    }
}
