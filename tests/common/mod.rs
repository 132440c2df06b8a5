#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use portkeeper::adapters::ManualClock;
use portkeeper::{PortProbe, PortService, ProbeVerdict, ServiceConfig};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Host-independent probe: every port is free unless listed, and calls are counted.
#[derive(Default)]
pub struct FakeProbe {
    occupied: HashSet<u16>,
    calls: AtomicUsize,
}

impl FakeProbe {
    pub fn all_free() -> Self {
        Self::default()
    }

    pub fn occupied(ports: impl IntoIterator<Item = u16>) -> Self {
        Self {
            occupied: ports.into_iter().collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PortProbe for FakeProbe {
    fn probe(&self, port: u16) -> ProbeVerdict {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.occupied.contains(&port) {
            ProbeVerdict::Occupied
        } else {
            ProbeVerdict::Free
        }
    }
}

pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
}

pub fn service_with(
    config: &ServiceConfig,
    probe: Arc<FakeProbe>,
) -> (Arc<PortService>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(epoch()));
    let service = PortService::with_parts(config, probe, clock.clone()).unwrap();
    (Arc::new(service), clock)
}
