mod common;

use chrono::Duration;
use common::{service_with, FakeProbe};
use portkeeper::ServiceConfig;
use std::sync::Arc;

fn config(ttl_seconds: u64, sweep_interval_seconds: Option<u64>) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.reaper.ttl_seconds = ttl_seconds;
    config.reaper.sweep_interval_seconds = sweep_interval_seconds;
    config
}

#[test]
fn test_released_expired_entry_is_reaped() {
    let (service, clock) = service_with(&config(60, None), Arc::new(FakeProbe::all_free()));

    service.allocate(Some(31000), Some(31000)).unwrap().unwrap();
    service.allocate(Some(31001), Some(31001)).unwrap().unwrap();
    assert!(service.release(31000));

    clock.advance(Duration::seconds(61));
    // any operation triggers the sweep
    assert!(!service.is_available(31001));

    assert!(service.reservation(31000).is_none(), "released entry should be evicted");
    let kept = service.reservation(31001).unwrap();
    assert!(kept.in_use, "in-use entry of the same age must be retained");
}

#[test]
fn test_reaped_port_can_be_allocated_again() {
    let (service, clock) = service_with(&config(60, None), Arc::new(FakeProbe::all_free()));

    service.allocate(Some(32000), Some(32000)).unwrap().unwrap();
    service.release(32000);
    assert_eq!(service.allocate(Some(32000), Some(32000)).unwrap(), None);

    clock.advance(Duration::seconds(60));
    let again = service.allocate(Some(32000), Some(32000)).unwrap().unwrap();
    assert_eq!(again.port, 32000);
    assert!(again.in_use);
}

#[test]
fn test_sweep_is_throttled() {
    // TTL shorter than the sweep interval so an entry can expire while throttled
    let (service, clock) = service_with(&config(10, Some(60)), Arc::new(FakeProbe::all_free()));

    // first operation sweeps at t=0
    service.allocate(Some(33000), Some(33000)).unwrap().unwrap();
    service.release(33000);

    clock.advance(Duration::seconds(20));
    service.check_availability(33001);
    service.check_availability(33002);
    assert!(
        service.reservation(33000).is_some(),
        "no sweep may run within one interval of the last"
    );

    clock.advance(Duration::seconds(40));
    service.check_availability(33001);
    assert!(service.reservation(33000).is_none());
}

#[test]
fn test_in_use_entries_survive_many_sweeps() {
    let (service, clock) = service_with(&config(5, None), Arc::new(FakeProbe::all_free()));
    service.allocate(Some(34000), Some(34000)).unwrap().unwrap();

    for _ in 0..10 {
        clock.advance(Duration::seconds(10));
        service.check_availability(34001);
    }

    assert!(service.reservation(34000).unwrap().in_use);
    assert_eq!(service.ttl(), Duration::seconds(5));
}
