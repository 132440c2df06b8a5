use crate::domain::model::{Allocation, Availability, ProbeVerdict};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// Enumerates ports the host reports as listening.
pub trait HostSocketInspector: Send + Sync {
    fn listening_ports(&self) -> Result<BTreeSet<u16>>;
}

/// Answers whether a single port can be bound right now.
pub trait PortProbe: Send + Sync {
    fn probe(&self, port: u16) -> ProbeVerdict;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Surface handed to the network layer.
#[async_trait]
pub trait PortProvider: Send + Sync {
    async fn allocate(
        &self,
        range_start: Option<i64>,
        range_end: Option<i64>,
    ) -> Result<Option<Allocation>>;
    async fn check_availability(&self, port: u16) -> Result<Availability>;
    async fn release(&self, port: u16) -> Result<bool>;
}
