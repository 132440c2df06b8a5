use crate::core::service::PortService;
use crate::domain::model::{Allocation, Availability};
use crate::domain::ports::PortProvider;
use crate::utils::error::{PortError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Async handle over a shared [`PortService`]. Probing blocks on sockets and
/// may shell out, so each call runs on the blocking pool.
#[derive(Clone)]
pub struct PortBroker {
    service: Arc<PortService>,
}

impl PortBroker {
    pub fn new(service: Arc<PortService>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &Arc<PortService> {
        &self.service
    }

    async fn run_blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&PortService) -> T + Send + 'static,
    {
        let service = Arc::clone(&self.service);
        tokio::task::spawn_blocking(move || f(&service))
            .await
            .map_err(|e| PortError::TaskError {
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl PortProvider for PortBroker {
    async fn allocate(
        &self,
        range_start: Option<i64>,
        range_end: Option<i64>,
    ) -> Result<Option<Allocation>> {
        let reservation = self
            .run_blocking(move |service| service.allocate(range_start, range_end))
            .await??;
        Ok(reservation.as_ref().map(Allocation::from))
    }

    async fn check_availability(&self, port: u16) -> Result<Availability> {
        self.run_blocking(move |service| service.check_availability(port))
            .await
    }

    async fn release(&self, port: u16) -> Result<bool> {
        self.run_blocking(move |service| service.release(port)).await
    }
}
