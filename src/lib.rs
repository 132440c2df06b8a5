pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use app::PortBroker;
pub use config::ServiceConfig;
pub use crate::core::{probe::LayeredProbe, service::PortService};
pub use domain::model::{Allocation, Availability, PortRange, ProbeVerdict, Reservation};
pub use domain::ports::{Clock, HostSocketInspector, PortProbe, PortProvider};
pub use utils::error::{PortError, Result};
