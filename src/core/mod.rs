pub mod probe;
pub mod reaper;
pub mod service;
pub mod table;

pub use crate::domain::model::{Allocation, Availability, PortRange, ProbeVerdict, Reservation};
pub use crate::domain::ports::{Clock, HostSocketInspector, PortProbe, PortProvider};
pub use crate::utils::error::Result;
