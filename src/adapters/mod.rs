// Adapters layer: concrete implementations of the domain ports that touch the host (processes, clock).

pub mod clock;
pub mod inspector;

pub use clock::{ManualClock, SystemClock};
pub use inspector::{CommandInspector, StaticInspector};
