pub mod broker;

pub use broker::PortBroker;
