use crate::adapters::CommandInspector;
use crate::config::ServiceConfig;
use crate::domain::model::ProbeVerdict;
use crate::domain::ports::{HostSocketInspector, PortProbe};
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{Ipv4Addr, SocketAddr, TcpStream};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    Connected,
    Refused,
    TimedOut,
    Failed(io::ErrorKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    Bound,
    AddrInUse,
    Failed(io::ErrorKind),
}

/// Connect, then bind, then ask the host inspector. The first conclusive
/// stage wins and every inconclusive path ends in `Occupied`.
pub struct LayeredProbe {
    connect_timeout: Duration,
    inspector: Arc<dyn HostSocketInspector>,
}

impl LayeredProbe {
    pub fn new(connect_timeout: Duration, inspector: Arc<dyn HostSocketInspector>) -> Self {
        Self {
            connect_timeout,
            inspector,
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        let inspector = CommandInspector::new(
            config.probe.inspector_command.clone(),
            config.inspector_timeout(),
        );
        Self::new(config.connect_timeout(), Arc::new(inspector))
    }

    pub fn connect_stage(&self, port: u16) -> ConnectOutcome {
        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
        match TcpStream::connect_timeout(&addr, self.connect_timeout) {
            Ok(_) => ConnectOutcome::Connected,
            Err(e) => match e.kind() {
                io::ErrorKind::ConnectionRefused => ConnectOutcome::Refused,
                io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => ConnectOutcome::TimedOut,
                kind => ConnectOutcome::Failed(kind),
            },
        }
    }

    pub fn bind_stage(port: u16) -> BindOutcome {
        match Self::try_listen(port) {
            Ok(()) => BindOutcome::Bound,
            Err(e) if e.kind() == io::ErrorKind::AddrInUse => BindOutcome::AddrInUse,
            Err(e) => BindOutcome::Failed(e.kind()),
        }
    }

    // The socket is dropped on return, releasing the port.
    fn try_listen(port: u16) -> io::Result<()> {
        let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))?;
        socket.set_reuse_address(true)?;
        socket.bind(&SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)).into())?;
        socket.listen(1)?;
        Ok(())
    }

    pub fn decide(
        &self,
        port: u16,
        connect: ConnectOutcome,
        bind: impl FnOnce() -> BindOutcome,
    ) -> ProbeVerdict {
        match connect {
            ConnectOutcome::Connected => {
                tracing::debug!("Port {} accepted a connection", port);
                ProbeVerdict::Occupied
            }
            ConnectOutcome::Failed(kind) => {
                tracing::debug!("Port {} probe inconclusive on connect: {:?}", port, kind);
                ProbeVerdict::Occupied
            }
            ConnectOutcome::Refused | ConnectOutcome::TimedOut => match bind() {
                BindOutcome::Bound => ProbeVerdict::Free,
                BindOutcome::AddrInUse => {
                    tracing::debug!("Port {} refused bind: address in use", port);
                    ProbeVerdict::Occupied
                }
                BindOutcome::Failed(kind) => {
                    tracing::debug!("Port {} bind failed ({:?}), consulting inspector", port, kind);
                    self.consult_inspector(port)
                }
            },
        }
    }

    fn consult_inspector(&self, port: u16) -> ProbeVerdict {
        match self.inspector.listening_ports() {
            Ok(ports) if ports.contains(&port) => ProbeVerdict::Occupied,
            Ok(_) => ProbeVerdict::Free,
            Err(e) => {
                tracing::warn!("⚠️ Socket inspector failed, treating port {} as occupied: {}", port, e);
                ProbeVerdict::Occupied
            }
        }
    }
}

impl PortProbe for LayeredProbe {
    fn probe(&self, port: u16) -> ProbeVerdict {
        if port == 0 {
            return ProbeVerdict::Occupied;
        }
        let connect = self.connect_stage(port);
        self.decide(port, connect, || Self::bind_stage(port))
    }
}
