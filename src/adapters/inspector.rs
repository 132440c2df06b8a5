use crate::domain::ports::HostSocketInspector;
use crate::utils::error::{PortError, Result};
use std::collections::BTreeSet;
use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Runs an enumeration command (`netstat -tuln`, `ss -tln`, ...) and parses
/// its listening TCP sockets.
#[derive(Debug, Clone)]
pub struct CommandInspector {
    command: Vec<String>,
    timeout: Duration,
}

impl CommandInspector {
    pub fn new(command: Vec<String>, timeout: Duration) -> Self {
        Self { command, timeout }
    }

    fn run(&self) -> Result<String> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| PortError::InspectorError {
                message: "empty inspector command".to_string(),
            })?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let mut stdout = child.stdout.take().ok_or_else(|| PortError::InspectorError {
            message: format!("{} has no stdout", program),
        })?;

        // 讀取放到獨立執行緒，避免輸出塞滿 pipe 時卡住
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = String::new();
            let result = stdout.read_to_string(&mut buf).map(|_| buf);
            let _ = tx.send(result);
        });

        match rx.recv_timeout(self.timeout) {
            Ok(Ok(output)) => {
                let status = child.wait()?;
                if !status.success() {
                    return Err(PortError::InspectorError {
                        message: format!("{} exited with {}", program, status),
                    });
                }
                Ok(output)
            }
            Ok(Err(e)) => {
                let _ = child.kill();
                let _ = child.wait();
                Err(e.into())
            }
            Err(_) => {
                let _ = child.kill();
                let _ = child.wait();
                Err(PortError::InspectorError {
                    message: format!("{} timed out after {:?}", program, self.timeout),
                })
            }
        }
    }
}

impl HostSocketInspector for CommandInspector {
    fn listening_ports(&self) -> Result<BTreeSet<u16>> {
        let output = self.run()?;
        let ports = parse_listening_ports(&output);
        tracing::debug!("Inspector reported {} listening ports", ports.len());
        Ok(ports)
    }
}

/// Fixed listing, or a forced failure.
#[derive(Debug, Clone, Default)]
pub struct StaticInspector {
    ports: Option<BTreeSet<u16>>,
}

impl StaticInspector {
    pub fn listening(ports: impl IntoIterator<Item = u16>) -> Self {
        Self {
            ports: Some(ports.into_iter().collect()),
        }
    }

    pub fn failing() -> Self {
        Self { ports: None }
    }
}

impl HostSocketInspector for StaticInspector {
    fn listening_ports(&self) -> Result<BTreeSet<u16>> {
        self.ports.clone().ok_or_else(|| PortError::InspectorError {
            message: "static inspector configured to fail".to_string(),
        })
    }
}

/// Accepts netstat (`tcp 0 0 0.0.0.0:22 0.0.0.0:* LISTEN`), BSD netstat
/// (`tcp4 0 0 *.22 *.* LISTEN`), `ss -tln` (`LISTEN 0 128 0.0.0.0:22 ...`)
/// and `ss -tuln` (`tcp LISTEN 0 128 [::]:22 ...`) rows.
pub fn parse_listening_ports(output: &str) -> BTreeSet<u16> {
    output.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<u16> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let first = fields.first()?.to_ascii_lowercase();

    let local = if first == "listen" {
        fields.get(3)?
    } else if first.starts_with("tcp") {
        if fields.get(1) == Some(&"LISTEN") {
            fields.get(4)?
        } else {
            if let Some(state) = fields.get(5) {
                if *state != "LISTEN" {
                    return None;
                }
            }
            fields.get(3)?
        }
    } else {
        return None;
    };

    local.rsplit([':', '.']).next()?.parse().ok()
}
