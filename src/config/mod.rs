pub mod toml_config;

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

pub use toml_config::ServiceConfig;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "portkeeper")]
#[command(about = "Reserve free TCP ports on this host")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Reserve free ports from a range
    Allocate {
        #[arg(long, allow_negative_numbers = true)]
        start: Option<i64>,

        #[arg(long, allow_negative_numbers = true)]
        end: Option<i64>,

        /// Number of ports to reserve concurrently. Exits with code 4 when
        /// the range runs out before all of them are served.
        #[arg(long, default_value = "1")]
        count: usize,
    },
    /// Check whether a port can be bound right now
    Check { port: u16 },
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 未指定檔案時使用預設配置
    pub fn load_service_config(&self) -> crate::utils::error::Result<ServiceConfig> {
        match &self.config {
            Some(path) => ServiceConfig::from_file(path),
            None => Ok(ServiceConfig::default()),
        }
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_parse_allocate_command() {
        let cli = CliConfig::parse_from([
            "portkeeper",
            "--verbose",
            "allocate",
            "--start",
            "20000",
            "--end",
            "20010",
            "--count",
            "3",
        ]);

        assert!(cli.verbose);
        match cli.command {
            Command::Allocate { start, end, count } => {
                assert_eq!(start, Some(20000));
                assert_eq!(end, Some(20010));
                assert_eq!(count, 3);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_check_command() {
        let cli = CliConfig::parse_from(["portkeeper", "check", "8080"]);
        assert!(matches!(cli.command, Command::Check { port: 8080 }));
        assert!(cli.load_service_config().is_ok());
    }
}
