use crate::domain::model::{MAX_PORT, MIN_PORT};
use crate::utils::error::{PortError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_START_PORT: i64 = 10000;
pub const DEFAULT_END_PORT: i64 = 65000;
pub const DEFAULT_TTL_SECONDS: u64 = 60;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 100;
pub const DEFAULT_INSPECTOR_TIMEOUT_MS: u64 = 2000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub range: RangeConfig,
    pub reaper: ReaperConfig,
    pub probe: ProbeConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeConfig {
    pub default_start: i64,
    pub default_end: i64,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            default_start: DEFAULT_START_PORT,
            default_end: DEFAULT_END_PORT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaperConfig {
    pub ttl_seconds: u64,
    pub sweep_interval_seconds: Option<u64>,
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_TTL_SECONDS,
            sweep_interval_seconds: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub connect_timeout_ms: u64,
    pub inspector_command: Vec<String>,
    pub inspector_timeout_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            inspector_command: vec!["netstat".to_string(), "-tuln".to_string()],
            inspector_timeout_ms: DEFAULT_INSPECTOR_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: bool,
}

impl ServiceConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PortError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PortError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PORTKEEPER_TTL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PortError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.reaper.ttl_seconds)
    }

    /// 未設定時與 TTL 相同
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(
            self.reaper
                .sweep_interval_seconds
                .unwrap_or(self.reaper.ttl_seconds),
        )
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.probe.connect_timeout_ms)
    }

    pub fn inspector_timeout(&self) -> Duration {
        Duration::from_millis(self.probe.inspector_timeout_ms)
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_range("range.default_start", self.range.default_start, MIN_PORT, MAX_PORT)?;
        validation::validate_range("range.default_end", self.range.default_end, MIN_PORT, MAX_PORT)?;
        if self.range.default_start > self.range.default_end {
            return Err(PortError::ConfigValidationError {
                field: "range".to_string(),
                message: format!(
                    "default_start {} is greater than default_end {}",
                    self.range.default_start, self.range.default_end
                ),
            });
        }

        validation::validate_positive_number("reaper.ttl_seconds", self.reaper.ttl_seconds, 1)?;
        if let Some(interval) = self.reaper.sweep_interval_seconds {
            validation::validate_positive_number("reaper.sweep_interval_seconds", interval, 1)?;
        }

        validation::validate_positive_number("probe.connect_timeout_ms", self.probe.connect_timeout_ms, 1)?;
        validation::validate_positive_number(
            "probe.inspector_timeout_ms",
            self.probe.inspector_timeout_ms,
            1,
        )?;
        validation::validate_command("probe.inspector_command", &self.probe.inspector_command)?;

        if let Some(level) = &self.logging.level {
            let valid_levels = ["trace", "debug", "info", "warn", "error"];
            if !valid_levels.contains(&level.as_str()) {
                return Err(PortError::InvalidConfigValueError {
                    field: "logging.level".to_string(),
                    value: level.clone(),
                    reason: format!("Valid levels: {}", valid_levels.join(", ")),
                });
            }
        }

        Ok(())
    }
}
