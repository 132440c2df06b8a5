use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortError {
    #[error("Invalid port range {start}-{end}: {reason}")]
    InvalidRange { start: i64, end: i64, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Socket inspector failed: {message}")]
    InspectorError { message: String },

    #[error("Background task failed: {message}")]
    TaskError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    System,
}

impl PortError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PortError::InvalidRange { .. } => ErrorCategory::Input,
            PortError::ConfigError { .. }
            | PortError::InvalidConfigValueError { .. }
            | PortError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            PortError::IoError(_)
            | PortError::SerializationError(_)
            | PortError::InspectorError { .. }
            | PortError::TaskError { .. } => ErrorCategory::System,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => "Use a range with start <= end, both within 0-65535",
            ErrorCategory::Configuration => "Check the configuration file and environment variables",
            ErrorCategory::System => "Check host permissions and retry",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            PortError::InvalidRange { start, end, .. } => {
                format!("端口範圍 {}-{} 無效", start, end)
            }
            PortError::InvalidConfigValueError { field, .. }
            | PortError::ConfigValidationError { field, .. } => {
                format!("配置欄位 {} 無效: {}", field, self)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PortError>;
