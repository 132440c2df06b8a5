use crate::utils::error::{PortError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(PortError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PortError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_command(field_name: &str, command: &[String]) -> Result<()> {
    match command.first() {
        Some(program) => validate_non_empty_string(field_name, program),
        None => Err(PortError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: "[]".to_string(),
            reason: "Command needs at least a program name".to_string(),
        }),
    }
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(PortError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("reaper.ttl_seconds", 60, 1).is_ok());
        assert!(validate_positive_number("reaper.ttl_seconds", 0, 1).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("range.default_start", 10000i64, 0, 65535).is_ok());
        assert!(validate_range("range.default_start", -1i64, 0, 65535).is_err());
        assert!(validate_range("range.default_end", 70000i64, 0, 65535).is_err());
    }

    #[test]
    fn test_validate_command() {
        let netstat = vec!["netstat".to_string(), "-tuln".to_string()];
        assert!(validate_command("probe.inspector_command", &netstat).is_ok());
        assert!(validate_command("probe.inspector_command", &[]).is_err());
        assert!(validate_command("probe.inspector_command", &["  ".to_string()]).is_err());
    }
}
