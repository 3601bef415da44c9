//! Configuration validation.

use crate::config::{Config, ExportFormat};
use crate::constants::MAX_JOBS;
use crate::error::{Error, Result};
use std::collections::HashSet;

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_formats(&config.defaults.formats)?;
    validate_jobs(config.defaults.jobs)?;
    validate_renderers(config)?;
    Ok(())
}

/// Validate an export format list.
pub fn validate_formats(formats: &[ExportFormat]) -> Result<()> {
    if formats.is_empty() {
        return Err(Error::ConfigValidation {
            message: "at least one export format is required".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for format in formats {
        if !seen.insert(format) {
            return Err(Error::ConfigValidation {
                message: format!("export format '{format}' listed more than once"),
            });
        }
    }

    Ok(())
}

/// Validate the concurrency limit.
pub fn validate_jobs(jobs: usize) -> Result<()> {
    if !(1..=MAX_JOBS).contains(&jobs) {
        return Err(Error::ConfigValidation {
            message: format!("jobs must be between 1 and {MAX_JOBS}, got {jobs}"),
        });
    }
    Ok(())
}

fn validate_renderers(config: &Config) -> Result<()> {
    let required = [
        ("local.binary", &config.local.binary),
        ("container.runtime", &config.container.runtime),
        ("container.image", &config.container.image),
    ];

    for (key, value) in required {
        if value.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: format!("{key} must not be empty"),
            });
        }
    }

    if !config.container.mount_point.starts_with('/') {
        return Err(Error::ConfigValidation {
            message: format!(
                "container.mount_point must be an absolute path, got '{}'",
                config.container.mount_point
            ),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_empty_formats_rejected() {
        assert!(validate_formats(&[]).is_err());
    }

    #[test]
    fn test_duplicate_formats_rejected() {
        let result = validate_formats(&[ExportFormat::Png, ExportFormat::Png]);
        assert!(matches!(result, Err(Error::ConfigValidation { .. })));
    }

    #[test]
    fn test_jobs_bounds() {
        assert!(validate_jobs(0).is_err());
        assert!(validate_jobs(1).is_ok());
        assert!(validate_jobs(MAX_JOBS).is_ok());
        assert!(validate_jobs(MAX_JOBS + 1).is_err());
    }

    #[test]
    fn test_empty_binary_rejected() {
        let mut config = Config::default();
        config.local.binary = "  ".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_relative_mount_point_rejected() {
        let mut config = Config::default();
        config.container.mount_point = "data".to_string();
        assert!(validate_config(&config).is_err());
    }
}
