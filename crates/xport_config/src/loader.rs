//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ExportConfig;
use std::path::Path;

/// File name of the export configuration inside a run directory.
pub const CONFIG_FILE_NAME: &str = "xport.toml";

/// Loads and validates an `xport.toml` configuration from a run directory.
pub fn load_config(run_dir: &Path) -> Result<ExportConfig, ConfigError> {
    let config_path = run_dir.join(CONFIG_FILE_NAME);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates an `xport.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ExportConfig, ConfigError> {
    let config: ExportConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that tolerances are usable.
fn validate_config(config: &ExportConfig) -> Result<(), ConfigError> {
    check_tolerance("precision.length_tolerance", config.precision.length_tolerance)?;
    check_tolerance("precision.angle_tolerance", config.precision.angle_tolerance)?;
    Ok(())
}

fn check_tolerance(field: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::ValidationError(format!(
            "{field} must be a positive finite number, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml = r#"
[run]
share_site_with_previous_run = true

[lookup]
phase = "New Construction"
default_material = "Concrete"

[precision]
length_tolerance = 0.0001
angle_tolerance = 0.001
"#;
        let config = load_config_from_str(toml).unwrap();
        assert!(config.run.share_site_with_previous_run);
        assert_eq!(config.lookup.phase.as_deref(), Some("New Construction"));
        assert_eq!(config.lookup.default_material.as_deref(), Some("Concrete"));
        assert_eq!(config.precision.length_tolerance, 0.0001);
        assert_eq!(config.precision.angle_tolerance, 0.001);
    }

    #[test]
    fn default_values() {
        let config = load_config_from_str("[run]\n").unwrap();
        assert!(!config.run.share_site_with_previous_run);
        assert!(config.lookup.phase.is_none());
        assert!(config.lookup.default_material.is_none());
        assert_eq!(config.precision.length_tolerance, 1e-6);
    }

    #[test]
    fn zero_tolerance_errors() {
        let toml = r#"
[precision]
length_tolerance = 0.0
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        assert!(err.to_string().contains("length_tolerance"));
    }

    #[test]
    fn negative_angle_tolerance_errors() {
        let toml = r#"
[precision]
angle_tolerance = -1.0
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn wrong_type_errors() {
        let toml = r#"
[run]
share_site_with_previous_run = "yes"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[lookup]\nphase = \"Existing\"\n",
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.lookup.phase.as_deref(), Some("Existing"));
    }

    #[test]
    fn io_error_from_nonexistent_dir() {
        let err = load_config(Path::new("/nonexistent/dir")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
