use log::debug;

use crate::config::types::ViewerConfig;
use crate::config::validation;
use crate::utils::error::{BoxResult, ViewerError};

/// Serialization format of a configuration document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
    Json,
}

impl ConfigFormat {
    /// Guess the format from a file extension; unknown extensions are YAML
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "toml" => ConfigFormat::Toml,
            "json" => ConfigFormat::Json,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// Parse and validate a configuration document.
///
/// Missing sections and keys fall back to their defaults.
pub fn load_config_str(content: &str, format: ConfigFormat) -> BoxResult<ViewerConfig> {
    let config = match format {
        ConfigFormat::Yaml => parse_yaml_config(content)?,
        ConfigFormat::Toml => parse_toml_config(content)?,
        ConfigFormat::Json => parse_json_config(content)?,
    };

    validation::validate_config(&config)?;

    debug!("Configuration loaded: {:?}", config);
    Ok(config)
}

/// Parse a YAML configuration
fn parse_yaml_config(content: &str) -> BoxResult<ViewerConfig> {
    // An empty YAML document deserializes to null, not an empty map
    if content.trim().is_empty() {
        return Ok(ViewerConfig::default());
    }
    serde_yaml::from_str(content)
        .map_err(|e| ViewerError::Config(format!("Failed to parse YAML configuration: {}", e)).into())
}

/// Parse a TOML configuration
fn parse_toml_config(content: &str) -> BoxResult<ViewerConfig> {
    toml::from_str(content)
        .map_err(|e| ViewerError::Config(format!("Failed to parse TOML configuration: {}", e)).into())
}

/// Parse a JSON configuration
fn parse_json_config(content: &str) -> BoxResult<ViewerConfig> {
    serde_json::from_str(content)
        .map_err(|e| ViewerError::Config(format!("Failed to parse JSON configuration: {}", e)).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_overrides_and_defaults() {
        let yaml = "toc:\n  levels: [h2, h3]\n  scroll_offset: 80\nlayout:\n  mobile_breakpoint: 600\n";
        let config = load_config_str(yaml, ConfigFormat::Yaml).unwrap();
        assert_eq!(config.toc.levels, vec!["h2", "h3"]);
        assert_eq!(config.toc.scroll_offset, 80.0);
        assert_eq!(config.toc.highlight_threshold, 100.0);
        assert_eq!(config.layout.mobile_breakpoint, 600.0);
        assert_eq!(config.loader.retry_attempts, 3);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = load_config_str("", ConfigFormat::Yaml).unwrap();
        assert_eq!(config, ViewerConfig::default());
    }

    #[test]
    fn test_toml() {
        let toml = "[loader]\nretry_attempts = 5\nenable_cache = false\n";
        let config = load_config_str(toml, ConfigFormat::Toml).unwrap();
        assert_eq!(config.loader.retry_attempts, 5);
        assert!(!config.loader.enable_cache);
    }

    #[test]
    fn test_json() {
        let json = r#"{"menu": {"animation_ms": 0}, "toc": {"empty_message": "Nothing"}}"#;
        let config = load_config_str(json, ConfigFormat::Json).unwrap();
        assert_eq!(config.menu.animation_ms, 0);
        assert_eq!(config.toc.empty_message, "Nothing");
    }

    #[test]
    fn test_parse_error() {
        let err = load_config_str("toc: [", ConfigFormat::Yaml).unwrap_err();
        assert!(err.to_string().contains("Failed to parse YAML"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = load_config_str("[toc]\nlevels = []\n", ConfigFormat::Toml).unwrap_err();
        assert!(err.to_string().contains("levels"));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_extension("TOML"), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_extension("json"), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_extension("yml"), ConfigFormat::Yaml);
    }
}
