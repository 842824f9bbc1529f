//! Application configuration file storage (`config.toml`).

use phantom_core::config::AppConfig;
use phantom_core::Result;
use std::path::Path;

/// Loads the app configuration from `config.toml`.
///
/// A missing or empty file yields the defaults; a file that exists but
/// cannot be parsed is reported so the user notices their edit was bad.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    Ok(toml::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.ephemeral_ttl_ms, 15_000);
    }

    #[test]
    fn test_overrides_are_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "ephemeral_ttl_ms = 30000\nmodel = \"gemini-2.0-flash\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.ephemeral_ttl_ms, 30_000);
        assert_eq!(config.model.as_deref(), Some("gemini-2.0-flash"));
    }

    #[test]
    fn test_parse_errors_surface() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "ephemeral_ttl_ms = \"soon\"\n").unwrap();
        assert!(load_config(&path).is_err());
    }
}
