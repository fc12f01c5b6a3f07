mod schema;

pub use schema::Config;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.config/convo-score/)
pub fn get_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("convo-score"))
}

/// Get the default config file path (~/.config/convo-score/config.yaml)
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.yaml"))
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses default path
///   (~/.config/convo-score/config.yaml), and a missing default file yields
///   the default configuration.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                anyhow::bail!("Config file not found at {}", p.display());
            }
            p
        }
        None => {
            let default_path = get_config_path()?;
            if !default_path.exists() {
                return Ok(Config::default());
            }
            default_path
        }
    };

    parse_config_file(&config_path)
}

fn parse_config_file(config_path: &Path) -> Result<Config> {
    let config_content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    // An empty file is a valid, empty config
    if config_content.trim().is_empty() {
        return Ok(Config::default());
    }

    let config: Config = serde_saphyr::from_str(&config_content).with_context(|| {
        format!("Failed to parse config: invalid YAML in {}", config_path.display())
    })?;

    Ok(config)
}

/// Resolve the data directory: CLI override, then config, then the config dir
pub fn resolve_data_dir(cli_override: Option<PathBuf>, config: &Config) -> Result<PathBuf> {
    match cli_override.or_else(|| config.data_dir.clone()) {
        Some(dir) => Ok(dir),
        None => get_config_dir(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_missing_config_is_error() {
        let dir = TempDir::new().unwrap();
        let err = load_config(Some(dir.path().join("nope.yaml"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_load_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            r#"
data_dir: /tmp/convo-data
analysis:
  clarity_midpoint: 12
  escalation_fallback_threshold: 3
"#,
        )
        .unwrap();

        let config = load_config(Some(path)).unwrap();
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/convo-data")));
        let analysis = config.analysis.unwrap();
        assert_eq!(analysis.clarity_midpoint, 12.0);
        assert_eq!(analysis.escalation_fallback_threshold, 3);
        assert_eq!(analysis.default_response_time, 5.0);
    }

    #[test]
    fn test_empty_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "\n").unwrap();
        assert_eq!(load_config(Some(path)).unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_yaml_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "analysis: [unterminated").unwrap();
        let err = load_config(Some(path.clone())).unwrap_err();
        assert!(err.to_string().contains(&path.display().to_string()));
    }

    #[test]
    fn test_unknown_top_level_key_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "queries: []\n").unwrap();
        assert!(load_config(Some(path)).is_err());
    }

    #[test]
    fn test_resolve_data_dir_precedence() {
        let config = Config {
            data_dir: Some(PathBuf::from("/from/config")),
            analysis: None,
        };
        assert_eq!(
            resolve_data_dir(Some(PathBuf::from("/from/cli")), &config).unwrap(),
            PathBuf::from("/from/cli")
        );
        assert_eq!(
            resolve_data_dir(None, &config).unwrap(),
            PathBuf::from("/from/config")
        );
    }
}
