//! Configuration loading for the `crash` binary.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming a config file when `--config` is absent
pub const CONFIG_ENV: &str = "CRASH_CONFIG";
/// Colon-separated override for `excluded_prefixes`
pub const EXCLUDE_ENV: &str = "CRASH_EXCLUDE";

/// Shell settings. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CrashConfig {
    /// Text before the user name in the prompt
    pub prompt_label: String,
    /// Search roots starting with any of these are never walked
    pub excluded_prefixes: Vec<String>,
    /// History file, relative to the working directory at startup
    pub history_file: PathBuf,
    /// Entries kept in the history file
    pub history_limit: usize,
    /// Lines run before the first prompt; `~` expands to `$HOME`
    pub startup_file: String,
    /// Nesting limit for chained and sourced lines
    pub max_depth: usize,
}

impl Default for CrashConfig {
    fn default() -> Self {
        Self {
            prompt_label: "CRASH".to_string(),
            excluded_prefixes: vec!["/mnt/".to_string()],
            history_file: PathBuf::from(".crashHistory"),
            history_limit: 100,
            startup_file: "~/.crash".to_string(),
            max_depth: crash_interpreter::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Errors found during configuration validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl CrashConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for limits that would disable the shell
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "history_limit",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_depth",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Load configuration.
///
/// Reads `path` if given, else the file named by `CRASH_CONFIG`, else starts
/// from defaults. Environment overrides are applied last.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or fails validation
pub fn load_config(path: Option<&Path>) -> anyhow::Result<CrashConfig> {
    let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let path = path.map(Path::to_path_buf).or(from_env);

    let mut config = match path {
        Some(p) => {
            let content = std::fs::read_to_string(&p).map_err(|e| {
                anyhow::anyhow!("failed to read config file '{}': {e}", p.display())
            })?;
            parse_config(&content).map_err(|e| {
                anyhow::anyhow!("failed to parse config file '{}': {e}", p.display())
            })?
        }
        None => CrashConfig::default(),
    };

    apply_env_overrides(&mut config, std::env::var(EXCLUDE_ENV).ok().as_deref());
    config.validate()?;
    Ok(config)
}

/// Parse TOML text into a configuration
///
/// # Errors
///
/// Returns the TOML error for malformed input or unknown keys
pub fn parse_config(content: &str) -> Result<CrashConfig, toml::de::Error> {
    toml::from_str(content)
}

fn apply_env_overrides(config: &mut CrashConfig, exclude: Option<&str>) {
    if let Some(exclude) = exclude {
        config.excluded_prefixes = exclude
            .split(':')
            .filter(|prefix| !prefix.is_empty())
            .map(str::to_string)
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = CrashConfig::default();
        assert_eq!(config.prompt_label, "CRASH");
        assert_eq!(config.excluded_prefixes, vec!["/mnt/"]);
        assert_eq!(config.history_limit, 100);
        assert_eq!(config.history_file, PathBuf::from(".crashHistory"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = parse_config("prompt_label = \"OOPS\"\nmax_depth = 8\n").unwrap();
        assert_eq!(config.prompt_label, "OOPS");
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.history_limit, 100);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(parse_config("colour = true\n").is_err());
    }

    #[test]
    fn test_zero_history_limit_is_invalid() {
        let config = parse_config("history_limit = 0\n").unwrap();
        match config.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "history_limit"),
            other => panic!("Expected InvalidValue error, got {other:?}"),
        }
    }

    #[test]
    fn test_exclude_override() {
        let mut config = CrashConfig::default();
        apply_env_overrides(&mut config, Some("/mnt/:/media/::"));
        assert_eq!(config.excluded_prefixes, vec!["/mnt/", "/media/"]);

        apply_env_overrides(&mut config, None);
        assert_eq!(config.excluded_prefixes, vec!["/mnt/", "/media/"]);
    }

    #[test]
    fn test_load_config_from_file() {
        let file = NamedTempFile::new().unwrap();
        fs::write(&file, "excluded_prefixes = [\"/net/\"]\n").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        // CRASH_EXCLUDE is not set by the test harness
        if std::env::var_os(EXCLUDE_ENV).is_none() {
            assert_eq!(config.excluded_prefixes, vec!["/net/"]);
        }
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Some(Path::new("/definitely/not/crash.toml"))).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
