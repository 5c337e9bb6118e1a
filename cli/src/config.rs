//! Runner configuration.
//!
//! Controls how a rendered invocation is executed. Loaded from a YAML file
//! passed with `--config`; every field is optional.
//!
//! # Example YAML
//!
//! ```yaml
//! shell: bash
//! shell_flag: -c
//! timeout_secs: 30
//! capture_output: true
//! ```

use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a [`RunnerConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{}': {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// How to execute a rendered command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Shell used to interpret the command string.
    pub shell: String,
    /// Flag that makes the shell read the command from its argument.
    pub shell_flag: String,
    /// Kill the command after this many seconds.
    pub timeout_secs: Option<u64>,
    /// Capture stdout/stderr and print them after exit, instead of
    /// inheriting the terminal.
    pub capture_output: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            shell: "sh".to_string(),
            shell_flag: "-c".to_string(),
            timeout_secs: None,
            capture_output: true,
        }
    }
}

impl RunnerConfig {
    /// Loads configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: RunnerConfig = serde_yaml::from_str("timeout_secs: 5\n").unwrap();
        assert_eq!(config.timeout_secs, Some(5));
        assert_eq!(config.shell, "sh");
        assert_eq!(config.shell_flag, "-c");
        assert!(config.capture_output);
    }

    #[test]
    fn test_complete_yaml() {
        let yaml = "shell: bash\nshell_flag: -lc\ntimeout_secs: 30\ncapture_output: false\n";
        let config: RunnerConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.shell, "bash");
        assert_eq!(config.shell_flag, "-lc");
        assert!(!config.capture_output);
    }

    #[test]
    fn test_load_missing_file() {
        let err = RunnerConfig::load("/nonexistent/runner.yml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_roundtrip() {
        let dir = std::env::temp_dir().join(format!("command_args_config_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("runner.yml");

        let original = RunnerConfig {
            shell: "bash".into(),
            timeout_secs: Some(3),
            ..RunnerConfig::default()
        };
        std::fs::write(&path, serde_yaml::to_string(&original).unwrap()).unwrap();
        assert_eq!(RunnerConfig::load(&path).unwrap(), original);

        std::fs::remove_dir_all(&dir).ok();
    }
}
