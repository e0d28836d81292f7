//! CodeAgent configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Project-local config file name
const LOCAL_CONFIG: &str = ".codeagent.yml";

/// Main CodeAgent configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Initial working directory for the runtime (defaults to the process cwd)
    #[serde(rename = "working-directory")]
    pub working_directory: Option<PathBuf>,

    /// Persistent shell configuration
    pub shell: ShellConfig,

    /// Output size limits
    pub limits: LimitsConfig,

    /// Post-write syntax checking
    pub lint: LintConfig,

    /// System hint rendering
    pub hint: HintConfig,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        for candidate in Self::candidates() {
            if candidate.exists() {
                match Self::load_from_file(&candidate) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {:#}", candidate.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read just the log level, before logging is initialized
    ///
    /// Errors are swallowed here; `load` reports them once logging is up.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let paths = match config_path {
            Some(path) => vec![path.clone()],
            None => Self::candidates(),
        };

        paths
            .into_iter()
            .filter(|path| path.exists())
            .find_map(|path| {
                let content = fs::read_to_string(path).ok()?;
                serde_yaml::from_str::<Self>(&content).ok()
            })
            .and_then(|config| config.log_level)
    }

    /// Optional config locations in priority order: ./.codeagent.yml, then ~/.config/codeagent/codeagent.yml
    fn candidates() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("codeagent").join("codeagent.yml"));
        }
        paths
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Persistent shell configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Shell binary used for sessions and background jobs
    pub program: PathBuf,

    /// Session id used when a Bash call names none
    #[serde(rename = "default-session")]
    pub default_session: String,

    /// Command timeout when the call does not give one
    #[serde(rename = "default-timeout-ms")]
    pub default_timeout_ms: u64,

    /// Upper bound for any requested timeout
    #[serde(rename = "max-timeout-ms")]
    pub max_timeout_ms: u64,

    /// Time between SIGTERM and SIGKILL when stopping a process group
    #[serde(rename = "kill-grace-ms")]
    pub kill_grace_ms: u64,

    /// Directory holding background job logs and pid files
    #[serde(rename = "background-dir")]
    pub background_dir: PathBuf,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("/bin/bash"),
            default_session: "default".to_string(),
            default_timeout_ms: 120_000,
            max_timeout_ms: 600_000,
            kill_grace_ms: 5_000,
            background_dir: PathBuf::from("/tmp"),
        }
    }
}

/// Output size limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Shell output beyond this many characters is truncated
    #[serde(rename = "max-output-chars")]
    pub max_output_chars: usize,

    /// Lines returned by Read when no limit is given
    #[serde(rename = "read-default-limit")]
    pub read_default_limit: usize,

    /// Longer lines are cut by Read
    #[serde(rename = "read-max-line-chars")]
    pub read_max_line_chars: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_output_chars: 30_000,
            read_default_limit: 2_000,
            read_max_line_chars: 2_000,
        }
    }
}

/// Post-write syntax checking
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    pub enabled: bool,

    /// Bound on a single verifier run
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_ms: 5_000,
        }
    }
}

/// System hint rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HintConfig {
    /// Call count at which the hint warns about a repeated tool
    #[serde(rename = "repeat-warning-threshold")]
    pub repeat_warning_threshold: u64,
}

impl Default for HintConfig {
    fn default() -> Self {
        Self {
            repeat_warning_threshold: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.log_level.is_none());
        assert_eq!(config.shell.program, PathBuf::from("/bin/bash"));
        assert_eq!(config.shell.default_session, "default");
        assert_eq!(config.shell.default_timeout_ms, 120_000);
        assert_eq!(config.shell.max_timeout_ms, 600_000);
        assert_eq!(config.limits.max_output_chars, 30_000);
        assert!(config.lint.enabled);
        assert_eq!(config.hint.repeat_warning_threshold, 3);
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
log-level: DEBUG
working-directory: /srv/project

shell:
  program: /usr/bin/bash
  default-session: main
  default-timeout-ms: 1000
  max-timeout-ms: 2000
  kill-grace-ms: 100
  background-dir: /var/tmp

limits:
  max-output-chars: 500
  read-default-limit: 10
  read-max-line-chars: 80

lint:
  enabled: false
  timeout-ms: 250

hint:
  repeat-warning-threshold: 5
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.log_level.as_deref(), Some("DEBUG"));
        assert_eq!(config.working_directory, Some(PathBuf::from("/srv/project")));
        assert_eq!(config.shell.program, PathBuf::from("/usr/bin/bash"));
        assert_eq!(config.shell.default_session, "main");
        assert_eq!(config.shell.kill_grace_ms, 100);
        assert_eq!(config.shell.background_dir, PathBuf::from("/var/tmp"));
        assert_eq!(config.limits.max_output_chars, 500);
        assert_eq!(config.limits.read_max_line_chars, 80);
        assert!(!config.lint.enabled);
        assert_eq!(config.lint.timeout_ms, 250);
        assert_eq!(config.hint.repeat_warning_threshold, 5);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
shell:
  default-timeout-ms: 5000
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.shell.default_timeout_ms, 5000);
        assert_eq!(config.shell.program, PathBuf::from("/bin/bash"));
        assert_eq!(config.limits.read_default_limit, 2_000);
        assert!(config.lint.enabled);
    }

    #[test]
    fn test_load_explicit_path() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("custom.yml");
        fs::write(&path, "log-level: WARN\nhint:\n  repeat-warning-threshold: 7\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.hint.repeat_warning_threshold, 7);
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("WARN"));
    }

    #[test]
    fn test_load_explicit_missing_path_errors() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("missing.yml");

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(format!("{:#}", err).contains("missing.yml"));
        assert!(Config::load_log_level(Some(&path)).is_none());
    }

    #[test]
    fn test_load_explicit_invalid_yaml_errors() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("bad.yml");
        fs::write(&path, "shell: [not, a, map").unwrap();

        assert!(Config::load(Some(&path)).is_err());
    }
}
