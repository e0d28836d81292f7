//! ToolContext - execution context shared by all tool calls of one agent run

use std::fs::Metadata;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::config::Config;
use crate::lint::VerifierRegistry;
use crate::state::SystemState;

use super::ToolError;

/// Execution context for tools
///
/// Cheap to clone; every clone shares the same `SystemState`. Commands and
/// file operations run directly on the host; relative paths resolve against
/// the state's current directory.
#[derive(Clone)]
pub struct ToolContext {
    /// Mutable per-run state (cwd, counters, todos, shells)
    pub state: Arc<SystemState>,

    /// Runtime configuration
    pub config: Arc<Config>,

    /// Post-write syntax checkers
    pub verifiers: Arc<VerifierRegistry>,
}

impl ToolContext {
    /// Create a context rooted at `cwd` with default configuration
    pub fn new(cwd: PathBuf) -> Self {
        Self::with_config(cwd, Config::default())
    }

    /// Create a context rooted at `cwd`
    pub fn with_config(cwd: PathBuf, config: Config) -> Self {
        debug!(cwd = %cwd.display(), "ToolContext::with_config: called");
        let verifiers = VerifierRegistry::standard(&config.lint);
        Self::with_verifiers(cwd, config, verifiers)
    }

    /// Create a context with an explicit set of verifiers
    pub fn with_verifiers(cwd: PathBuf, config: Config, verifiers: VerifierRegistry) -> Self {
        let state = SystemState::new(normalize(&cwd), &config);
        Self {
            state: Arc::new(state),
            config: Arc::new(config),
            verifiers: Arc::new(verifiers),
        }
    }

    /// Resolve a user-supplied path to an absolute, lexically normalized one
    ///
    /// A leading `~` expands to the home directory; relative paths are
    /// taken from the current directory.
    pub async fn resolve_path(&self, raw: &str) -> PathBuf {
        let expanded = expand_home(raw);
        let absolute = if expanded.is_absolute() {
            expanded
        } else {
            self.state.current_directory().await.join(expanded)
        };
        let resolved = normalize(&absolute);
        debug!(%raw, resolved = %resolved.display(), "ToolContext::resolve_path: called");
        resolved
    }

    /// Resolve `raw` and require an existing regular file
    pub async fn existing_file(&self, raw: &str) -> Result<(PathBuf, Metadata), ToolError> {
        let path = self.resolve_path(raw).await;
        let metadata = match tokio::fs::metadata(&path).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(ToolError::FileNotFound { path }),
            Err(e) => return Err(ToolError::io("Failed to stat", path, e)),
        };
        if !metadata.is_file() {
            return Err(ToolError::NotAFile { path });
        }
        Ok((path, metadata))
    }

    /// Resolve an optional `raw` path (default: current directory) and require an existing directory
    pub async fn existing_dir(&self, raw: Option<&str>) -> Result<PathBuf, ToolError> {
        let path = match raw {
            Some(raw) => self.resolve_path(raw).await,
            None => self.state.current_directory().await,
        };
        match tokio::fs::metadata(&path).await {
            Ok(m) if m.is_dir() => Ok(path),
            Ok(_) => Err(ToolError::NotADirectory { path }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ToolError::PathNotFound { path }),
            Err(e) => Err(ToolError::io("Failed to stat", path, e)),
        }
    }
}

fn expand_home(raw: &str) -> PathBuf {
    let home = || dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"));
    if raw == "~" {
        return home();
    }
    match raw.strip_prefix("~/") {
        Some(rest) => home().join(rest),
        None => PathBuf::from(raw),
    }
}

/// Normalize a path without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(p) => result.push(p.as_os_str()),
            Component::RootDir => result.push("/"),
            Component::CurDir => {}
            Component::ParentDir => {
                result.pop();
            }
            Component::Normal(c) => result.push(c),
        }
    }
    result
}
