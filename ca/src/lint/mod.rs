//! Post-write syntax checks
//!
//! A `Verifier` knows how to syntax-check files of some extensions. Findings are
//! advisory: they are attached to the write result and never undo the write.

mod node;
mod python;

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::LintConfig;

pub use node::NodeVerifier;
pub use python::PythonVerifier;

/// Outcome of a syntax check, serialized as `lint_check`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LintReport {
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_errors: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LintReport {
    pub fn clean(language: &str) -> Self {
        Self {
            language: language.to_string(),
            has_errors: Some(false),
            message: Some("No syntax errors found".to_string()),
            ..Default::default()
        }
    }

    pub fn failed(language: &str, errors: impl Into<String>) -> Self {
        Self {
            language: language.to_string(),
            has_errors: Some(true),
            errors: Some(errors.into()),
            ..Default::default()
        }
    }

    pub fn timed_out(language: &str) -> Self {
        Self {
            language: language.to_string(),
            error: Some("Lint check timed out".to_string()),
            ..Default::default()
        }
    }
}

/// Syntax checker for one language
#[async_trait]
pub trait Verifier: Send + Sync {
    /// Language name reported in the result
    fn language(&self) -> &'static str;

    /// File extensions handled, without the dot
    fn extensions(&self) -> &'static [&'static str];

    /// Check `path`; None when the checker itself is unavailable
    async fn verify(&self, path: &Path, timeout: Duration) -> Option<LintReport>;
}

/// Run a checker command and map its exit status to a report
///
/// A missing binary yields None so the caller simply omits the check.
pub async fn run_checker(language: &str, mut command: Command, timeout: Duration) -> Option<LintReport> {
    command.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped()).kill_on_drop(true);

    let output = match tokio::time::timeout(timeout, command.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(language, "run_checker: checker binary not found");
            return None;
        }
        Ok(Err(e)) => {
            warn!(language, %e, "Failed to run syntax checker");
            return None;
        }
        Err(_) => {
            debug!(language, ?timeout, "run_checker: timed out");
            return Some(LintReport::timed_out(language));
        }
    };

    if output.status.success() {
        return Some(LintReport::clean(language));
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let errors = if stderr.trim().is_empty() { stdout } else { stderr };
    Some(LintReport::failed(language, errors.trim()))
}

/// Verifiers keyed by extension, gated by the lint config
pub struct VerifierRegistry {
    verifiers: Vec<Box<dyn Verifier>>,
    enabled: bool,
    timeout: Duration,
}

impl VerifierRegistry {
    /// Python and Node checkers
    pub fn standard(config: &LintConfig) -> Self {
        let mut registry = Self::empty(config);
        registry.register(Box::new(PythonVerifier));
        registry.register(Box::new(NodeVerifier));
        registry
    }

    /// No checkers at all (for testing)
    pub fn empty(config: &LintConfig) -> Self {
        Self {
            verifiers: Vec::new(),
            enabled: config.enabled,
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    pub fn register(&mut self, verifier: Box<dyn Verifier>) {
        debug!(language = verifier.language(), "VerifierRegistry::register: called");
        self.verifiers.push(verifier);
    }

    /// Verifier handling the extension of `path`, if any
    pub fn for_path(&self, path: &Path) -> Option<&dyn Verifier> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        self.verifiers
            .iter()
            .find(|v| v.extensions().contains(&ext.as_str()))
            .map(|v| v.as_ref())
    }

    /// Check a freshly written file; None when linting is off or nothing applies
    pub async fn check(&self, path: &Path) -> Option<LintReport> {
        if !self.enabled {
            return None;
        }
        let verifier = self.for_path(path)?;
        debug!(path = %path.display(), language = verifier.language(), "VerifierRegistry::check: called");
        verifier.verify(path, self.timeout).await
    }
}
