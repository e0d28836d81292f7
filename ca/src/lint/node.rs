//! JavaScript syntax check via `node --check`

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use super::{LintReport, Verifier, run_checker};

pub struct NodeVerifier;

#[async_trait]
impl Verifier for NodeVerifier {
    fn language(&self) -> &'static str {
        "javascript"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["js", "jsx", "ts", "tsx"]
    }

    async fn verify(&self, path: &Path, timeout: Duration) -> Option<LintReport> {
        let mut command = Command::new("node");
        command.arg("--check").arg(path);
        run_checker(self.language(), command, timeout).await
    }
}
