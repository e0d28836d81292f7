//! Python syntax check via `compile()`, no bytecode written

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use super::{LintReport, Verifier, run_checker};

const COMPILE_SNIPPET: &str =
    "import sys; compile(open(sys.argv[1], encoding='utf-8').read(), sys.argv[1], 'exec')";

pub struct PythonVerifier;

#[async_trait]
impl Verifier for PythonVerifier {
    fn language(&self) -> &'static str {
        "python"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["py"]
    }

    async fn verify(&self, path: &Path, timeout: Duration) -> Option<LintReport> {
        let mut command = Command::new("python3");
        command.arg("-c").arg(COMPILE_SNIPPET).arg(path);
        run_checker(self.language(), command, timeout).await
    }
}
