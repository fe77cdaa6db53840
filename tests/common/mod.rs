//! Shared test infrastructure for integration tests.

use std::env;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Result of one binary invocation.
#[derive(Debug)]
pub struct RunOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl From<Output> for RunOutput {
    fn from(output: Output) -> Self {
        Self {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

fn manifest_dir() -> PathBuf {
    PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".into()))
}

/// Path to a file under tests/fixtures/.
pub fn fixture(name: &str) -> PathBuf {
    manifest_dir().join("tests/fixtures").join(name)
}

/// Scratch directory plus a binary runner with a clean GitLab environment.
pub struct Harness {
    pub temp_dir: TempDir,
}

impl Default for Harness {
    fn default() -> Self {
        Self {
            temp_dir: TempDir::new().expect("create temp dir"),
        }
    }
}

impl Harness {
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `text` under the scratch directory and return its path.
    pub fn write(&self, name: &str, text: &str) -> PathBuf {
        let path = self.path().join(name);
        std::fs::write(&path, text).expect("write scratch file");
        path
    }

    /// Run the binary with `args`; `GITLAB_*` and `RUST_LOG` are cleared.
    pub fn run(&self, args: &[&str]) -> RunOutput {
        Command::new(env!("CARGO_BIN_EXE_feature-harvest"))
            .args(args)
            .current_dir(self.path())
            .env_remove("GITLAB_URL")
            .env_remove("GITLAB_TOKEN")
            .env_remove("RUST_LOG")
            .output()
            .expect("spawn feature-harvest")
            .into()
    }
}
