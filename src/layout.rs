//! Typed paths into the local output tree.
//!
//! ```text
//! <root>/missing_repos.csv
//! <root>/<type>/apis/<api>/<api>.feature
//! <root>/<type>/apis/<api>/payload/<payload>
//! <root>/<type>/csv/<type>_test_data.csv
//! ```
use anyhow::{anyhow, Result};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Repository classification; also the top-level output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoType {
    Corp,
    Dmz,
}

impl RepoType {
    /// `corp` when the repository name contains `marker`, otherwise `dmz`.
    pub fn classify(repo_name: &str, marker: &str) -> Self {
        if repo_name.contains(marker) {
            Self::Corp
        } else {
            Self::Dmz
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Corp => "corp",
            Self::Dmz => "dmz",
        }
    }
}

impl fmt::Display for RepoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn missing_repos_path(&self) -> PathBuf {
        self.root.join("missing_repos.csv")
    }

    pub fn api_dir(&self, repo_type: RepoType, api_number: &str) -> PathBuf {
        self.root
            .join(repo_type.as_str())
            .join("apis")
            .join(api_number)
    }

    pub fn feature_path(&self, repo_type: RepoType, api_number: &str) -> PathBuf {
        self.api_dir(repo_type, api_number)
            .join(format!("{api_number}.feature"))
    }

    /// Local payload path; rejects names that would escape the payload dir.
    pub fn payload_path(
        &self,
        repo_type: RepoType,
        api_number: &str,
        payload: &str,
    ) -> Result<PathBuf> {
        validate_relative_name(payload, "payload")?;
        Ok(self
            .api_dir(repo_type, api_number)
            .join("payload")
            .join(payload))
    }

    pub fn csv_path(&self, repo_type: RepoType) -> PathBuf {
        self.root
            .join(repo_type.as_str())
            .join("csv")
            .join(format!("{repo_type}_test_data.csv"))
    }
}

fn validate_relative_name(name: &str, label: &str) -> Result<()> {
    let path = Path::new(name);
    let escapes = path.is_absolute()
        || path
            .components()
            .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
    if name.trim().is_empty() || escapes {
        return Err(anyhow!(
            "{label} must be a relative path without '..' (got {name:?})"
        ));
    }
    Ok(())
}
