//! Domain errors shared by the parser, codecs, and GitLab client.
//!
//! Plumbing code works in `anyhow::Result`; these variants survive the
//! wrapping so the workflow can tell a missing artifact from a malformed one.
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HarvestError {
    /// A repository, Examples row, or remote file does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// Input text did not match the expected shape.
    #[error("format error: {0}")]
    Format(String),
}

impl HarvestError {
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::NotFound(detail.into())
    }

    pub fn format(detail: impl Into<String>) -> Self {
        Self::Format(detail.into())
    }

    /// Find a `HarvestError` anywhere in an `anyhow` chain.
    pub fn find_in(err: &anyhow::Error) -> Option<&HarvestError> {
        err.chain().find_map(|cause| cause.downcast_ref::<HarvestError>())
    }
}
