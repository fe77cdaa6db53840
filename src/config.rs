//! Run configuration and the scenario list.
//!
//! Settings are layered: CLI flags, then `GITLAB_URL` / `GITLAB_TOKEN`, then
//! an optional JSON run config, then built-in defaults. The access token is
//! never read from the config file.
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const GITLAB_URL_ENV: &str = "GITLAB_URL";
pub const GITLAB_TOKEN_ENV: &str = "GITLAB_TOKEN";

/// Optional on-disk run config (`--config`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub gitlab_url: Option<String>,
    pub branch: String,
    /// Pause after each project search, in milliseconds.
    pub throttle_ms: u64,
    pub timeout_secs: u64,
    /// Suffix identifying the cucumber test repository of an API.
    pub repo_suffix: String,
    /// Substring marking an internal (`corp`) repository.
    pub corp_marker: String,
    pub output_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            gitlab_url: None,
            branch: "master".to_string(),
            throttle_ms: 2000,
            timeout_secs: 30,
            repo_suffix: "-cucumber-test".to_string(),
            corp_marker: "-corp-".to_string(),
            output_dir: PathBuf::from("."),
        }
    }
}

/// Values supplied on the command line; `None` defers to lower layers.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub gitlab_url: Option<String>,
    pub token: Option<String>,
    pub branch: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub throttle_ms: Option<u64>,
}

/// Fully resolved settings for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub gitlab_url: String,
    pub token: String,
    pub branch: String,
    pub throttle: Duration,
    pub timeout: Duration,
    pub repo_suffix: String,
    pub corp_marker: String,
    pub output_dir: PathBuf,
}

/// One configured test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiScenario {
    pub api_number: String,
    pub sc_no: String,
}

/// Load the run config, or defaults when no path is given.
pub fn load_run_config(path: Option<&Path>) -> Result<RunConfig> {
    let Some(path) = path else {
        return Ok(RunConfig::default());
    };
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: RunConfig = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse run config {}", path.display()))?;
    Ok(config)
}

/// Merge the layers. `env` looks up environment variables.
pub fn resolve_settings(
    config: RunConfig,
    overrides: Overrides,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Settings> {
    let gitlab_url = overrides
        .gitlab_url
        .or_else(|| env(GITLAB_URL_ENV))
        .or(config.gitlab_url)
        .ok_or_else(|| anyhow!("GitLab URL is required (--gitlab-url or {GITLAB_URL_ENV})"))?;
    let token = overrides
        .token
        .or_else(|| env(GITLAB_TOKEN_ENV))
        .ok_or_else(|| anyhow!("GitLab token is required (--token or {GITLAB_TOKEN_ENV})"))?;

    let settings = Settings {
        gitlab_url: gitlab_url.trim_end_matches('/').to_string(),
        token,
        branch: overrides.branch.unwrap_or(config.branch),
        throttle: Duration::from_millis(overrides.throttle_ms.unwrap_or(config.throttle_ms)),
        timeout: Duration::from_secs(config.timeout_secs),
        repo_suffix: config.repo_suffix,
        corp_marker: config.corp_marker,
        output_dir: overrides.output_dir.unwrap_or(config.output_dir),
    };
    validate_settings(&settings)?;
    Ok(settings)
}

pub fn validate_settings(settings: &Settings) -> Result<()> {
    let parsed = url::Url::parse(&settings.gitlab_url)
        .with_context(|| format!("invalid GitLab URL {:?}", settings.gitlab_url))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(anyhow!(
            "GitLab URL must be http or https (got {:?})",
            settings.gitlab_url
        ));
    }
    if settings.token.trim().is_empty() {
        return Err(anyhow!("GitLab token must be non-empty"));
    }
    for (label, value) in [
        ("branch", &settings.branch),
        ("repo_suffix", &settings.repo_suffix),
        ("corp_marker", &settings.corp_marker),
    ] {
        if value.trim().is_empty() {
            return Err(anyhow!("{label} must be non-empty"));
        }
    }
    if settings.timeout.is_zero() {
        return Err(anyhow!("timeout_secs must be greater than zero"));
    }
    Ok(())
}

/// Load the `[{api_number, sc_no}]` list. `.yml`/`.yaml` files are read as
/// YAML, everything else as JSON.
pub fn load_scenarios(path: &Path) -> Result<Vec<ApiScenario>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read scenario list {}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yml" | "yaml")
    );
    let scenarios: Vec<ApiScenario> = if is_yaml {
        serde_yaml::from_str(&text)
            .with_context(|| format!("parse scenario list {}", path.display()))?
    } else {
        serde_json::from_str(&text)
            .with_context(|| format!("parse scenario list {}", path.display()))?
    };
    Ok(scenarios)
}
