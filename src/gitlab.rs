//! GitLab REST client for locating cucumber test repositories and fetching
//! raw files from them.
//!
//! Requests are blocking and sequential. Project searches are followed by a
//! fixed pause so a long batch stays under the server's rate limit; there
//! are no retries.
use crate::config::Settings;
use crate::error::HarvestError;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::thread::sleep;
use std::time::{Duration, Instant};
use ureq::Agent;
use url::Url;

/// Source of repositories and their files, keyed by API number.
pub trait RepoSource {
    /// Name of the cucumber test repository for `api_number`, if any.
    fn find_repo_by_api_number(&self, api_number: &str) -> Result<Option<String>>;
    /// Project id of the repository named exactly `repo_name`.
    fn repo_id(&self, repo_name: &str) -> Result<Option<u64>>;
    /// Raw file content; a missing file is [`HarvestError::NotFound`].
    fn fetch_raw(&self, repo_id: u64, file_path: &str) -> Result<String>;
}

pub fn feature_repo_path(api_number: &str) -> String {
    format!("src/test/resources/features/{api_number}.feature")
}

pub fn payload_repo_path(api_number: &str, payload: &str) -> String {
    format!("src/test/resources/{api_number}/request/{payload}")
}

pub fn definition_repo_path(api_number: &str) -> String {
    format!("src/test/resources/{api_number}.yml")
}

/// Project search result; extra fields are ignored.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub id: u64,
    pub name: String,
}

/// First project named `<api_number>...<suffix>`.
pub fn select_test_repo<'a>(
    projects: &'a [Project],
    api_number: &str,
    suffix: &str,
) -> Option<&'a Project> {
    projects
        .iter()
        .find(|project| {
            project.name.starts_with(api_number) && project.name.trim().ends_with(suffix)
        })
}

pub struct GitlabClient {
    agent: Agent,
    base_url: String,
    token: String,
    branch: String,
    repo_suffix: String,
    throttle: Duration,
}

impl GitlabClient {
    pub fn new(settings: &Settings) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(settings.timeout))
            .http_status_as_error(false)
            .build();
        Self {
            agent: Agent::new_with_config(config),
            base_url: settings.gitlab_url.clone(),
            token: settings.token.clone(),
            branch: settings.branch.clone(),
            repo_suffix: settings.repo_suffix.clone(),
            throttle: settings.throttle,
        }
    }

    fn api_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("parse GitLab URL {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("GitLab URL {} cannot take a path", self.base_url))?
            .pop_if_empty()
            .extend(["api", "v4"])
            .extend(segments);
        Ok(url)
    }

    pub fn search_url(&self, term: &str) -> Result<Url> {
        let mut url = self.api_url(&["projects"])?;
        url.query_pairs_mut()
            .append_pair("search", term)
            .append_pair("per_page", "100");
        Ok(url)
    }

    /// `file_path` is sent as a single percent-encoded segment.
    pub fn raw_file_url(&self, repo_id: u64, file_path: &str) -> Result<Url> {
        let id = repo_id.to_string();
        let mut url =
            self.api_url(&["projects", id.as_str(), "repository", "files", file_path, "raw"])?;
        url.query_pairs_mut().append_pair("ref", &self.branch);
        Ok(url)
    }

    fn pace(&self) {
        if !self.throttle.is_zero() {
            sleep(self.throttle);
        }
    }

    /// GET `url`; `Ok(None)` for a non-success status.
    fn get_text(&self, url: &Url) -> Result<Option<String>> {
        let start = Instant::now();
        let mut response = self
            .agent
            .get(url.as_str())
            .header("PRIVATE-TOKEN", self.token.as_str())
            .call()
            .with_context(|| format!("GET {}", redact(url)))?;
        let status = response.status();
        tracing::debug!(
            url = %redact(url),
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "gitlab request complete"
        );
        if !status.is_success() {
            tracing::warn!(url = %redact(url), status = status.as_u16(), "gitlab request failed");
            return Ok(None);
        }
        let body = response
            .body_mut()
            .read_to_string()
            .with_context(|| format!("read body of {}", redact(url)))?;
        Ok(Some(body))
    }

    fn search_projects(&self, term: &str) -> Result<Option<Vec<Project>>> {
        let url = self.search_url(term)?;
        let body = self.get_text(&url);
        self.pace();
        let Some(body) = body? else {
            return Ok(None);
        };
        let projects: Vec<Project> = serde_json::from_str(&body)
            .with_context(|| format!("parse project search results for {term:?}"))?;
        Ok(Some(projects))
    }
}

impl RepoSource for GitlabClient {
    fn find_repo_by_api_number(&self, api_number: &str) -> Result<Option<String>> {
        tracing::info!(api_number, "searching repository");
        let Some(projects) = self.search_projects(api_number)? else {
            return Ok(None);
        };
        let found = select_test_repo(&projects, api_number, &self.repo_suffix)
            .map(|project| project.name.clone());
        match &found {
            Some(repo) => tracing::info!(api_number, repo = %repo, "repository found"),
            None => tracing::warn!(api_number, "no repository found"),
        }
        Ok(found)
    }

    fn repo_id(&self, repo_name: &str) -> Result<Option<u64>> {
        let Some(projects) = self.search_projects(repo_name)? else {
            return Ok(None);
        };
        let id = projects
            .iter()
            .find(|project| project.name == repo_name)
            .map(|project| project.id);
        match id {
            Some(id) => tracing::info!(repo = repo_name, id, "repository id resolved"),
            None => tracing::error!(repo = repo_name, "repository id not found"),
        }
        Ok(id)
    }

    fn fetch_raw(&self, repo_id: u64, file_path: &str) -> Result<String> {
        let url = self.raw_file_url(repo_id, file_path)?;
        self.get_text(&url)?.ok_or_else(|| {
            HarvestError::not_found(format!("{file_path} in project {repo_id}")).into()
        })
    }
}

/// URL for logs, without userinfo.
fn redact(url: &Url) -> String {
    let mut shown = url.clone();
    let _ = shown.set_username("");
    let _ = shown.set_password(None);
    shown.to_string()
}
