//! Batch harvest: one configured (API number, scenario) pair at a time.
//!
//! Per pair: find the cucumber repository, save the feature file, resolve
//! the scenario, fetch its payload and the API definition, resolve the URI,
//! and append a CSV row. Missing repositories and missing artifacts are
//! logged and skipped; parse and format errors fail that pair only unless
//! `fail_fast` is set.
use crate::api_def::ApiDefinition;
use crate::config::ApiScenario;
use crate::error::HarvestError;
use crate::feature::{self, ScenarioDetails};
use crate::gitlab::{definition_repo_path, feature_repo_path, payload_repo_path, RepoSource};
use crate::layout::{OutputLayout, RepoType};
use crate::output::{self, TestCaseRow};
use crate::params;
use crate::uri;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

const NONE_VALUE: &str = "none";
const UNKNOWN_VALUE: &str = "UNKNOWN";

/// How a single pair ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Written { csv_path: PathBuf },
    MissingRepo,
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub api_number: String,
    pub sc_no: String,
    pub error: String,
}

/// Counts for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub processed: usize,
    pub written: usize,
    pub missing_repos: usize,
    pub skipped: usize,
    pub failed: usize,
    pub failures: Vec<Failure>,
}

pub struct Harvester<'a> {
    source: &'a dyn RepoSource,
    layout: OutputLayout,
    corp_marker: String,
}

impl<'a> Harvester<'a> {
    pub fn new(source: &'a dyn RepoSource, layout: OutputLayout, corp_marker: String) -> Self {
        Self {
            source,
            layout,
            corp_marker,
        }
    }

    /// Process every pair in order.
    ///
    /// With `fail_fast` the first failed pair aborts the run with its error.
    pub fn run(&self, scenarios: &[ApiScenario], fail_fast: bool) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for scenario in scenarios {
            summary.processed += 1;
            let start = Instant::now();
            match self.process(scenario) {
                Ok(Outcome::Written { csv_path }) => {
                    summary.written += 1;
                    tracing::info!(
                        api_number = %scenario.api_number,
                        csv = %csv_path.display(),
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "completed processing"
                    );
                }
                Ok(Outcome::MissingRepo) => summary.missing_repos += 1,
                Ok(Outcome::Skipped { reason }) => {
                    summary.skipped += 1;
                    tracing::warn!(api_number = %scenario.api_number, reason = %reason, "skipping");
                }
                Err(err) => {
                    tracing::error!(
                        api_number = %scenario.api_number,
                        scenario = %scenario.sc_no,
                        error = %format!("{err:#}"),
                        "processing failed"
                    );
                    summary.failed += 1;
                    summary.failures.push(Failure {
                        api_number: scenario.api_number.clone(),
                        sc_no: scenario.sc_no.clone(),
                        error: format!("{err:#}"),
                    });
                    if fail_fast {
                        return Err(err.context(format!(
                            "process API {} scenario {}",
                            scenario.api_number, scenario.sc_no
                        )));
                    }
                }
            }
        }
        Ok(summary)
    }

    /// Process one pair. `Err` only for parse/format failures.
    pub fn process(&self, scenario: &ApiScenario) -> Result<Outcome> {
        let api_number = scenario.api_number.as_str();
        tracing::info!(api_number, scenario = %scenario.sc_no, "processing API");

        let repo_name = match self.source.find_repo_by_api_number(api_number) {
            Ok(Some(repo_name)) => repo_name,
            Ok(None) => return self.missing_repo(api_number),
            Err(err) => return Ok(skipped(format!("repository search failed: {err:#}"))),
        };
        let repo_type = RepoType::classify(&repo_name, &self.corp_marker);
        tracing::info!(api_number, repo = %repo_name, repo_type = %repo_type, "repository type");

        let repo_id = match self.source.repo_id(&repo_name) {
            Ok(Some(id)) => id,
            Ok(None) => return self.missing_repo(api_number),
            Err(err) => return Ok(skipped(format!("repository id lookup failed: {err:#}"))),
        };

        let feature_path = self.layout.feature_path(repo_type, api_number);
        match self.source.fetch_raw(repo_id, &feature_repo_path(api_number)) {
            Ok(text) => output::write_text(&feature_path, &text)?,
            Err(err) => return Ok(skipped(format!("feature file unavailable: {err:#}"))),
        }
        tracing::info!(path = %feature_path.display(), "feature file saved");

        let details = feature::parse_file(&feature_path, &scenario.sc_no)?;
        let unresolved = details.unresolved();
        if !unresolved.is_empty() {
            tracing::warn!(api_number, fields = ?unresolved, "unresolved placeholders");
        }

        let payload_file_path = self.fetch_payload(repo_id, api_number, repo_type, &details);

        let definition_text =
            match self.source.fetch_raw(repo_id, &definition_repo_path(api_number)) {
                Ok(text) => text,
                Err(err) => return Ok(skipped(format!("API definition unavailable: {err:#}"))),
            };
        let definition = ApiDefinition::from_yaml(&definition_text)
            .with_context(|| format!("API definition for {api_number}"))?;
        let kong = definition.primary_kong()?;

        let uri_params_raw = details.uri_params.as_deref().unwrap_or(NONE_VALUE);
        let query_params_raw = details.query_params.as_deref().unwrap_or(NONE_VALUE);
        let uri_params = params::decode(uri_params_raw).context("decode uri params")?;
        let query_params = params::decode(query_params_raw).context("decode query params")?;
        tracing::debug!(
            uri_params = %uri_params,
            query_params = %query_params,
            query_param_count = query_params.len(),
            path_params = !uri_params.is_empty(),
            "decoded params"
        );
        let resolved_uri = uri::resolve(&definition.uri, &uri_params, &query_params);
        tracing::info!(api_number, uri = %resolved_uri, "resolved URI");

        let row = TestCaseRow {
            api_number: api_number.to_string(),
            service_name: kong.service_name.clone(),
            consumer_name: kong.consumer_name.clone(),
            tc_no: scenario.sc_no.clone(),
            request_type: or_default(&details.request_type, UNKNOWN_VALUE),
            uri: resolved_uri,
            content_type: or_default(&details.content_type, UNKNOWN_VALUE),
            query_params: query_params_raw.to_string(),
            uri_params: uri_params_raw.to_string(),
            headers: or_default(&details.headers, NONE_VALUE),
            kong_config_id: or_default(&details.kong_id, NONE_VALUE),
            payload_file_path,
            expected_http_code: or_default(&details.expected_http_code, UNKNOWN_VALUE),
        };
        let csv_path = self.layout.csv_path(repo_type);
        output::append_test_case(&csv_path, &row)?;
        Ok(Outcome::Written { csv_path })
    }

    fn missing_repo(&self, api_number: &str) -> Result<Outcome> {
        tracing::warn!(api_number, "skipping API due to missing repository");
        output::log_missing_repo(&self.layout.missing_repos_path(), api_number)?;
        Ok(Outcome::MissingRepo)
    }

    /// Save the scenario's payload locally. Returns its path, or `none` when
    /// there is no payload or it cannot be fetched.
    fn fetch_payload(
        &self,
        repo_id: u64,
        api_number: &str,
        repo_type: RepoType,
        details: &ScenarioDetails,
    ) -> String {
        let payload = match details.payload.as_deref() {
            Some(name) if !name.is_empty() && !name.eq_ignore_ascii_case(NONE_VALUE) => name,
            _ => {
                tracing::info!(api_number, "no payload file required");
                return NONE_VALUE.to_string();
            }
        };
        let local = match self.layout.payload_path(repo_type, api_number, payload) {
            Ok(path) => path,
            Err(err) => {
                tracing::error!(api_number, error = %format!("{err:#}"), "invalid payload name");
                return NONE_VALUE.to_string();
            }
        };
        let saved = self
            .source
            .fetch_raw(repo_id, &payload_repo_path(api_number, payload))
            .and_then(|text| output::write_text(&local, &text));
        match saved {
            Ok(()) => {
                tracing::info!(path = %local.display(), "payload file saved");
                local.display().to_string()
            }
            Err(err) => {
                let missing =
                    matches!(HarvestError::find_in(&err), Some(HarvestError::NotFound(_)));
                tracing::error!(
                    api_number,
                    payload,
                    missing,
                    error = %format!("{err:#}"),
                    "payload fetch failed"
                );
                NONE_VALUE.to_string()
            }
        }
    }
}

fn skipped(reason: String) -> Outcome {
    Outcome::Skipped { reason }
}

fn or_default(value: &Option<String>, default: &str) -> String {
    value.clone().unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
