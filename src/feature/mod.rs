//! Scenario extraction from Cucumber feature files.
//!
//! Only the step shapes used by the API test suites are recognized:
//!
//! ```text
//! When I create a "POST" request with uri params "<uriParams>" and headers "<headers>" ...
//! Then I receive a response with HTTP status code "<status>" and payload "<expected>"
//! Examples:
//!   | tcNo | uriParams | headers | status | expected |
//!   | TC01 | id=1      | none    | 200    | ok.json  |
//! ```
//!
//! The most recent `When`/`Then` skeleton before the matching Examples row is
//! resolved against that row: every field holding `<column>` takes the row's
//! value for that column. The first table row of the file is the header for
//! every table that follows it.
mod line;
mod table;

use crate::error::HarvestError;
use anyhow::{Context, Result};
use line::{classify, first_quoted, keyword_value, quoted_after_label, StepLine};
use regex::Regex;
use serde::Serialize;
use std::path::Path;
use std::sync::LazyLock;
pub use table::ExampleRow;
use table::TableCursor;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<[^<>]+>$").expect("placeholder pattern compiles")
});

const NONE_VALUE: &str = "none";

/// True for values of the exact form `<name>`.
pub fn is_placeholder(value: &str) -> bool {
    PLACEHOLDER.is_match(value)
}

/// Request and expectation fields for one test case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri_params: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_params: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kong_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_http_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_payload: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_headers: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_content_type: Option<String>,
}

impl ScenarioDetails {
    /// Field names paired with their values, in output order.
    pub fn fields(&self) -> [(&'static str, &Option<String>); 11] {
        [
            ("requestType", &self.request_type),
            ("contentType", &self.content_type),
            ("uriParams", &self.uri_params),
            ("queryParams", &self.query_params),
            ("headers", &self.headers),
            ("kongId", &self.kong_id),
            ("payload", &self.payload),
            ("expectedHttpCode", &self.expected_http_code),
            ("expectedPayload", &self.expected_payload),
            ("expectedHeaders", &self.expected_headers),
            ("expectedContentType", &self.expected_content_type),
        ]
    }

    fn fields_mut(&mut self) -> [&mut Option<String>; 11] {
        [
            &mut self.request_type,
            &mut self.content_type,
            &mut self.uri_params,
            &mut self.query_params,
            &mut self.headers,
            &mut self.kong_id,
            &mut self.payload,
            &mut self.expected_http_code,
            &mut self.expected_payload,
            &mut self.expected_headers,
            &mut self.expected_content_type,
        ]
    }

    /// Names of fields still holding a `<placeholder>` value.
    pub fn unresolved(&self) -> Vec<&'static str> {
        self.fields()
            .into_iter()
            .filter(|(_, value)| value.as_deref().is_some_and(is_placeholder))
            .map(|(name, _)| name)
            .collect()
    }

    /// Replace every field equal to `<column>` with the row's value.
    ///
    /// Several fields may share a placeholder; all of them are replaced.
    fn apply_row(&mut self, row: &ExampleRow) {
        for (column, value) in row.iter() {
            let placeholder = format!("<{column}>");
            for field in self.fields_mut() {
                if field.as_deref() == Some(placeholder.as_str()) {
                    tracing::debug!(column, value, "resolved placeholder");
                    *field = Some(value.to_string());
                }
            }
        }
    }
}

#[derive(Default)]
struct ParseState {
    details: ScenarioDetails,
    in_examples: bool,
    table: TableCursor,
}

impl ParseState {
    fn start_examples(&mut self) {
        self.in_examples = true;
    }

    /// `When I create a "<method>" request ...` starts a new skeleton.
    fn begin_skeleton(&mut self, line: &str, line_no: usize) -> Result<(), HarvestError> {
        let request_type = first_quoted(line).ok_or_else(|| {
            HarvestError::format(format!("line {line_no}: request type is not quoted"))
        })?;

        let details = &mut self.details;
        details.request_type = Some(request_type.to_uppercase());
        details.content_type = Some(NONE_VALUE.to_string());
        details.uri_params = Some("<uriParams>".to_string());
        details.query_params = Some("<queryParams>".to_string());
        details.headers = Some("<headers>".to_string());
        details.kong_id = Some("<kong-id>".to_string());
        details.payload = Some(NONE_VALUE.to_string());

        if line.contains("content-type") {
            if let Some(content_type) = quoted_after_label(line, "content-type") {
                details.content_type = Some(content_type.to_string());
            }
        }

        let keyed = [
            ("uri params", &mut details.uri_params),
            ("query params", &mut details.query_params),
            ("headers", &mut details.headers),
            ("kong-config-id", &mut details.kong_id),
        ];
        for (keyword, field) in keyed {
            if let Some(value) = keyword_value(line, keyword, line_no)? {
                *field = Some(value);
            }
        }
        Ok(())
    }

    /// `Then I receive a response with HTTP status code "<code>" ...`.
    fn record_expectations(&mut self, line: &str, line_no: usize) -> Result<(), HarvestError> {
        let details = &mut self.details;
        if let Some(code) = first_quoted(line) {
            let is_numeric = !code.is_empty() && code.bytes().all(|b| b.is_ascii_digit());
            details.expected_http_code = Some(if is_numeric || is_placeholder(code) {
                code.to_string()
            } else {
                format!("<{code}>")
            });
        }

        let keyed = [
            ("payload", &mut details.expected_payload),
            ("headers", &mut details.expected_headers),
            ("content-type", &mut details.expected_content_type),
        ];
        for (keyword, field) in keyed {
            if let Some(value) = keyword_value(line, keyword, line_no)? {
                *field = Some(value);
            }
        }
        Ok(())
    }
}

/// Resolve the scenario whose Examples row has `tcNo == scenario_id`.
pub fn parse(text: &str, scenario_id: &str) -> Result<ScenarioDetails, HarvestError> {
    let mut state = ParseState::default();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();

        match classify(line) {
            StepLine::ExamplesHeader => {
                state.start_examples();
                continue;
            }
            StepLine::When(step) => {
                state.begin_skeleton(step, line_no)?;
                continue;
            }
            StepLine::Then(step) => {
                state.record_expectations(step, line_no)?;
                continue;
            }
            StepLine::Other => {}
        }

        if !state.in_examples || !line.contains('|') {
            continue;
        }
        let Some(row) = state.table.accept(line) else {
            continue;
        };
        if row.is_scenario(scenario_id) {
            tracing::info!(scenario = scenario_id, line = line_no, "test case found");
            state.details.apply_row(&row);
            return Ok(state.details);
        }
    }

    Err(HarvestError::not_found(format!(
        "test case {scenario_id:?} in Examples"
    )))
}

/// Read a feature file from disk and [`parse`] it.
pub fn parse_file(path: &Path, scenario_id: &str) -> Result<ScenarioDetails> {
    tracing::info!(path = %path.display(), scenario = scenario_id, "parsing feature file");
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read feature file {}", path.display()))?;
    let details =
        parse(&text, scenario_id).with_context(|| format!("parse {}", path.display()))?;
    Ok(details)
}

#[cfg(test)]
#[path = "parse_tests.rs"]
mod tests;
