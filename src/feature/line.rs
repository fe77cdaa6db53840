//! Line classification and tokenizing for feature-file steps.
use crate::error::HarvestError;

const EXAMPLES_PREFIX: &str = "Examples:";
const WHEN_PREFIX: &str = "When I create a ";
const THEN_PREFIX: &str = "Then I receive a response with HTTP status code ";

/// Kind of a trimmed feature-file line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum StepLine<'a> {
    ExamplesHeader,
    When(&'a str),
    Then(&'a str),
    Other,
}

pub(super) fn classify(line: &str) -> StepLine<'_> {
    if line.starts_with(EXAMPLES_PREFIX) {
        StepLine::ExamplesHeader
    } else if line.starts_with(WHEN_PREFIX) {
        StepLine::When(line)
    } else if line.starts_with(THEN_PREFIX) {
        StepLine::Then(line)
    } else {
        StepLine::Other
    }
}

/// First `"`-delimited token. An unterminated quote runs to end of line.
pub(super) fn first_quoted(line: &str) -> Option<&str> {
    line.split('"').nth(1)
}

/// Token following the last quote segment that mentions `label`
/// (case-insensitive), e.g. `with content-type "application/json"`.
pub(super) fn quoted_after_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let label = label.to_lowercase();
    let segments: Vec<&str> = line.split('"').collect();
    segments
        .windows(2)
        .rev()
        .find(|pair| pair[0].to_lowercase().contains(&label))
        .map(|pair| pair[1])
}

/// Whitespace-delimited token after `keyword`, with quotes stripped.
///
/// `Ok(None)` when the line does not mention the keyword at all; an error
/// when it does but nothing follows it.
pub(super) fn keyword_value(
    line: &str,
    keyword: &str,
    line_no: usize,
) -> Result<Option<String>, HarvestError> {
    if !line.contains(keyword) {
        return Ok(None);
    }
    let token = line
        .split_once(&format!("{keyword} "))
        .and_then(|(_, rest)| rest.split_whitespace().next())
        .map(|token| token.trim_matches('"'))
        .ok_or_else(|| {
            HarvestError::format(format!("line {line_no}: `{keyword}` has no value"))
        })?;
    Ok(Some(token.to_string()))
}

/// Non-empty trimmed cells of a `|` table row.
pub(super) fn table_cells(line: &str) -> Vec<&str> {
    line.split('|')
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .collect()
}
