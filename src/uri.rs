//! URI template resolution.
//!
//! Templates come from the per-API YAML definition, e.g.
//! `/individuals/{idType}/{idValue}/benefits?taxYear={taxYear}`. Path
//! placeholders are filled from uri params, query placeholders from query
//! params, and query keys that were never supplied are dropped.
use crate::params::Params;
use url::form_urlencoded;

/// Query param keys whose template placeholder uses a different name.
const QUERY_ALIASES: &[(&str, &str)] = &[("esn", "empSeqNo")];

fn placeholder_name(key: &str) -> &str {
    QUERY_ALIASES
        .iter()
        .find(|(from, _)| *from == key)
        .map(|(_, to)| *to)
        .unwrap_or(key)
}

/// Resolve a URI template. Never fails: unmatched placeholders stay as-is.
pub fn resolve(template: &str, path_params: &Params, query_params: &Params) -> String {
    let mut uri = template.to_string();

    for (key, value) in path_params.iter() {
        uri = uri.replace(&format!("{{{key}}}"), value);
    }

    for (key, value) in query_params.iter() {
        let placeholder = format!("{{{}}}", placeholder_name(key));
        if !uri.contains(&placeholder) {
            continue;
        }
        uri = expand_bare_query_segment(&uri, &placeholder, key, value);
        uri = uri.replace(&placeholder, value);
    }

    retain_query_keys(&uri, query_params)
}

struct UriParts<'a> {
    base: &'a str,
    query: Option<&'a str>,
    fragment: Option<&'a str>,
}

fn split_uri(uri: &str) -> UriParts<'_> {
    let (rest, fragment) = match uri.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (uri, None),
    };
    let (base, query) = match rest.split_once('?') {
        Some((base, query)) => (base, Some(query)),
        None => (rest, None),
    };
    UriParts {
        base,
        query,
        fragment,
    }
}

/// `?{taxYear}` has no key of its own; it becomes `?taxYear=<value>`.
fn expand_bare_query_segment(uri: &str, placeholder: &str, key: &str, value: &str) -> String {
    let parts = split_uri(uri);
    let Some(query) = parts.query else {
        return uri.to_string();
    };
    if !query.split('&').any(|segment| segment == placeholder) {
        return uri.to_string();
    }
    let expanded = query
        .split('&')
        .map(|segment| {
            if segment == placeholder {
                format!("{key}={value}")
            } else {
                segment.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("&");
    assemble(parts.base, &expanded, parts.fragment)
}

fn assemble(base: &str, query: &str, fragment: Option<&str>) -> String {
    let mut out = base.to_string();
    if !query.is_empty() {
        out.push('?');
        out.push_str(query);
    }
    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }
    out
}

/// Decode the query, keep keys present in `query_params`, and re-encode.
///
/// Repeated keys are grouped under their first occurrence and blank values
/// are discarded while decoding.
fn retain_query_keys(uri: &str, query_params: &Params) -> String {
    let parts = split_uri(uri);
    let Some(query) = parts.query else {
        return uri.to_string();
    };

    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if value.is_empty() {
            continue;
        }
        match grouped.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, values)) => values.push(value.into_owned()),
            None => grouped.push((key.into_owned(), vec![value.into_owned()])),
        }
    }

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, values) in grouped
        .iter()
        .filter(|(key, _)| query_params.contains_key(key))
    {
        for value in values {
            serializer.append_pair(key, value);
        }
    }
    let filtered = serializer.finish();

    assemble(parts.base, &filtered, parts.fragment)
}
