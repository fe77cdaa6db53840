//! Flat `key=value,key=value` parameter strings.
//!
//! Feature files carry URI and query parameters in this form. There is no
//! escaping: a `,` or `=` inside a value cannot be represented.
use crate::error::HarvestError;
use std::fmt;

/// Ordered parameter mapping.
///
/// Keys keep their first-seen position; a repeated key takes the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(self))
    }
}

/// Decode a parameter string. Empty input or `none` yields no parameters.
pub fn decode(input: &str) -> Result<Params, HarvestError> {
    if input.is_empty() || input.eq_ignore_ascii_case("none") {
        return Ok(Params::new());
    }
    let mut params = Params::new();
    for piece in input.split(',') {
        let (key, value) = piece.split_once('=').ok_or_else(|| {
            HarvestError::format(format!("parameter {piece:?} in {input:?} has no '='"))
        })?;
        params.insert(key, value);
    }
    Ok(params)
}

/// Serialize back to `key=value,key=value`.
pub fn encode(params: &Params) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(",")
}
