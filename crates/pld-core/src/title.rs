//! Validated, ordered list of search titles.
//!
//! Titles arrive from a playlist scraper either as plain strings or as a JSON
//! array. Validation happens up front so that a bad list is rejected before
//! any directory, network or thread activity.

use serde_json::Value;

use crate::error::DownloadError;

/// Non-empty, ordered list of non-blank titles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleList(Vec<String>);

impl TitleList {
    pub fn new<I, S>(titles: I) -> Result<Self, DownloadError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let titles: Vec<String> = titles.into_iter().map(Into::into).collect();
        if titles.is_empty() {
            return Err(DownloadError::Validation(
                "the title list is empty".to_string(),
            ));
        }
        if let Some(pos) = titles.iter().position(|t| t.trim().is_empty()) {
            return Err(DownloadError::Validation(format!(
                "title at position {} is blank",
                pos
            )));
        }
        Ok(TitleList(titles))
    }

    /// Accepts a JSON array of strings. Any non-string element is rejected.
    pub fn from_json(value: &Value) -> Result<Self, DownloadError> {
        let items = value.as_array().ok_or_else(|| {
            DownloadError::Validation(format!("expected a JSON array, got {}", json_kind(value)))
        })?;
        let mut titles = Vec::with_capacity(items.len());
        for (pos, item) in items.iter().enumerate() {
            match item {
                Value::String(s) => titles.push(s.clone()),
                other => {
                    return Err(DownloadError::Validation(format!(
                        "element {} ({}) is not a string",
                        pos, other
                    )))
                }
            }
        }
        Self::new(titles)
    }

    /// One title per line; blank lines and `#` comments are skipped.
    pub fn from_lines(text: &str) -> Result<Self, DownloadError> {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#')),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn position(&self, title: &str) -> Option<usize> {
        self.0.iter().position(|t| t == title)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl<'a> IntoIterator for &'a TitleList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
