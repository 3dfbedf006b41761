//! Ordered style maps in the draw.io style grammar.
//!
//! draw.io stores cell styles as `key=value;` sequences, while the HTML
//! fragments embedded in entity shapes use CSS `key:value;` declarations.
//! [`Style`] models both: an insertion-ordered map rendered with a
//! caller-chosen assignment character.
//!
//! Entries with an empty value are flags and render as a bare `key;`
//! (for example `edgeLabel;`).
//!
//! # Example
//!
//! ```
//! # use erloom_core::style::Style;
//! let style = Style::from_pairs([("edgeLabel", ""), ("html", "1")]);
//! assert_eq!(style.join('='), "edgeLabel;html=1;");
//!
//! let css = Style::from_pairs([("width", "100%"), ("padding", "2px")]);
//! assert_eq!(css.join(':'), "width:100%;padding:2px;");
//! ```

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Assignment character of draw.io cell styles.
pub const CELL_ASSIGN: char = '=';

/// Assignment character of CSS declarations.
pub const CSS_ASSIGN: char = ':';

/// An insertion-ordered `key -> value` style map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Style {
    entries: IndexMap<String, String>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a style from `(key, value)` pairs, keeping their order.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Parses a joined style string.
    ///
    /// Segments are separated by `;`. A segment without `assign` becomes a
    /// flag entry. Empty segments are skipped and a missing trailing `;` is
    /// tolerated.
    pub fn parse(text: &str, assign: char) -> Self {
        let entries = text
            .split(';')
            .filter(|segment| !segment.is_empty())
            .map(|segment| match segment.split_once(assign) {
                Some((key, value)) => (key.to_string(), value.to_string()),
                None => (segment.to_string(), String::new()),
            })
            .collect();
        Self { entries }
    }

    /// Renders every entry as `key{assign}value;`, or `key;` for flags.
    pub fn join(&self, assign: char) -> String {
        let mut out = String::new();
        for (key, value) in &self.entries {
            out.push_str(key);
            if !value.is_empty() {
                out.push(assign);
                out.push_str(value);
            }
            out.push(';');
        }
        out
    }

    /// Sets `key`, keeping its position when it already exists.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Builder-style variant of [`Style::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns `true` if `key` is present as a flag or with value `1`.
    pub fn is_flag_set(&self, key: &str) -> bool {
        matches!(self.get(key), Some("") | Some("1"))
    }

    /// Removes `key`, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.shift_remove(key)
    }

    /// Applies `overrides` on top of this style.
    ///
    /// Existing keys keep their position, new keys are appended.
    pub fn extend(&mut self, overrides: &Style) {
        for (key, value) in &overrides.entries {
            self.entries.insert(key.clone(), value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

/// Formats with the draw.io cell assignment character.
impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join(CELL_ASSIGN))
    }
}
