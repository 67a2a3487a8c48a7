//! Combinations: one complete assignment of values to a template's variables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::dataset::ValueRecord;
use super::template::fill_pattern;

/// Generate a URL slug from a title.
///
/// Pure function of the title: same title anywhere in the system always
/// yields the same slug.
///
/// Pipeline: lowercase → strip everything except `[a-z0-9\s-]` → collapse
/// whitespace to single hyphens → trim leading/trailing hyphens → cap at
/// `max_len` characters (re-trimmed after truncation).
pub fn slugify(title: &str, max_len: usize) -> String {
    let lowered = title.to_lowercase();
    let filtered: String = lowered
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();

    // Split on whitespace AND existing hyphens so runs collapse to one.
    let hyphenated = filtered
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    let capped: String = hyphenated.chars().take(max_len).collect();
    capped.trim_matches('-').to_string()
}

/// One complete assignment of values to all of a template's variables.
///
/// Immutable after construction. `title` and `slug` are derived
/// deterministically from the mapping: two combinations with identical
/// variable-value mappings always carry an identical title and slug.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combination {
    /// Position of this combination in product order (resumable index).
    pub index: usize,
    /// Variable name → chosen value record. BTreeMap for canonical order.
    pub values: BTreeMap<String, ValueRecord>,
    /// Title derived from the template title pattern.
    pub title: String,
    /// Slug derived from the title.
    pub slug: String,
}

impl Combination {
    /// Build a combination from an assignment, deriving title and slug.
    pub fn new(
        index: usize,
        values: BTreeMap<String, ValueRecord>,
        title_pattern: &str,
        slug_max_len: usize,
    ) -> Self {
        let plain: BTreeMap<String, String> = values
            .iter()
            .map(|(k, v)| (k.clone(), v.value.clone()))
            .collect();
        let title = fill_pattern(title_pattern, &plain);
        let slug = slugify(&title, slug_max_len);
        Self {
            index,
            values,
            title,
            slug,
        }
    }

    /// Get the chosen value for a variable, if assigned.
    pub fn value(&self, variable: &str) -> Option<&str> {
        self.values.get(variable).map(|r| r.value.as_str())
    }

    /// Variable name → plain value view, for substitution.
    pub fn plain_values(&self) -> BTreeMap<String, String> {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), v.value.clone()))
            .collect()
    }
}

// Combinations compare by their resumable index.
impl PartialEq for Combination {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Eq for Combination {}

impl PartialOrd for Combination {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Combination {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.index.cmp(&other.index)
    }
}
