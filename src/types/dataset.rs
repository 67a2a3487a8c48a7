//! Variable datasets: ordered value lists per placeholder.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Error raised when constructing a dataset.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DatasetError {
    /// A dataset must contain at least one value.
    #[error("Dataset {name:?} has no values")]
    Empty {
        /// Name of the empty dataset.
        name: String,
    },
}

/// One value in a variable dataset, with provenance metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueRecord {
    /// The substitution value. Compared case-sensitively for substitution.
    pub value: String,
    /// Identifier of the source this value was imported from.
    pub source_id: String,
    /// Free-form provenance metadata.
    pub metadata: BTreeMap<String, String>,
}

impl ValueRecord {
    /// Create a record with no metadata.
    pub fn new(value: impl Into<String>, source_id: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            source_id: source_id.into(),
            metadata: BTreeMap::new(),
        }
    }
}

/// Ordered list of values for one placeholder.
///
/// ## Invariants
///
/// - Non-empty (enforced at construction).
/// - No two values equal case-insensitively; the first occurrence wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableDataset {
    /// Placeholder name this dataset binds to.
    pub name: String,
    /// Ordered, case-insensitively deduplicated values.
    pub values: Vec<ValueRecord>,
}

impl VariableDataset {
    /// Create a dataset, deduplicating values case-insensitively.
    ///
    /// Order is preserved; later case-variant duplicates are dropped.
    pub fn new(name: impl Into<String>, values: Vec<ValueRecord>) -> Result<Self, DatasetError> {
        let name = name.into();
        let mut seen: Vec<String> = Vec::with_capacity(values.len());
        let mut deduped = Vec::with_capacity(values.len());
        for record in values {
            let key = record.value.to_lowercase();
            if !seen.contains(&key) {
                seen.push(key);
                deduped.push(record);
            }
        }
        if deduped.is_empty() {
            return Err(DatasetError::Empty { name });
        }
        Ok(Self {
            name,
            values: deduped,
        })
    }

    /// Convenience constructor from plain strings, all sharing one source id.
    pub fn from_values(
        name: impl Into<String>,
        source_id: &str,
        values: &[&str],
    ) -> Result<Self, DatasetError> {
        Self::new(
            name,
            values.iter().map(|v| ValueRecord::new(*v, source_id)).collect(),
        )
    }

    /// Number of values in the dataset.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the dataset is empty (never true for a constructed dataset).
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_dataset_rejected() {
        let result = VariableDataset::new("City", vec![]);
        assert!(matches!(result, Err(DatasetError::Empty { name }) if name == "City"));
    }

    #[test]
    fn test_case_insensitive_dedup_keeps_first() {
        let dataset = VariableDataset::from_values(
            "City",
            "csv_import",
            &["Austin", "austin", "AUSTIN", "Dallas"],
        )
        .unwrap();

        assert_eq!(dataset.len(), 2);
        // First occurrence wins, case preserved for substitution.
        assert_eq!(dataset.values[0].value, "Austin");
        assert_eq!(dataset.values[1].value, "Dallas");
    }

    #[test]
    fn test_order_preserved() {
        let dataset =
            VariableDataset::from_values("Service", "manual", &["Plumbing", "Electrical", "HVAC"])
                .unwrap();
        let values: Vec<_> = dataset.values.iter().map(|v| v.value.as_str()).collect();
        assert_eq!(values, vec!["Plumbing", "Electrical", "HVAC"]);
    }
}
