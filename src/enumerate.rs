//! Deterministic combination enumeration.
//!
//! Computes the cartesian product of variable datasets in the template's
//! variable order, producing an ordered sequence of [`Combination`]s.
//!
//! ## Ordering
//!
//! Product order is lexicographic with the **last** variable varying fastest
//! (standard odometer order). Enumeration is deterministic and resumable by
//! index: combination `i` is a pure function of the template, the datasets,
//! and `i`.
//!
//! ## Sample-Dataset Fallback
//!
//! A variable with no bound dataset is an explicit mode, not hidden magic:
//! with `sample_fallback` enabled (the default) a deterministic sample
//! dataset seeded from the variable name is substituted and a warning is
//! logged; with it disabled the enumeration fails with
//! [`EnumerateError::MissingDataset`]. A valid template therefore never
//! silently produces zero combinations.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use xxhash_rust::xxh64::xxh64;

use crate::types::{Combination, Template, ValueRecord, VariableDataset};

/// Error raised during enumeration.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EnumerateError {
    /// No dataset bound for a variable and the sample fallback is disabled.
    #[error("No dataset bound for variable [{variable}] and sample fallback is disabled")]
    MissingDataset {
        /// The unbound variable.
        variable: String,
    },
}

/// Options controlling one enumeration.
#[derive(Debug, Clone)]
pub struct EnumerateOptions {
    /// Truncate to the first `limit` combinations in product order.
    ///
    /// Truncation is a prefix, not a sample: callers needing coverage across
    /// variable values must limit dataset sizes upstream.
    pub limit: Option<usize>,
    /// Keep only combinations whose derived title is in this set.
    ///
    /// Applied before `limit`.
    pub selected_titles: Option<BTreeSet<String>>,
    /// Substitute a deterministic sample dataset for unbound variables.
    pub sample_fallback: bool,
}

impl Default for EnumerateOptions {
    fn default() -> Self {
        Self {
            limit: None,
            selected_titles: None,
            sample_fallback: true,
        }
    }
}

// Modifier bank for sample value generation. The starting offset is seeded
// from the variable name so different variables get different value sets.
const SAMPLE_MODIFIERS: [&str; 8] = [
    "Alpha", "Beta", "Gamma", "Delta", "Epsilon", "Zeta", "Eta", "Theta",
];

/// Build the deterministic sample dataset for an unbound variable.
///
/// Seeded from the variable name: the same name always yields the same
/// values, and distinct names usually yield distinct value sets.
pub fn sample_dataset(name: &str, size: usize) -> VariableDataset {
    let offset = (xxh64(name.as_bytes(), 0) % SAMPLE_MODIFIERS.len() as u64) as usize;
    let values: Vec<ValueRecord> = (0..size.max(1))
        .map(|i| {
            let modifier = SAMPLE_MODIFIERS[(offset + i) % SAMPLE_MODIFIERS.len()];
            ValueRecord::new(format!("{} {}", name, modifier), "sample_fallback")
        })
        .collect();
    VariableDataset::new(name, values).expect("sample dataset is never empty")
}

/// Enumerates the cartesian product of datasets into ordered combinations.
#[derive(Debug, Clone)]
pub struct CombinationEnumerator {
    /// Maximum slug length applied to derived slugs.
    pub slug_max_len: usize,
    /// Values generated per variable by the sample fallback.
    pub sample_dataset_size: usize,
}

impl CombinationEnumerator {
    /// Create an enumerator.
    pub fn new(slug_max_len: usize, sample_dataset_size: usize) -> Self {
        Self {
            slug_max_len,
            sample_dataset_size,
        }
    }

    /// Total product size for a template against bound datasets, counting
    /// the sample fallback size for unbound variables.
    pub fn total_combinations(
        &self,
        template: &Template,
        datasets: &BTreeMap<String, VariableDataset>,
    ) -> u128 {
        template
            .variables
            .iter()
            .map(|v| {
                datasets
                    .get(v)
                    .map(|d| d.len())
                    .unwrap_or(self.sample_dataset_size.max(1)) as u128
            })
            .product()
    }

    /// Enumerate combinations in product order.
    ///
    /// Returns the ordered combination list after title filtering and limit
    /// truncation. See the module docs for ordering and fallback semantics.
    pub fn enumerate(
        &self,
        template: &Template,
        datasets: &BTreeMap<String, VariableDataset>,
        options: &EnumerateOptions,
    ) -> Result<Vec<Combination>, EnumerateError> {
        // Resolve a dataset per variable, in template variable order.
        let mut resolved: Vec<VariableDataset> = Vec::with_capacity(template.variables.len());
        for variable in &template.variables {
            match datasets.get(variable) {
                Some(dataset) => resolved.push(dataset.clone()),
                None if options.sample_fallback => {
                    tracing::warn!(
                        variable = %variable,
                        size = self.sample_dataset_size,
                        "no dataset bound; substituting deterministic sample dataset"
                    );
                    resolved.push(sample_dataset(variable, self.sample_dataset_size));
                }
                None => {
                    return Err(EnumerateError::MissingDataset {
                        variable: variable.clone(),
                    })
                }
            }
        }

        let sizes: Vec<u128> = resolved.iter().map(|d| d.len() as u128).collect();
        let total: u128 = sizes.iter().product();

        // Odometer strides: last variable varies fastest.
        let mut strides = vec![1u128; sizes.len()];
        for k in (0..sizes.len().saturating_sub(1)).rev() {
            strides[k] = strides[k + 1] * sizes[k + 1];
        }

        let title_pattern = template.title_pattern();
        let mut combinations = Vec::new();
        let mut index: u128 = 0;

        while index < total {
            if options.selected_titles.is_none() {
                if let Some(limit) = options.limit {
                    if combinations.len() >= limit {
                        break;
                    }
                }
            }

            let mut assignment: BTreeMap<String, ValueRecord> = BTreeMap::new();
            for (k, dataset) in resolved.iter().enumerate() {
                let digit = ((index / strides[k]) % sizes[k]) as usize;
                assignment.insert(dataset.name.clone(), dataset.values[digit].clone());
            }

            let combination =
                Combination::new(index as usize, assignment, title_pattern, self.slug_max_len);

            let keep = match &options.selected_titles {
                Some(titles) => titles.contains(&combination.title),
                None => true,
            };
            if keep {
                combinations.push(combination);
            }

            index += 1;
        }

        // With a title filter the limit applies to the filtered sequence.
        if let (Some(limit), Some(_)) = (options.limit, &options.selected_titles) {
            combinations.truncate(limit);
        }

        Ok(combinations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TemplateSections;

    fn city_service_template() -> Template {
        Template::new("[City] [Service] Provider", TemplateSections::default()).unwrap()
    }

    fn city_service_datasets() -> BTreeMap<String, VariableDataset> {
        let mut datasets = BTreeMap::new();
        datasets.insert(
            "City".to_string(),
            VariableDataset::from_values("City", "test", &["Austin", "Dallas"]).unwrap(),
        );
        datasets.insert(
            "Service".to_string(),
            VariableDataset::from_values("Service", "test", &["Plumbing", "Electrical"]).unwrap(),
        );
        datasets
    }

    #[test]
    fn test_product_order_last_variable_fastest() {
        let enumerator = CombinationEnumerator::new(100, 3);
        let combos = enumerator
            .enumerate(
                &city_service_template(),
                &city_service_datasets(),
                &EnumerateOptions::default(),
            )
            .unwrap();

        let titles: Vec<_> = combos.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Austin Plumbing Provider",
                "Austin Electrical Provider",
                "Dallas Plumbing Provider",
                "Dallas Electrical Provider",
            ]
        );

        // Slugs are distinct and deterministic.
        let slugs: BTreeSet<_> = combos.iter().map(|c| c.slug.clone()).collect();
        assert_eq!(slugs.len(), 4);
    }

    #[test]
    fn test_indexes_are_resumable() {
        let enumerator = CombinationEnumerator::new(100, 3);
        let combos = enumerator
            .enumerate(
                &city_service_template(),
                &city_service_datasets(),
                &EnumerateOptions::default(),
            )
            .unwrap();
        for (i, combo) in combos.iter().enumerate() {
            assert_eq!(combo.index, i);
        }
    }

    #[test]
    fn test_limit_truncates_prefix() {
        let enumerator = CombinationEnumerator::new(100, 3);
        let combos = enumerator
            .enumerate(
                &city_service_template(),
                &city_service_datasets(),
                &EnumerateOptions {
                    limit: Some(3),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(combos.len(), 3);
        assert_eq!(combos[0].title, "Austin Plumbing Provider");
        assert_eq!(combos[2].title, "Dallas Plumbing Provider");
    }

    #[test]
    fn test_selected_titles_filter() {
        let enumerator = CombinationEnumerator::new(100, 3);
        let mut titles = BTreeSet::new();
        titles.insert("Dallas Electrical Provider".to_string());

        let combos = enumerator
            .enumerate(
                &city_service_template(),
                &city_service_datasets(),
                &EnumerateOptions {
                    selected_titles: Some(titles),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(combos.len(), 1);
        assert_eq!(combos[0].title, "Dallas Electrical Provider");
        // Index still reflects product-order position.
        assert_eq!(combos[0].index, 3);
    }

    #[test]
    fn test_missing_dataset_uses_sample_fallback() {
        let enumerator = CombinationEnumerator::new(100, 3);
        let mut datasets = city_service_datasets();
        datasets.remove("Service");

        let combos = enumerator
            .enumerate(
                &city_service_template(),
                &datasets,
                &EnumerateOptions::default(),
            )
            .unwrap();

        // 2 cities x 3 sample services, never zero.
        assert_eq!(combos.len(), 6);
        assert!(combos[0].value("Service").unwrap().starts_with("Service "));
    }

    #[test]
    fn test_missing_dataset_errors_with_fallback_disabled() {
        let enumerator = CombinationEnumerator::new(100, 3);
        let mut datasets = city_service_datasets();
        datasets.remove("Service");

        let result = enumerator.enumerate(
            &city_service_template(),
            &datasets,
            &EnumerateOptions {
                sample_fallback: false,
                ..Default::default()
            },
        );
        assert!(matches!(
            result,
            Err(EnumerateError::MissingDataset { variable }) if variable == "Service"
        ));
    }

    #[test]
    fn test_sample_dataset_deterministic() {
        let a = sample_dataset("Service", 3);
        let b = sample_dataset("Service", 3);
        let values_a: Vec<_> = a.values.iter().map(|v| v.value.clone()).collect();
        let values_b: Vec<_> = b.values.iter().map(|v| v.value.clone()).collect();
        assert_eq!(values_a, values_b);
    }
}
