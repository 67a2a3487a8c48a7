//! Template types for the page generation kernel.
//!
//! A template is a pattern string with bracketed placeholders (`[City]`),
//! plus per-section sub-templates for the rendered page surfaces. Placeholder
//! extraction is exhaustive and order-preserving: `variables` always equals
//! the set of placeholders found in `pattern`, in first-occurrence order.
//!
//! Template validation is the only fail-fast boundary in the kernel: a
//! malformed template aborts batch construction before anything is
//! enumerated. Nothing downstream ever re-validates placeholders.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;
use uuid::Uuid;

use regex_lite::Regex;

/// Unique identifier for a template.
///
/// Wraps a UUID and implements `Ord` for deterministic ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TemplateId(Uuid);

impl TemplateId {
    /// Create a new TemplateId from a UUID.
    pub fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Create a new TemplateId from a UUID string.
    pub fn from_str(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Generate a fresh random TemplateId.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for TemplateId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Error raised at template construction or preview time.
///
/// Template errors always fail fast: they abort batch construction and are
/// never surfaced mid-batch.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TemplateError {
    /// The pattern contains no placeholders.
    #[error("Template pattern contains no placeholders: {pattern:?}")]
    NoVariables {
        /// The offending pattern string.
        pattern: String,
    },
    /// A sub-template references a placeholder not present in the pattern.
    #[error("Section {section:?} references unknown placeholder [{placeholder}]")]
    UnknownPlaceholder {
        /// Name of the section containing the bad reference.
        section: String,
        /// The unknown placeholder name.
        placeholder: String,
    },
    /// A preview was requested without a value for one of the variables.
    #[error("No sample value supplied for variable [{variable}]")]
    MissingSampleValue {
        /// The variable lacking a sample value.
        variable: String,
    },
}

/// Named sub-templates for the rendered page surfaces.
///
/// Each section is itself a placeholder string and may reference any subset
/// of the template's variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateSections {
    /// Title pattern. Empty means "use the main pattern".
    pub title: String,
    /// Meta description pattern.
    pub meta_description: String,
    /// Top-level heading pattern.
    pub heading: String,
    /// Named body section patterns, in render order.
    pub body: Vec<BodySection>,
}

/// One named body section of a template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodySection {
    /// Section name (e.g. "intro", "benefits").
    pub name: String,
    /// Placeholder pattern for the section.
    pub pattern: String,
}

/// Fully rendered preview of a template against sample values.
///
/// Produced by [`Template::fill_preview`] without touching any persistent
/// state; intended for cheap before-commit inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagePreview {
    /// Rendered title.
    pub title: String,
    /// Rendered meta description.
    pub meta_description: String,
    /// Rendered heading.
    pub heading: String,
    /// Slug derived from the rendered title.
    pub slug: String,
    /// Rendered body sections as (name, text) pairs.
    pub body: Vec<(String, String)>,
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([^\[\]]+)\]").expect("placeholder regex is valid"))
}

/// Extract placeholder names from a pattern string.
///
/// Extraction is exhaustive and order-preserving: every bracketed substring
/// is returned, deduplicated, in first-occurrence order.
pub fn extract_placeholders(pattern: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for cap in placeholder_regex().captures_iter(pattern) {
        let name = cap[1].to_string();
        if !seen.contains(&name) {
            seen.push(name);
        }
    }
    seen
}

/// Substitute `[Name]` placeholders in a pattern with the given values.
///
/// Placeholders without a matching value are left verbatim; callers that
/// need strict substitution check coverage first.
pub fn fill_pattern(pattern: &str, values: &BTreeMap<String, String>) -> String {
    let mut out = pattern.to_string();
    for (name, value) in values {
        out = out.replace(&format!("[{}]", name), value);
    }
    out
}

/// A page template: pattern, extracted variables, and section sub-templates.
///
/// ## Invariants
///
/// - `variables` equals the placeholder set extracted from `pattern`, in
///   first-occurrence order.
/// - Every placeholder referenced in any section is a member of `variables`.
/// - `variables` is non-empty.
///
/// Both invariants are enforced by [`Template::new`]; a `Template` value is
/// always valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    /// Unique template identifier.
    pub id: TemplateId,
    /// The title/master pattern containing bracketed placeholders.
    pub pattern: String,
    /// Placeholder names in first-occurrence order.
    pub variables: Vec<String>,
    /// Per-section sub-templates.
    pub sections: TemplateSections,
}

impl Template {
    /// Create and validate a new template.
    ///
    /// Extracts `variables` from `pattern` and checks every section
    /// reference against them. Fails with [`TemplateError`] on an empty
    /// placeholder set or an unknown section placeholder.
    pub fn new(pattern: impl Into<String>, sections: TemplateSections) -> Result<Self, TemplateError> {
        let pattern = pattern.into();
        let variables = extract_placeholders(&pattern);
        if variables.is_empty() {
            return Err(TemplateError::NoVariables { pattern });
        }

        let template = Self {
            id: TemplateId::generate(),
            pattern,
            variables,
            sections,
        };
        template.validate()?;
        Ok(template)
    }

    /// Re-check the section/variable invariant.
    ///
    /// Useful after deserializing a template from an external source.
    pub fn validate(&self) -> Result<(), TemplateError> {
        if self.variables.is_empty() {
            return Err(TemplateError::NoVariables {
                pattern: self.pattern.clone(),
            });
        }

        let check = |section: &str, pattern: &str| -> Result<(), TemplateError> {
            for placeholder in extract_placeholders(pattern) {
                if !self.variables.contains(&placeholder) {
                    return Err(TemplateError::UnknownPlaceholder {
                        section: section.to_string(),
                        placeholder,
                    });
                }
            }
            Ok(())
        };

        check("title", &self.sections.title)?;
        check("meta_description", &self.sections.meta_description)?;
        check("heading", &self.sections.heading)?;
        for body in &self.sections.body {
            check(&body.name, &body.pattern)?;
        }
        Ok(())
    }

    /// The effective title pattern: the title section if set, else `pattern`.
    pub fn title_pattern(&self) -> &str {
        if self.sections.title.is_empty() {
            &self.pattern
        } else {
            &self.sections.title
        }
    }

    /// Render a full preview against sample values.
    ///
    /// Pure with respect to kernel state. Fails if any template variable
    /// lacks a sample value.
    pub fn fill_preview(
        &self,
        sample_values: &BTreeMap<String, String>,
        slug_max_len: usize,
    ) -> Result<PagePreview, TemplateError> {
        for variable in &self.variables {
            if !sample_values.contains_key(variable) {
                return Err(TemplateError::MissingSampleValue {
                    variable: variable.clone(),
                });
            }
        }

        let title = fill_pattern(self.title_pattern(), sample_values);
        let slug = crate::types::combination::slugify(&title, slug_max_len);

        Ok(PagePreview {
            meta_description: fill_pattern(&self.sections.meta_description, sample_values),
            heading: fill_pattern(&self.sections.heading, sample_values),
            body: self
                .sections
                .body
                .iter()
                .map(|s| (s.name.clone(), fill_pattern(&s.pattern, sample_values)))
                .collect(),
            title,
            slug,
        })
    }
}
