//! Core types for the page generation kernel.

pub mod combination;
pub mod content;
pub mod dataset;
pub mod page;
pub mod template;

pub use combination::{slugify, Combination};
pub use content::{SynthesizedContent, VariedContent};
pub use dataset::{DatasetError, ValueRecord, VariableDataset};
pub use page::{GeneratedPage, PageId, PageStatus, QualityMetrics};
pub use template::{
    extract_placeholders, fill_pattern, BodySection, PagePreview, Template, TemplateError,
    TemplateId, TemplateSections,
};
