//! Uniqueness guard: structural and lexical variation over a batch.
//!
//! Given N pieces of synthesized content sharing a structural origin (one
//! template), the guard transforms each so that none reads as a duplicate
//! or near-duplicate of another while preserving the semantic payload
//! (keyword references, factual substitutions).
//!
//! Pipeline per item, in order:
//!
//! 1. opening/closing variation ([`style`])
//! 2. transition injection ([`transitions`])
//! 3. vocabulary substitution ([`synonyms`])
//! 4. sentence restructuring ([`restructure`])
//! 5. fingerprinting + near-duplicate rejection ([`guard`])
//! 6. uniqueness scoring against a bounded prior sample ([`guard`])
//!
//! All selection state ([`history::PatternUsageHistory`], the run fingerprint
//! set) is constructor-injected and scoped to the run, never module-global;
//! a fresh store per test gives deterministic behavior.

pub mod guard;
pub mod history;
pub mod restructure;
pub mod style;
pub mod synonyms;
pub mod transitions;

pub use guard::{UniquenessGuard, VariationError};
pub use history::{PatternUsageHistory, VariationSlot};
pub use style::StyleClass;

/// Split a prose paragraph into sentences, keeping terminators.
///
/// A sentence ends at `.`, `!`, or `?` followed by whitespace or end of
/// text. Good enough for transition/restructure placement; not a general
/// sentence segmenter.
pub(crate) fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            let boundary = match chars.peek() {
                None => true,
                Some(next) => next.is_whitespace(),
            };
            if boundary {
                let trimmed = current.trim().to_string();
                if !trimmed.is_empty() {
                    sentences.push(trimmed);
                }
                current.clear();
            }
        }
    }
    let tail = current.trim().to_string();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

/// Whether a paragraph block is plain prose (not a heading or list).
pub(crate) fn is_prose_paragraph(paragraph: &str) -> bool {
    let first = paragraph.trim_start();
    if first.starts_with('#') || first.starts_with("- ") || first.starts_with("* ") {
        return false;
    }
    // Numbered list items ("1. step").
    let mut chars = first.chars();
    let leading_digits: String = chars.by_ref().take_while(|c| c.is_ascii_digit()).collect();
    if !leading_digits.is_empty() && first[leading_digits.len()..].starts_with(". ") {
        return false;
    }
    true
}

/// Apply `f` to each prose paragraph of a body, leaving headings and lists
/// untouched. Paragraphs are blank-line separated blocks.
pub(crate) fn map_prose_paragraphs<F>(body: &str, mut f: F) -> String
where
    F: FnMut(&str) -> String,
{
    body.split("\n\n")
        .map(|block| {
            if block.trim().is_empty() || !is_prose_paragraph(block) {
                block.to_string()
            } else {
                f(block)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sentences_basic() {
        let sentences = split_sentences("First one. Second one! Third?");
        assert_eq!(sentences, vec!["First one.", "Second one!", "Third?"]);
    }

    #[test]
    fn test_split_sentences_no_terminator_tail() {
        let sentences = split_sentences("Complete sentence. trailing fragment");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[1], "trailing fragment");
    }

    #[test]
    fn test_split_sentences_decimal_not_boundary() {
        let sentences = split_sentences("Costs 3.50 per visit. Cheap.");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0], "Costs 3.50 per visit.");
    }

    #[test]
    fn test_prose_detection() {
        assert!(is_prose_paragraph("Just a normal paragraph."));
        assert!(!is_prose_paragraph("# A heading"));
        assert!(!is_prose_paragraph("- list item"));
        assert!(!is_prose_paragraph("1. numbered item"));
    }

    #[test]
    fn test_map_prose_paragraphs_skips_structure() {
        let body = "# Heading\n\nProse here.\n\n- item one\n- item two";
        let mapped = map_prose_paragraphs(body, |p| p.to_uppercase());
        assert!(mapped.contains("# Heading"));
        assert!(mapped.contains("PROSE HERE."));
        assert!(mapped.contains("- item one"));
    }
}
