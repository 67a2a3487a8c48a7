//! Lexical similarity between texts.
//!
//! Jaccard over word sets is the kernel's similarity proxy: cheap, order
//! insensitive, and good enough to catch near-duplicate prose within a run.

use std::collections::BTreeSet;

/// Extract the lowercase word set of a text.
///
/// Words are maximal alphanumeric runs; everything else is a separator.
/// BTreeSet for deterministic iteration.
pub fn word_set(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

/// Jaccard similarity of two word sets: `|A ∩ B| / |A ∪ B|`.
///
/// Two empty sets are defined as identical (similarity 1.0).
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f32 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let shared = a.intersection(b).count();
    let union = a.len() + b.len() - shared;
    if union == 0 {
        return 1.0;
    }
    shared as f32 / union as f32
}

/// Maximum pairwise Jaccard similarity of `words` against a set of priors.
///
/// Returns 0.0 for an empty prior set.
pub fn max_similarity<'a, I>(words: &BTreeSet<String>, priors: I) -> f32
where
    I: IntoIterator<Item = &'a BTreeSet<String>>,
{
    priors
        .into_iter()
        .map(|prior| jaccard(words, prior))
        .fold(0.0f32, f32::max)
}

/// Convert a maximum pairwise similarity to a uniqueness score.
///
/// `score = (1 − max_similarity) × 100`, clamped to `[0, 100]`.
/// An empty prior corpus (max similarity 0.0) yields 100.
pub fn uniqueness_score(max_similarity: f32) -> f32 {
    ((1.0 - max_similarity) * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_set_normalizes() {
        let words = word_set("Fast, local Plumbing. FAST response!");
        assert!(words.contains("fast"));
        assert!(words.contains("plumbing"));
        assert_eq!(words.iter().filter(|w| w.as_str() == "fast").count(), 1);
    }

    #[test]
    fn test_jaccard_identical() {
        let a = word_set("one two three");
        assert!((jaccard(&a, &a) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_jaccard_disjoint() {
        let a = word_set("one two");
        let b = word_set("three four");
        assert_eq!(jaccard(&a, &b), 0.0);
    }

    #[test]
    fn test_jaccard_partial() {
        // {one, two, three} vs {two, three, four}: 2 shared / 4 union = 0.5
        let a = word_set("one two three");
        let b = word_set("two three four");
        assert!((jaccard(&a, &b) - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_uniqueness_score_bounds() {
        assert_eq!(uniqueness_score(0.0), 100.0);
        assert_eq!(uniqueness_score(1.0), 0.0);
        let mid = uniqueness_score(0.25);
        assert!(mid > 0.0 && mid < 100.0);
    }

    #[test]
    fn test_max_similarity_empty_priors() {
        let words = word_set("anything at all");
        let priors: Vec<BTreeSet<String>> = vec![];
        assert_eq!(max_similarity(&words, priors.iter()), 0.0);
        assert_eq!(uniqueness_score(0.0), 100.0);
    }
}
