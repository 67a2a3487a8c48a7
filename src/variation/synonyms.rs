//! Vocabulary substitution.
//!
//! Replaces a bounded fraction of matched "synonymable" words with
//! alternatives from a synonym bank, preserving the original word's
//! capitalization shape (first-letter, all-caps, or lowercase). Words
//! belonging to the target keyword are never touched, so the keyword's
//! literal occurrence survives substitution.

use rand::Rng;
use std::collections::BTreeSet;

use super::history::{PatternUsageHistory, VariationSlot};

// Bank of common marketing-copy words and their alternatives. Matched
// case-insensitively against whole words.
const SYNONYM_BANK: [(&str, &[&str]); 12] = [
    ("best", &["top", "leading", "premier"]),
    ("great", &["excellent", "outstanding", "superb"]),
    ("good", &["solid", "dependable", "quality"]),
    ("fast", &["quick", "rapid", "prompt"]),
    ("reliable", &["trustworthy", "dependable", "proven"]),
    ("affordable", &["budget-friendly", "cost-effective", "economical"]),
    ("professional", &["skilled", "expert", "seasoned"]),
    ("experienced", &["veteran", "practiced", "established"]),
    ("local", &["nearby", "neighborhood", "area"]),
    ("help", &["assist", "support", "serve"]),
    ("provide", &["deliver", "offer", "supply"]),
    ("customers", &["clients", "homeowners", "residents"]),
];

/// Apply the capitalization shape of `original` to `replacement`.
fn match_case(original: &str, replacement: &str) -> String {
    if original.chars().all(|c| c.is_uppercase() || !c.is_alphabetic()) && original.len() > 1 {
        return replacement.to_uppercase();
    }
    if original.chars().next().is_some_and(|c| c.is_uppercase()) {
        let mut chars = replacement.chars();
        return match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        };
    }
    replacement.to_string()
}

/// Lowercased word set of the target keyword, excluded from substitution.
fn keyword_terms(keyword: &str) -> BTreeSet<String> {
    keyword
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect()
}

fn split_word(token: &str) -> (&str, &str) {
    let end = token
        .char_indices()
        .rev()
        .take_while(|(_, c)| !c.is_alphanumeric())
        .count();
    let split = token.len() - token.chars().rev().take(end).map(|c| c.len_utf8()).sum::<usize>();
    token.split_at(split)
}

/// Substitute a fraction of synonymable words in a body.
///
/// `rate` is the probability each matched word is replaced; it comes from
/// the policy's position-scaled curve. Replacement choice is least-used
/// across the run (usage history), randomness only decides *whether* a
/// given occurrence is substituted. Newlines are preserved; runs of spaces
/// within a line collapse to one.
pub fn substitute<R: Rng>(
    body: &str,
    rate: f32,
    keyword: &str,
    rng: &mut R,
    history: &PatternUsageHistory,
) -> String {
    if rate <= 0.0 {
        return body.to_string();
    }
    let excluded = keyword_terms(keyword);

    body.split('\n')
        .map(|line| {
            line.split_whitespace()
                .map(|token| {
                    let (word, punct) = split_word(token);
                    let lower = word.to_lowercase();
                    if excluded.contains(&lower) {
                        return token.to_string();
                    }
                    let Some((_, alternatives)) =
                        SYNONYM_BANK.iter().find(|(base, _)| *base == lower)
                    else {
                        return token.to_string();
                    };
                    if rng.gen::<f32>() >= rate {
                        return token.to_string();
                    }
                    let idx = history.select_and_record(VariationSlot::Synonym, alternatives);
                    format!("{}{}", match_case(word, alternatives[idx]), punct)
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_match_case_shapes() {
        assert_eq!(match_case("Best", "top"), "Top");
        assert_eq!(match_case("BEST", "top"), "TOP");
        assert_eq!(match_case("best", "top"), "top");
    }

    #[test]
    fn test_full_rate_substitutes_all_matches() {
        let history = PatternUsageHistory::new();
        let out = substitute("The best fast service.", 1.0, "service", &mut rng(), &history);
        assert!(!out.contains("best"));
        assert!(!out.contains("fast"));
        assert!(out.contains("service."));
    }

    #[test]
    fn test_zero_rate_is_identity() {
        let history = PatternUsageHistory::new();
        let body = "The best local help around.";
        assert_eq!(substitute(body, 0.0, "kw", &mut rng(), &history), body);
    }

    #[test]
    fn test_keyword_terms_never_substituted() {
        let history = PatternUsageHistory::new();
        // "local" is in the bank but also part of the keyword.
        let out = substitute(
            "Trusted local help for local homes.",
            1.0,
            "local plumbing",
            &mut rng(),
            &history,
        );
        assert!(out.contains("local"));
        assert!(!out.contains("help"), "non-keyword match should substitute");
    }

    #[test]
    fn test_capitalization_preserved_on_substitution() {
        let history = PatternUsageHistory::new();
        let out = substitute("Best in town.", 1.0, "kw", &mut rng(), &history);
        let first_word = out.split_whitespace().next().unwrap();
        assert!(first_word.chars().next().unwrap().is_uppercase());
    }

    #[test]
    fn test_punctuation_survives() {
        let history = PatternUsageHistory::new();
        let out = substitute("We are the best!", 1.0, "kw", &mut rng(), &history);
        assert!(out.ends_with('!'));
    }

    #[test]
    fn test_newlines_preserved() {
        let history = PatternUsageHistory::new();
        let body = "First paragraph.\n\nSecond paragraph.";
        let out = substitute(body, 1.0, "kw", &mut rng(), &history);
        assert_eq!(out.matches('\n').count(), 2);
    }

    #[test]
    fn test_seeded_rng_reproducible() {
        let out1 = substitute(
            "A good fast reliable team.",
            0.5,
            "kw",
            &mut rng(),
            &PatternUsageHistory::new(),
        );
        let out2 = substitute(
            "A good fast reliable team.",
            0.5,
            "kw",
            &mut rng(),
            &PatternUsageHistory::new(),
        );
        assert_eq!(out1, out2);
    }
}
