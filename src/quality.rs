//! # Quality Scoring
//!
//! Scores varied content against the policy thresholds before a page is
//! accepted. The score is a weighted sum of five structural signals:
//! word count, headings, lists, paragraph count, and keyword density.
//! Each signal contributes up to its policy weight; the total is capped
//! at 100.

use crate::policy::GenerationPolicyV1;
use crate::types::QualityMetrics;

/// Computes [`QualityMetrics`] for a body under a generation policy.
pub struct QualityScorer {
    policy: GenerationPolicyV1,
}

fn is_list_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    if trimmed.starts_with("- ") || trimmed.starts_with("* ") {
        return true;
    }
    // Ordered list: digits followed by ". ".
    let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
    digits > 0 && trimmed[digits..].starts_with(". ")
}

fn count_paragraphs(body: &str) -> usize {
    body.split("\n\n").filter(|p| !p.trim().is_empty()).count()
}

fn count_keyword_occurrences(body: &str, keyword: &str) -> usize {
    let keyword = keyword.trim().to_lowercase();
    if keyword.is_empty() {
        return 0;
    }
    body.to_lowercase().matches(&keyword).count()
}

impl QualityScorer {
    /// Construct a scorer for the given policy.
    pub fn new(policy: GenerationPolicyV1) -> Self {
        Self { policy }
    }

    /// Percentage of the body's words occupied by keyword occurrences.
    fn keyword_density(&self, body: &str, keyword: &str, total_words: usize) -> f32 {
        if total_words == 0 {
            return 0.0;
        }
        let keyword_words = keyword.split_whitespace().count();
        let occurrences = count_keyword_occurrences(body, keyword);
        (occurrences * keyword_words) as f32 / total_words as f32 * 100.0
    }

    /// Measure a body and compute its weighted quality score.
    pub fn score(&self, body: &str, keyword: &str) -> QualityMetrics {
        let weights = &self.policy.quality_weights;

        let word_count = body.split_whitespace().count();
        let has_headings = body.lines().any(|l| l.trim_start().starts_with('#'));
        let has_lists = body.lines().any(is_list_line);
        let paragraph_count = count_paragraphs(body);
        let keyword_density = self.keyword_density(body, keyword, word_count);

        let mut score = 0.0f32;

        if self.policy.min_word_count > 0 {
            let ratio = (word_count as f32 / self.policy.min_word_count as f32).min(1.0);
            score += ratio * weights.word_count;
        } else {
            score += weights.word_count;
        }
        if has_headings {
            score += weights.headings;
        }
        if has_lists {
            score += weights.lists;
        }
        if self.policy.min_paragraphs > 0 {
            let ratio = (paragraph_count as f32 / self.policy.min_paragraphs as f32).min(1.0);
            score += ratio * weights.paragraphs;
        } else {
            score += weights.paragraphs;
        }
        // Density in the target band earns full credit; any keyword
        // presence outside the band earns half.
        if keyword_density >= self.policy.density_min && keyword_density <= self.policy.density_max
        {
            score += weights.keyword_density;
        } else if keyword_density > 0.0 {
            score += weights.keyword_density * 0.5;
        }

        QualityMetrics {
            word_count,
            has_headings,
            has_lists,
            paragraph_count,
            keyword_density,
            quality_score: score.min(100.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> QualityScorer {
        QualityScorer::new(GenerationPolicyV1 {
            min_word_count: 20,
            min_paragraphs: 2,
            ..GenerationPolicyV1::default()
        })
    }

    fn rich_body() -> String {
        let filler = "Our plumbing crews handle every job with care and clear pricing."
            .split_whitespace()
            .cycle()
            .take(40)
            .collect::<Vec<_>>()
            .join(" ");
        format!("## Why Choose Us\n\n{filler}\n\n- Licensed plumbing techs\n- Upfront quotes")
    }

    #[test]
    fn test_rich_body_scores_high() {
        let metrics = scorer().score(&rich_body(), "plumbing");
        assert!(metrics.has_headings);
        assert!(metrics.has_lists);
        assert!(metrics.paragraph_count >= 2);
        assert!(metrics.word_count >= 20);
        assert!(metrics.quality_score >= 80.0, "score {}", metrics.quality_score);
    }

    #[test]
    fn test_score_non_decreasing_as_signals_pass() {
        fn para(words: usize) -> String {
            "local crews answer calls fast with clear pricing and careful work"
                .split_whitespace()
                .cycle()
                .take(words)
                .collect::<Vec<_>>()
                .join(" ")
        }
        let scorer = scorer();
        // Two paragraphs, ~59 words, two keyword mentions: word count,
        // paragraph count, and density all hold full credit throughout, so
        // each added signal can only raise the score.
        let base = format!(
            "We offer plumbing service here. {}\n\nCall our plumbing team. {}",
            para(25),
            para(25)
        );
        let with_heading = format!("## Service Overview\n\n{base}");
        let with_list = format!("{with_heading}\n\n- Fast quotes\n- Clear pricing");

        let base_score = scorer.score(&base, "plumbing").quality_score;
        let heading_score = scorer.score(&with_heading, "plumbing").quality_score;
        let list_score = scorer.score(&with_list, "plumbing").quality_score;
        assert!(heading_score > base_score, "{heading_score} vs {base_score}");
        assert!(list_score > heading_score, "{list_score} vs {heading_score}");
    }

    #[test]
    fn test_thin_body_scores_low() {
        let metrics = scorer().score("Short text only.", "plumbing");
        assert!(!metrics.has_headings);
        assert!(!metrics.has_lists);
        assert!(metrics.quality_score < 40.0);
    }

    #[test]
    fn test_empty_body_scores_zero() {
        let metrics = scorer().score("", "plumbing");
        assert_eq!(metrics.word_count, 0);
        assert_eq!(metrics.keyword_density, 0.0);
        assert_eq!(metrics.quality_score, 0.0);
    }

    #[test]
    fn test_ordered_list_detected() {
        let metrics = scorer().score("1. First step\n2. Second step", "step");
        assert!(metrics.has_lists);
    }

    #[test]
    fn test_multi_word_keyword_density() {
        // 2 occurrences x 2 keyword words / 10 total words = 40%.
        let body = "emergency plumber on call any hour emergency plumber near you";
        let metrics = scorer().score(body, "emergency plumber");
        assert!((metrics.keyword_density - 40.0).abs() < 0.01);
    }

    #[test]
    fn test_density_in_band_beats_density_outside() {
        // ~2% density: keyword appears once in 50 words.
        let mut words = vec!["plumbing"];
        words.extend(std::iter::repeat("word").take(49));
        let in_band = scorer().score(&words.join(" "), "plumbing");
        let absent = scorer().score(&["word"; 50].join(" "), "plumbing");
        assert!(in_band.quality_score > absent.quality_score);
    }
}
