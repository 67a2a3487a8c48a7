//! Opening and closing style variation.
//!
//! A small catalog of style classes (question, statement, data-led), each
//! rendering a one-sentence opening or closing paragraph around the page's
//! title and keyword. Selection rotates through the least-recently-used
//! class for the run, so a batch spreads evenly across the catalog instead
//! of opening every page the same way.

use serde::{Deserialize, Serialize};

use super::history::{PatternUsageHistory, VariationSlot};

/// Style class for an opening or closing paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StyleClass {
    /// Leads with a reader-facing question.
    Question,
    /// Leads with a direct statement.
    Statement,
    /// Leads with a concrete figure.
    DataLed,
}

impl StyleClass {
    /// Catalog order; also the key order used in usage history.
    pub const ALL: [StyleClass; 3] = [Self::Question, Self::Statement, Self::DataLed];

    /// Stable key for usage tracking.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Question => "question",
            Self::Statement => "statement",
            Self::DataLed => "data_led",
        }
    }

    fn from_key_index(index: usize) -> Self {
        Self::ALL[index]
    }
}

const STYLE_KEYS: [&str; 3] = ["question", "statement", "data_led"];

/// Render an opening paragraph for a style class.
fn opening_line(class: StyleClass, title: &str, keyword: &str) -> String {
    match class {
        StyleClass::Question => format!(
            "Looking for {} you can rely on? {} is a good place to start.",
            keyword, title
        ),
        StyleClass::Statement => format!(
            "{} connects you with dependable {} without the guesswork.",
            title, keyword
        ),
        StyleClass::DataLed => format!(
            "9 out of 10 customers say finding {} is the hardest part of the job. {} changes that.",
            keyword, title
        ),
    }
}

/// Render a closing paragraph for a style class.
fn closing_line(class: StyleClass, keyword: &str) -> String {
    match class {
        StyleClass::Question => format!(
            "Ready to get started with {}? Reach out today and see the difference.",
            keyword
        ),
        StyleClass::Statement => format!(
            "For {} done right the first time, this is the team to call.",
            keyword
        ),
        StyleClass::DataLed => format!(
            "Join the hundreds of customers who already trust us for {}.",
            keyword
        ),
    }
}

/// Prepend a least-recently-used opening and append a matching-rotation
/// closing to a body.
///
/// Opening and closing rotate independently, so a page can open with a
/// question and close with a statement. Returns the styled body.
pub fn apply_opening_and_closing(
    body: &str,
    title: &str,
    keyword: &str,
    history: &PatternUsageHistory,
) -> String {
    let opening_idx = history.select_and_record(VariationSlot::Opening, &STYLE_KEYS);
    let closing_idx = history.select_and_record(VariationSlot::Closing, &STYLE_KEYS);

    let opening = opening_line(StyleClass::from_key_index(opening_idx), title, keyword);
    let closing = closing_line(StyleClass::from_key_index(closing_idx), keyword);

    format!("{}\n\n{}\n\n{}", opening, body.trim(), closing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openings_mention_keyword() {
        for class in StyleClass::ALL {
            let line = opening_line(class, "Austin Plumbing Provider", "plumbing services");
            assert!(line.contains("plumbing services"), "{:?}: {}", class, line);
        }
    }

    #[test]
    fn test_closings_mention_keyword() {
        for class in StyleClass::ALL {
            let line = closing_line(class, "plumbing services");
            assert!(line.contains("plumbing services"));
        }
    }

    #[test]
    fn test_rotation_spreads_styles() {
        let history = PatternUsageHistory::new();
        let mut bodies = Vec::new();
        for _ in 0..3 {
            bodies.push(apply_opening_and_closing(
                "Body text.",
                "Title",
                "keyword",
                &history,
            ));
        }

        // Three consecutive items use three different opening styles.
        let openings: std::collections::BTreeSet<_> = bodies
            .iter()
            .map(|b| b.split("\n\n").next().unwrap().to_string())
            .collect();
        assert_eq!(openings.len(), 3);
    }

    #[test]
    fn test_body_preserved() {
        let history = PatternUsageHistory::new();
        let styled = apply_opening_and_closing("Core content here.", "T", "kw", &history);
        assert!(styled.contains("Core content here."));
    }
}
