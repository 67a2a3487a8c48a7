//! Transition-phrase injection.
//!
//! Inserts connective phrases from a bank at sentence boundaries, at most
//! once per `interval` sentences, using least-used selection so phrase
//! usage spreads evenly across the batch. Headings and lists are never
//! touched.

use super::history::{PatternUsageHistory, VariationSlot};
use super::{map_prose_paragraphs, split_sentences};

const TRANSITION_BANK: [&str; 6] = [
    "Moreover",
    "In addition",
    "Beyond that",
    "What's more",
    "On top of that",
    "Better still",
];

fn lowercase_first(sentence: &str) -> String {
    let mut chars = sentence.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Inject transitions into the prose paragraphs of a body.
///
/// Within each prose paragraph, every `interval`-th sentence (starting at
/// the `interval`-th) gets a connective prefix: `"Moreover, the rest of the
/// sentence"`. An interval of 0 disables injection.
pub fn inject_transitions(body: &str, interval: usize, history: &PatternUsageHistory) -> String {
    if interval == 0 {
        return body.to_string();
    }

    map_prose_paragraphs(body, |paragraph| {
        let sentences = split_sentences(paragraph);
        if sentences.len() <= interval {
            return paragraph.to_string();
        }

        let rewritten: Vec<String> = sentences
            .iter()
            .enumerate()
            .map(|(i, sentence)| {
                // Skip the first sentence; inject at most once per interval.
                if i > 0 && i % interval == 0 {
                    let idx = history.select_and_record(VariationSlot::Transition, &TRANSITION_BANK);
                    format!("{}, {}", TRANSITION_BANK[idx], lowercase_first(sentence))
                } else {
                    sentence.clone()
                }
            })
            .collect();
        rewritten.join(" ")
    })
}
