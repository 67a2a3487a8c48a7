//! Sentence restructuring.
//!
//! Periodically rewrites a sentence so that bodies built from the same
//! template do not share identical sentence shapes. Two conservative
//! transforms are available; which one applies to a given sentence is
//! chosen least-used-first so both stay in circulation across a run.

use super::history::{PatternUsageHistory, VariationSlot};
use super::{map_prose_paragraphs, split_sentences};

const TRANSFORM_KEYS: [&str; 2] = ["clause_swap", "fronted_adverb"];

const FRONTED_ADVERBS: [&str; 3] = ["Importantly", "Notably", "In practice"];

fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn uppercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Swap the clauses around a coordinating ", and " / ", but " joint.
///
/// "A, and B." becomes "B, and A." with capitalization adjusted. Returns
/// `None` when the sentence has no such joint.
fn clause_swap(sentence: &str) -> Option<String> {
    let terminator = sentence
        .chars()
        .last()
        .filter(|c| matches!(c, '.' | '!' | '?'))?;
    let inner = &sentence[..sentence.len() - terminator.len_utf8()];
    for joint in [", and ", ", but "] {
        if let Some(pos) = inner.find(joint) {
            let left = &inner[..pos];
            let right = &inner[pos + joint.len()..];
            if left.is_empty() || right.is_empty() {
                continue;
            }
            return Some(format!(
                "{}{}{}{}",
                uppercase_first(right),
                joint,
                lowercase_first(left),
                terminator
            ));
        }
    }
    None
}

/// Prepend a fronting adverb, lowercasing the original opening.
fn fronted_adverb(sentence: &str, history: &PatternUsageHistory) -> String {
    let idx = history.select_and_record(VariationSlot::Adverb, &FRONTED_ADVERBS);
    format!("{}, {}", FRONTED_ADVERBS[idx], lowercase_first(sentence))
}

/// Restructure every `interval`-th sentence of each prose paragraph.
///
/// An `interval` of zero disables restructuring. Sentence indices restart
/// per paragraph, and headings and list items pass through untouched.
pub fn restructure_sentences(
    body: &str,
    interval: usize,
    history: &PatternUsageHistory,
) -> String {
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
                if i == 0 || i % interval != 0 {
                    return sentence.to_string();
                }
                // A sentence with no coordinating joint cannot be
                // clause-swapped, so the swap only competes for selection
                // when it would apply. Recorded counts then always match a
                // transform that actually ran.
                let swapped = clause_swap(sentence);
                let candidates: &[&str] = if swapped.is_some() {
                    &TRANSFORM_KEYS
                } else {
                    &TRANSFORM_KEYS[1..]
                };
                let key_idx =
                    history.select_and_record(VariationSlot::Restructure, candidates);
                match (candidates[key_idx], swapped) {
                    ("clause_swap", Some(out)) => out,
                    _ => fronted_adverb(sentence, history),
                }
            })
            .collect();
        rewritten.join(" ")
    })
}
