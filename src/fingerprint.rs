//! Content normalization and hashing for duplicate detection.
//!
//! ## Purpose
//!
//! This module defines two distinct hashes with different jobs:
//!
//! 1. **Fingerprint** (xxh64 over normalized text): cheap, run-scoped
//!    near-duplicate detection. Numbers and calendar words are replaced by
//!    canonical tokens before hashing, so trivial numeric/date differences
//!    never mask a structural duplicate.
//! 2. **Content hash** (SHA-256 over title + keyword + section bodies): the
//!    authoritative, persistent dedup key checked by the page record store.
//!
//! ## Normalization Rules
//!
//! ```text
//! fingerprint_input(text) = collapse_ws(canonical_tokens(lowercase(trim(normalize_newlines(text)))))
//! ```
//!
//! Where `canonical_tokens` replaces:
//! - any digit run → `NUM`
//! - month names (full and three-letter) → `MONTH`
//! - weekday names (full and three-letter) → `DAY`
//!
//! ## Determinism
//!
//! Every function in this module is a pure function of its input; same text
//! always produces the same hash, across repeated calls and processes.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::OnceLock;
use xxhash_rust::xxh64::xxh64;

use regex_lite::Regex;

/// Version of the fingerprint normalization scheme.
///
/// Increment when the normalization algorithm changes. Changing this
/// invalidates cross-run fingerprint comparisons.
pub const NORMALIZATION_VERSION: &str = "1.0.0";

fn digit_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]+").expect("digit regex is valid"))
}

fn month_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\b(january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sep|oct|nov|dec)\b",
        )
        .expect("month regex is valid")
    })
}

fn day_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(monday|tuesday|wednesday|thursday|friday|saturday|sunday|mon|tue|wed|thu|fri|sat|sun)\b")
            .expect("day regex is valid")
    })
}

/// Normalize newlines and trim surrounding whitespace.
///
/// CRLF → LF, isolated CR → LF, then trim. This is the shared base step for
/// both hash flavors.
pub fn normalize_text(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    normalized.trim().to_string()
}

/// Normalize text to fingerprint form.
///
/// Lowercases, replaces digit runs with `NUM`, calendar words with
/// `MONTH`/`DAY`, and collapses all whitespace to single spaces.
///
/// # Example
///
/// ```rust
/// use pagegen_kernel::fingerprint::normalize_for_fingerprint;
///
/// let a = normalize_for_fingerprint("Serving 500 homes since January 2019");
/// let b = normalize_for_fingerprint("Serving 750 homes since March 2022");
/// assert_eq!(a, b);
/// ```
pub fn normalize_for_fingerprint(text: &str) -> String {
    let lowered = normalize_text(text).to_lowercase();
    let no_digits = digit_regex().replace_all(&lowered, "NUM");
    let no_months = month_regex().replace_all(&no_digits, "MONTH");
    let no_days = day_regex().replace_all(&no_months, "DAY");
    no_days.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Compute the run-scoped near-duplicate fingerprint of a body text.
///
/// Returns the xxh64 of the normalized form as a 16-character hex string.
pub fn compute_fingerprint(text: &str) -> String {
    let normalized = normalize_for_fingerprint(text);
    format!("{:016x}", xxh64(normalized.as_bytes(), 0))
}

/// Compute the authoritative SHA-256 content hash for a page.
///
/// The hash covers the title, the target keyword, and every section body,
/// each newline-normalized and joined with a separator byte so that section
/// boundaries cannot alias.
///
/// Returns a 64-character lowercase hex string.
pub fn compute_content_hash(title: &str, keyword: &str, sections: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize_text(title).as_bytes());
    hasher.update([0u8]);
    hasher.update(normalize_text(keyword).as_bytes());
    for section in sections {
        hasher.update([0u8]);
        hasher.update(normalize_text(section).as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Serialize a value to canonical JSON bytes for hashing.
///
/// Struct fields serialize in declaration order and vectors in index order;
/// maps in hashed data must be `BTreeMap`, never `HashMap`.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).expect("canonical serialization failed")
}

/// Compute the canonical hash of a serializable value as a hex string.
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> String {
    format!("{:016x}", xxh64(&to_canonical_bytes(value), 0))
}
