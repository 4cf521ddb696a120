//! Query-aware context compression.
//!
//! Turns a ranked passage into a short excerpt worth spending prompt
//! budget on. Weather queries route to structured field extraction;
//! everything else keeps the sentences that mention the most query
//! words.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::context::weather::{extract_weather_info, is_weather_query};

const TOP_SENTENCES: usize = 5;
const MIN_SENTENCE_LEN: usize = 20;
const FALLBACK_TRUNCATE_LEN: usize = 800;

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static CLASS_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)class="[^"]*""#).expect("valid regex"));
static MARKUP_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)div|span|section|article").expect("valid regex"));
static SENTENCE_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("valid regex"));

/// Compress a passage into a query-relevant excerpt. Pure function.
pub fn optimize(content: &str, query: &str) -> String {
    let stripped = CLASS_ATTR_RE.replace_all(content, "");
    let stripped = MARKUP_WORD_RE.replace_all(&stripped, "");
    let cleaned = WHITESPACE_RE.replace_all(&stripped, " ").trim().to_string();

    if is_weather_query(query) {
        return extract_weather_info(&cleaned, query);
    }

    let query_words: HashSet<String> = query
        .to_lowercase()
        .split_whitespace()
        .map(|word| word.to_string())
        .collect();

    let sentences: Vec<&str> = SENTENCE_SPLIT_RE
        .split(&cleaned)
        .map(|sentence| sentence.trim())
        .filter(|sentence| sentence.chars().count() > MIN_SENTENCE_LEN)
        .collect();
    let total = sentences.len();

    let mut scored: Vec<(&str, usize)> = sentences
        .into_iter()
        .map(|sentence| {
            let lower = sentence.to_lowercase();
            let score = query_words
                .iter()
                .filter(|word| lower.contains(word.as_str()))
                .count();
            (sentence, score)
        })
        .filter(|(_, score)| *score > 0 || total < 3)
        .collect();

    // Stable sort: earlier sentences win score ties.
    scored.sort_by(|left, right| right.1.cmp(&left.1));

    let top: Vec<&str> = scored
        .into_iter()
        .take(TOP_SENTENCES)
        .map(|(sentence, _)| sentence)
        .collect();

    if !top.is_empty() {
        return format!("{}.", top.join(". "));
    }

    if cleaned.chars().count() > FALLBACK_TRUNCATE_LEN {
        let truncated: String = cleaned.chars().take(FALLBACK_TRUNCATE_LEN).collect();
        format!("{}...", truncated)
    } else {
        cleaned
    }
}
