//! Context assembly for one query: text joining, word counting, and the
//! prompt layout sent to the backend.

use crate::db::CaptureRecord;

/// Context chosen for one query after scanning the interval ladder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedContext {
    pub text: String,
    pub word_count: usize,
    pub interval_seconds: u32,
    pub time_range: String,
}

impl SelectedContext {
    /// Sentinel for the case where every interval came back empty.
    pub fn empty() -> Self {
        Self {
            text: String::new(),
            word_count: 0,
            interval_seconds: 0,
            time_range: time_range_label(0),
        }
    }

    pub fn from_records(interval_seconds: u32, records: &[CaptureRecord]) -> Self {
        let text = join_texts(records);
        let word_count = word_count(&text);
        Self {
            text,
            word_count,
            interval_seconds,
            time_range: time_range_label(interval_seconds),
        }
    }
}

/// Newline-joins record texts, preserving the store's newest-first order.
pub fn join_texts(records: &[CaptureRecord]) -> String {
    records
        .iter()
        .map(|record| record.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Whitespace-token count of the assembled context.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn time_range_label(interval_seconds: u32) -> String {
    format!("last {interval_seconds} seconds")
}

/// Final prompt layout: system prompt, context block, user query.
pub fn compose_prompt(system_prompt: &str, context_text: &str, query: &str) -> String {
    format!("{system_prompt}\n\nContext:\n{context_text}\n\nUser Query:\n{query}")
}
