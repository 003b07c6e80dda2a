use crate::aliases::AliasTable;
use indexmap::IndexSet;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

static SEPARATOR_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_separator_regex() -> &'static Regex {
    SEPARATOR_REGEX.get_or_init(|| Regex::new(r"[,\r\n]+").unwrap())
}

#[derive(Debug, Clone, Serialize)]
pub struct NormalizeTrace {
    pub raw: String,
    pub normalized: String,
    /// Set when the alias table rewrote the cleaned token.
    pub alias_applied: Option<String>,
}

/// Lowercases, turns ASCII punctuation into spaces and collapses whitespace.
/// Non-ASCII characters are kept so other scripts (and their combining
/// marks) survive intact.
pub fn clean_token(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || (!c.is_ascii() && !c.is_whitespace()) { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalizes one ingredient token to its canonical name.
/// Tokens the alias table does not know are their own canonical form.
pub fn normalize_ingredient(raw: &str, aliases: &AliasTable) -> (String, NormalizeTrace) {
    let cleaned = clean_token(raw);

    let (normalized, alias_applied) = match aliases.resolve(&cleaned) {
        Some(canonical) if canonical != cleaned => (canonical.to_string(), Some(cleaned.clone())),
        _ => (cleaned.clone(), None),
    };

    (
        normalized.clone(),
        NormalizeTrace {
            raw: raw.to_string(),
            normalized,
            alias_applied,
        },
    )
}

/// Splits comma/newline separated text and normalizes each token.
/// Result is deduplicated and keeps first-seen order.
pub fn normalize_ingredients(text: &str, aliases: &AliasTable) -> IndexSet<String> {
    normalize_ingredients_traced(text, aliases).0
}

pub fn normalize_ingredients_traced(text: &str, aliases: &AliasTable) -> (IndexSet<String>, Vec<NormalizeTrace>) {
    let mut normalized = IndexSet::new();
    let mut traces = Vec::new();

    for token in get_separator_regex().split(text) {
        if token.trim().is_empty() {
            continue;
        }
        let (canonical, trace) = normalize_ingredient(token, aliases);
        if canonical.is_empty() {
            continue;
        }
        normalized.insert(canonical);
        traces.push(trace);
    }

    (normalized, traces)
}
