//! Value-level rules for the agentic memory store: tag/topic truncation,
//! list bounds, and weight coercion. The SQL upsert/append contract lives in
//! the api crate; these functions keep it deterministic.

use serde_json::Value;

pub const TAG_MAX_CHARS: usize = 64;
pub const TOPIC_MAX_CHARS: usize = 128;
pub const DESCRIPTION_MAX_CHARS: usize = 2000;
pub const SUMMARY_MAX_CHARS: usize = 2000;
pub const EXAMPLES_MAX: usize = 5;
pub const VOCAB_ITEMS_MAX: usize = 10;

pub const DEFAULT_WEIGHT: f64 = 1.0;
const WEIGHT_MIN: f64 = 0.0;
const WEIGHT_MAX: f64 = 3.0;

/// Truncate to a bounded number of characters, staying on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Error-pattern key: trimmed, bounded, "misc" when absent or blank.
pub fn normalize_tag(raw: Option<&str>) -> String {
    let tag = raw.map(str::trim).filter(|t| !t.is_empty()).unwrap_or("misc");
    truncate_chars(tag, TAG_MAX_CHARS).to_string()
}

/// Vocab-target topic: bounded, "general" when absent or blank.
pub fn normalize_topic(raw: Option<&str>) -> String {
    let topic = raw
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("general");
    truncate_chars(topic, TOPIC_MAX_CHARS).to_string()
}

fn join_bounded(items: &[Value], max: usize) -> String {
    items
        .iter()
        .take(max)
        .filter_map(Value::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}

/// "wrong -> better" example pairs, at most five, joined as lines.
pub fn join_examples(items: &[Value]) -> String {
    join_bounded(items, EXAMPLES_MAX)
}

/// Vocabulary items, at most ten, joined as lines.
pub fn join_vocab_items(items: &[Value]) -> String {
    join_bounded(items, VOCAB_ITEMS_MAX)
}

/// Severity weight from a loosely-typed value. Numbers and numeric strings
/// parse and are bounded to [0,3]; anything else yields the fallback.
pub fn parse_weight(value: Option<&Value>, fallback: f64) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(w) => w.max(WEIGHT_MIN).min(WEIGHT_MAX),
        None => fallback,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{
        DEFAULT_WEIGHT, join_examples, join_vocab_items, normalize_tag, normalize_topic,
        parse_weight, truncate_chars,
    };

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        // multi-byte chars must not be split
        assert_eq!(truncate_chars("héllo", 2), "hé");
    }

    #[test]
    fn tags_default_and_truncate() {
        assert_eq!(normalize_tag(None), "misc");
        assert_eq!(normalize_tag(Some("   ")), "misc");
        assert_eq!(normalize_tag(Some(" articles ")), "articles");
        let long = "t".repeat(100);
        assert_eq!(normalize_tag(Some(&long)).len(), 64);
    }

    #[test]
    fn topics_default_and_truncate() {
        assert_eq!(normalize_topic(None), "general");
        let long = "x".repeat(200);
        assert_eq!(normalize_topic(Some(&long)).len(), 128);
    }

    #[test]
    fn examples_are_capped_at_five() {
        let items: Vec<_> = (0..8).map(|i| json!(format!("wrong{i} -> better{i}"))).collect();
        let joined = join_examples(&items);
        assert_eq!(joined.lines().count(), 5);
        assert!(joined.starts_with("wrong0 -> better0"));
    }

    #[test]
    fn vocab_items_are_capped_at_ten_and_skip_non_strings() {
        let mut items: Vec<_> = (0..12).map(|i| json!(format!("term{i}"))).collect();
        items.insert(0, json!(42));
        let joined = join_vocab_items(&items);
        // the non-string slot still consumes a position in the cap
        assert_eq!(joined.lines().count(), 9);
    }

    #[test]
    fn weight_parses_numbers_and_numeric_strings() {
        assert_eq!(parse_weight(Some(&json!(2.5)), DEFAULT_WEIGHT), 2.5);
        assert_eq!(parse_weight(Some(&json!("1.5")), DEFAULT_WEIGHT), 1.5);
        assert_eq!(parse_weight(Some(&json!(9)), DEFAULT_WEIGHT), 3.0);
        assert_eq!(parse_weight(Some(&json!(-1)), DEFAULT_WEIGHT), 0.0);
    }

    #[test]
    fn weight_falls_back_when_unparsable() {
        assert_eq!(parse_weight(None, DEFAULT_WEIGHT), 1.0);
        assert_eq!(parse_weight(Some(&json!(null)), 2.0), 2.0);
        assert_eq!(parse_weight(Some(&json!("heavy")), 2.0), 2.0);
        assert_eq!(parse_weight(Some(&json!(["x"])), 2.0), 2.0);
    }
}
