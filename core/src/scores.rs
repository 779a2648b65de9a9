use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value, json};
use utoipa::ToSchema;

/// Maximum comment length carried over from raw model text.
const RAW_COMMENT_MAX: usize = 900;

/// Canonical 0–10 sub-scores. `coherence` is serialized only when the
/// upstream payload actually supplied one.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ScoreSet {
    pub pronunciation: f64,
    pub grammar: f64,
    pub fluency: f64,
    pub vocabulary: f64,
    pub overall: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coherence: Option<f64>,
}

impl ScoreSet {
    /// All-zero scores with an explicit zero coherence, used when nothing
    /// structured could be recovered from the model output.
    pub fn zeroed() -> Self {
        Self {
            pronunciation: 0.0,
            grammar: 0.0,
            fluency: 0.0,
            vocabulary: 0.0,
            overall: 0.0,
            coherence: Some(0.0),
        }
    }
}

/// Well-formed result of normalizing an arbitrary feedback payload.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct NormalizedFeedback {
    pub scores: ScoreSet,
    pub comment: String,
}

/// Coerce a loosely-typed score into [0,10]. Numbers and numeric strings are
/// accepted; anything else (missing, null, garbage) becomes 0 rather than an
/// error. NaN is neutralized to 0 by the max/min chain.
pub fn clamp_score(value: Option<&Value>) -> f64 {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    raw.max(0.0).min(10.0)
}

/// Normalize a feedback object that may carry its scores nested under a
/// `scores` key or flat at the top level.
///
/// `overall` is clamped when present and otherwise derived as the mean of the
/// four sub-skills (coherence excluded from the derivation). An explicit JSON
/// `null` overall counts as absent. Output is well-formed even from garbage
/// input; this is the fallback boundary against unreliable model output.
pub fn normalize_feedback(raw: &Value) -> NormalizedFeedback {
    let empty = Map::new();
    let top = raw.as_object().unwrap_or(&empty);
    let scores = top
        .get("scores")
        .and_then(Value::as_object)
        .unwrap_or(top);

    let pronunciation = clamp_score(scores.get("pronunciation"));
    let grammar = clamp_score(scores.get("grammar"));
    let fluency = clamp_score(scores.get("fluency"));
    let vocabulary = clamp_score(scores.get("vocabulary"));
    let coherence = scores
        .contains_key("coherence")
        .then(|| clamp_score(scores.get("coherence")));

    let overall = match scores.get("overall") {
        Some(v) if !v.is_null() => clamp_score(Some(v)),
        _ => (pronunciation + grammar + fluency + vocabulary) / 4.0,
    };

    let comment = top
        .get("comment")
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim()
        .to_string();

    NormalizedFeedback {
        scores: ScoreSet {
            pronunciation,
            grammar,
            fluency,
            vocabulary,
            overall,
            coherence,
        },
        comment,
    }
}

static FENCED_JSON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:[a-zA-Z]+)?\s*(\{.*?\})\s*```").expect("valid fenced block regex")
});

static LABEL_RES: LazyLock<[(&'static str, Regex); 5]> = LazyLock::new(|| {
    ["Pronunciation", "Grammar", "Fluency", "Vocabulary", "Overall"].map(|label| {
        let re = Regex::new(&format!(
            r"(?i){label}\s*:\s*([0-9]+(?:\.[0-9]+)?)(?:\s*/\s*10)?"
        ))
        .expect("valid label regex");
        (label, re)
    })
});

fn grab_label(text: &str, label: &str) -> Option<f64> {
    LABEL_RES
        .iter()
        .find(|(l, _)| *l == label)
        .and_then(|(_, re)| re.captures(text))
        .and_then(|c| c[1].parse().ok())
}

/// Scan for the first balanced `{...}` span by brace-depth counting and try
/// to parse it. Stops at the first balanced candidate, parseable or not.
fn balanced_json_span(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    for (offset, ch) in text[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    let candidate = &text[start..start + offset + 1];
                    return serde_json::from_str(candidate).ok();
                }
            }
            _ => {}
        }
    }
    None
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Recover a structured scores object from free-text model output when strict
/// JSON parsing has already failed.
///
/// Strategies, in order: a fenced code block containing a JSON object; the
/// first balanced `{...}` span; regex extraction of `Label: number` pairs for
/// the four sub-skills, synthesizing a minimal object with the raw text as
/// comment. `None` is a normal outcome, not an error; callers fall back to a
/// default response.
pub fn extract_structured_block(text: &str) -> Option<Value> {
    if text.is_empty() {
        return None;
    }

    if let Some(captures) = FENCED_JSON_RE.captures(text) {
        if let Ok(value) = serde_json::from_str::<Value>(&captures[1]) {
            return Some(value);
        }
    }

    if let Some(value) = balanced_json_span(text) {
        return Some(value);
    }

    let pronunciation = grab_label(text, "Pronunciation");
    let grammar = grab_label(text, "Grammar");
    let fluency = grab_label(text, "Fluency");
    let vocabulary = grab_label(text, "Vocabulary");
    let overall = grab_label(text, "Overall");

    if [pronunciation, grammar, fluency, vocabulary]
        .iter()
        .any(Option::is_some)
    {
        return Some(json!({
            "scores": {
                "pronunciation": pronunciation.unwrap_or(0.0),
                "grammar": grammar.unwrap_or(0.0),
                "fluency": fluency.unwrap_or(0.0),
                "vocabulary": vocabulary.unwrap_or(0.0),
                "overall": overall,
            },
            "comment": truncate_chars(text.trim(), RAW_COMMENT_MAX),
        }));
    }

    None
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{clamp_score, extract_structured_block, normalize_feedback};

    #[test]
    fn clamp_bounds_and_coercion() {
        assert_eq!(clamp_score(Some(&json!(-5))), 0.0);
        assert_eq!(clamp_score(Some(&json!(15))), 10.0);
        assert_eq!(clamp_score(Some(&json!(7.25))), 7.25);
        assert_eq!(clamp_score(Some(&json!("6.5"))), 6.5);
        assert_eq!(clamp_score(Some(&json!("garbage"))), 0.0);
        assert_eq!(clamp_score(Some(&json!(null))), 0.0);
        assert_eq!(clamp_score(None), 0.0);
    }

    #[test]
    fn overall_derived_from_four_sub_skills() {
        let norm = normalize_feedback(&json!({
            "scores": {"pronunciation": 8, "grammar": 6, "fluency": 7, "vocabulary": 9}
        }));
        assert_eq!(norm.scores.overall, 7.5);
        assert_eq!(norm.scores.coherence, None);
    }

    #[test]
    fn explicit_overall_is_clamped_not_derived() {
        let norm = normalize_feedback(&json!({
            "scores": {"pronunciation": 2, "grammar": 2, "fluency": 2, "vocabulary": 2, "overall": 99}
        }));
        assert_eq!(norm.scores.overall, 10.0);
    }

    #[test]
    fn null_overall_counts_as_absent() {
        let norm = normalize_feedback(&json!({
            "scores": {"pronunciation": 4, "grammar": 4, "fluency": 4, "vocabulary": 4, "overall": null}
        }));
        assert_eq!(norm.scores.overall, 4.0);
    }

    #[test]
    fn flat_payloads_are_accepted() {
        let norm = normalize_feedback(&json!({
            "pronunciation": 5, "grammar": 5, "fluency": 5, "vocabulary": 5,
            "comment": "  solid effort  "
        }));
        assert_eq!(norm.scores.overall, 5.0);
        assert_eq!(norm.comment, "solid effort");
    }

    #[test]
    fn supplied_coherence_passes_through() {
        let norm = normalize_feedback(&json!({
            "scores": {"pronunciation": 6, "grammar": 6, "fluency": 6, "vocabulary": 6, "coherence": 12}
        }));
        assert_eq!(norm.scores.coherence, Some(10.0));
    }

    #[test]
    fn garbage_input_yields_wellformed_zeroes() {
        let norm = normalize_feedback(&json!("not an object at all"));
        assert_eq!(norm.scores.overall, 0.0);
        assert_eq!(norm.comment, "");
    }

    #[test]
    fn extractor_prefers_fenced_block() {
        let text = "Here you go:\n```json\n{\"scores\":{\"grammar\":7}}\n```\ndone";
        let value = extract_structured_block(text).expect("fenced block should parse");
        assert_eq!(value["scores"]["grammar"], json!(7));
    }

    #[test]
    fn extractor_falls_back_to_balanced_span() {
        let text = "prefix {\"scores\": {\"fluency\": 5}} suffix";
        let value = extract_structured_block(text).expect("balanced span should parse");
        assert_eq!(value["scores"]["fluency"], json!(5));
    }

    #[test]
    fn extractor_falls_back_to_label_pairs() {
        let text = "Pronunciation: 7/10\nGrammar: 6\nFluency: 8.5\nVocabulary: 5";
        let value = extract_structured_block(text).expect("labels should synthesize an object");
        assert_eq!(value["scores"]["pronunciation"], json!(7.0));
        assert_eq!(value["scores"]["fluency"], json!(8.5));
        assert_eq!(value["scores"]["overall"], json!(null));
        assert_eq!(value["comment"].as_str().unwrap(), text);
    }

    #[test]
    fn extractor_returns_none_for_prose() {
        assert_eq!(extract_structured_block(""), None);
        assert_eq!(
            extract_structured_block("Great session, keep practicing!"),
            None
        );
    }

    #[test]
    fn label_synthesis_then_normalize_derives_overall() {
        let text = "Pronunciation: 8\nGrammar: 6\nFluency: 7\nVocabulary: 9";
        let value = extract_structured_block(text).unwrap();
        let norm = normalize_feedback(&value);
        assert_eq!(norm.scores.overall, 7.5);
    }
}
