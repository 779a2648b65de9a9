use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One turn of a practice dialogue. Only turns with role "user" contribute
/// to objective metrics; assistant and system turns are carried for context.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DialogueTurn {
    pub role: String,
    pub content: String,
}

/// Numeric features computed directly from the transcript, independent of
/// any model-provided subjective score.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ObjectiveMetrics {
    pub total_words: u32,
    pub unique_words: u32,
    /// unique/total × 100, one decimal
    pub type_token_ratio: f64,
    pub avg_sentence_len: f64,
    pub filler_per_100w: f64,
    pub mean_utterance_len: f64,
    /// Words per minute. `None` when no usable duration was supplied;
    /// absence of a duration must not read as a rate of zero.
    pub speech_rate_wpm: Option<f64>,
}

/// Filler vocabulary counted as fluency-disruption signals. Single words are
/// matched as whole tokens; multi-word entries as space-padded substrings.
const FILLERS: &[&str] = &[
    "um",
    "uh",
    "erm",
    "ah",
    "like",
    "you know",
    "actually",
    "basically",
    "literally",
    "sort of",
    "kind of",
    "so",
];

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z']+").expect("valid word regex"));

static SENTENCE_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("valid sentence split regex"));

/// Lowercase alphabetic word tokens, apostrophes retained.
fn tokenize_words(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD_RE
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Split on `.`, `!`, `?` boundaries; consecutive punctuation collapses and
/// empty fragments are discarded.
fn split_sentences(text: &str) -> Vec<String> {
    SENTENCE_SPLIT_RE
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn count_fillers(text: &str, tokens: &[String]) -> usize {
    let padded = format!(" {} ", text.to_lowercase());
    FILLERS
        .iter()
        .map(|filler| {
            if filler.contains(' ') {
                padded.matches(&format!(" {filler} ")).count()
            } else {
                tokens.iter().filter(|t| t.as_str() == *filler).count()
            }
        })
        .sum()
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Compute objective speech metrics over the user side of a dialogue.
///
/// Pure and total: malformed or empty input yields all-zero metrics (and a
/// `None` speech rate), never an error.
pub fn objective_metrics(turns: &[DialogueTurn], duration_min: Option<f64>) -> ObjectiveMetrics {
    let user_utterances: Vec<&str> = turns
        .iter()
        .filter(|t| t.role == "user")
        .map(|t| t.content.as_str())
        .collect();
    let user_text = user_utterances.join("\n");

    let tokens = tokenize_words(&user_text);
    let total_words = tokens.len();
    let unique_words = tokens.iter().collect::<HashSet<_>>().len();

    let type_token_ratio = if total_words > 0 {
        unique_words as f64 / total_words as f64 * 100.0
    } else {
        0.0
    };

    let sentences = split_sentences(&user_text);
    let avg_sentence_len = if sentences.is_empty() {
        0.0
    } else {
        total_words as f64 / sentences.len() as f64
    };

    let fillers = count_fillers(&user_text, &tokens);
    let filler_per_100w = if total_words > 0 {
        fillers as f64 / total_words as f64 * 100.0
    } else {
        0.0
    };

    let mean_utterance_len = if user_utterances.is_empty() {
        0.0
    } else {
        total_words as f64 / user_utterances.len() as f64
    };

    let speech_rate_wpm = duration_min
        .filter(|d| *d > 0.0)
        .map(|d| round1(total_words as f64 / d));

    ObjectiveMetrics {
        total_words: total_words as u32,
        unique_words: unique_words as u32,
        type_token_ratio: round1(type_token_ratio),
        avg_sentence_len: round2(avg_sentence_len),
        filler_per_100w: round2(filler_per_100w),
        mean_utterance_len: round2(mean_utterance_len),
        speech_rate_wpm,
    }
}
