use serde::Serialize;
use utoipa::ToSchema;

/// Smoothing factor: the newest session carries half the weight.
pub const MA_ALPHA: f64 = 0.5;

const LEVEL_MIN: i64 = 1;
const LEVEL_MAX: i64 = 5;
const PROMOTE_MIN_SESSIONS: i64 = 3;
const PROMOTE_OVERALL_AT: f64 = 7.5;
const DEMOTE_MIN_SESSIONS: i64 = 2;
const DEMOTE_OVERALL_AT: f64 = 4.0;

const DEFAULT_LEVEL: i64 = 2;
const DEFAULT_TARGET_CEFR: &str = "B1";

/// Clamped per-session sub-scores feeding the profile update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionScores {
    pub pronunciation: f64,
    pub grammar: f64,
    pub fluency: f64,
    pub vocabulary: f64,
    pub overall: f64,
}

/// Per-user learner state: exponentially smoothed sub-skill averages, a
/// session counter, and a discrete level 1–5 with hysteresis.
///
/// This type is the only writer of MA and level state; every other component
/// reads it. Persistence is the caller's concern; the tracker operates on
/// values passed in and out.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillProfile {
    pub user_id: i64,
    pub level: i64,
    pub target_cefr: String,
    pub ma_pron: f64,
    pub ma_gram: f64,
    pub ma_flu: f64,
    pub ma_vocab: f64,
    pub ma_overall: f64,
    pub sessions_count: i64,
    pub last_objectives: Option<String>,
}

impl SkillProfile {
    /// Lazy-creation defaults: level 2, target "B1", all averages at the
    /// zero sentinel.
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            level: DEFAULT_LEVEL,
            target_cefr: DEFAULT_TARGET_CEFR.to_string(),
            ma_pron: 0.0,
            ma_gram: 0.0,
            ma_flu: 0.0,
            ma_vocab: 0.0,
            ma_overall: 0.0,
            sessions_count: 0,
            last_objectives: None,
        }
    }

    /// Fold one completed session into the profile: update all five moving
    /// averages with the pre-update session count, increment the count, then
    /// re-evaluate the level.
    pub fn apply_session(&mut self, scores: &SessionScores) {
        let n_prev = self.sessions_count;
        self.ma_pron = ma_update(self.ma_pron, scores.pronunciation, n_prev);
        self.ma_gram = ma_update(self.ma_gram, scores.grammar, n_prev);
        self.ma_flu = ma_update(self.ma_flu, scores.fluency, n_prev);
        self.ma_vocab = ma_update(self.ma_vocab, scores.vocabulary, n_prev);
        self.ma_overall = ma_update(self.ma_overall, scores.overall, n_prev);
        self.sessions_count = n_prev + 1;
        self.adjust_level();
    }

    /// Level hysteresis over the updated averages. Promotion is checked
    /// first; demotion only when promotion did not apply. At most one step
    /// per session, bounded to 1..=5.
    fn adjust_level(&mut self) {
        if self.sessions_count >= PROMOTE_MIN_SESSIONS
            && self.ma_overall >= PROMOTE_OVERALL_AT
            && self.level < LEVEL_MAX
        {
            self.level += 1;
        } else if self.sessions_count >= DEMOTE_MIN_SESSIONS
            && self.ma_overall <= DEMOTE_OVERALL_AT
            && self.level > LEVEL_MIN
        {
            self.level -= 1;
        }
    }
}

/// Exponential moving-average step. A zero-or-below prior average (or a
/// fresh profile) is the uninitialized sentinel: the first real signal is
/// taken verbatim instead of being diluted by the zero default.
pub fn ma_update(prev: f64, new: f64, n_prev: i64) -> f64 {
    if n_prev <= 0 || prev <= 0.0 {
        new
    } else {
        MA_ALPHA * new + (1.0 - MA_ALPHA) * prev
    }
}

/// Moving averages as exposed on the wire (`ma` object of profile payloads).
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MovingAverages {
    pub pronunciation: f64,
    pub grammar: f64,
    pub fluency: f64,
    pub vocabulary: f64,
    pub overall: f64,
}

impl From<&SkillProfile> for MovingAverages {
    fn from(profile: &SkillProfile) -> Self {
        Self {
            pronunciation: profile.ma_pron,
            grammar: profile.ma_gram,
            fluency: profile.ma_flu,
            vocabulary: profile.ma_vocab,
            overall: profile.ma_overall,
        }
    }
}
