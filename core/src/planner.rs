use crate::profile::SkillProfile;

/// The four coached sub-skills. Variant order is the tie-break priority for
/// weakest-skill selection; first encountered wins on equal averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Pronunciation,
    Grammar,
    Fluency,
    Vocabulary,
}

impl Focus {
    /// Short tag stored on plan items and shown in prompts.
    pub fn tag(self) -> &'static str {
        match self {
            Focus::Pronunciation => "pron",
            Focus::Grammar => "gram",
            Focus::Fluency => "fluency",
            Focus::Vocabulary => "vocab",
        }
    }
}

/// Arg-min over the four sub-skill averages, with an explicit scan in
/// priority order rather than relying on any container iteration order.
pub fn weakest_focus(profile: &SkillProfile) -> Focus {
    let candidates = [
        (Focus::Pronunciation, profile.ma_pron),
        (Focus::Grammar, profile.ma_gram),
        (Focus::Fluency, profile.ma_flu),
        (Focus::Vocabulary, profile.ma_vocab),
    ];
    let mut weakest = candidates[0];
    for candidate in candidates.into_iter().skip(1) {
        if candidate.1 < weakest.1 {
            weakest = candidate;
        }
    }
    weakest.0
}

/// Fixed focus → practice scenario mapping.
pub fn scenario_for(focus: Focus) -> &'static str {
    match focus {
        Focus::Pronunciation => "Daily Conversation",
        Focus::Grammar => "Business Meeting",
        Focus::Fluency => "Travel Situations",
        Focus::Vocabulary => "Job Interview",
    }
}

/// CEFR band label for a 1–5 level. Out-of-range levels read as the middle
/// band; they should not occur but must not panic.
pub fn level_label(level: i64) -> &'static str {
    match level {
        1 => "Beginner (A1-A2)",
        2 => "Pre-Intermediate (A2-B1)",
        3 => "Intermediate (B1-B2)",
        4 => "Upper-Intermediate (B2)",
        5 => "Advanced (C1)",
        _ => "Intermediate",
    }
}

fn coaching_tip(focus: Focus) -> &'static str {
    match focus {
        Focus::Pronunciation => {
            "Focus on clear vowel/consonant sounds and word stress. Keep sentences short."
        }
        Focus::Grammar => "Use correct tense and articles. Try to self-correct one mistake.",
        Focus::Fluency => {
            "Keep talking without long pauses; use fillers like 'well', 'let me think'."
        }
        Focus::Vocabulary => "Use 2-3 specific terms and 1 collocation appropriate to the topic.",
    }
}

/// Leveled instruction block handed to the conversation model for the next
/// practice item.
pub fn practice_prompt(focus: Focus, level: i64) -> String {
    format!(
        "Level: {}. Focus: {}.\nStart by asking the learner a question.\nGuideline: {}",
        level_label(level),
        focus.tag(),
        coaching_tip(focus)
    )
}
