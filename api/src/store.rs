//! Profile persistence. The tracker in `speakcoach-core` owns the update
//! rules; this module only moves `SkillProfile` values in and out of sqlite.

use sqlx::SqlitePool;
use speakcoach_core::profile::SkillProfile;

use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct ProfileRow {
    user_id: i64,
    level: i64,
    target_cefr: String,
    ma_pron: f64,
    ma_gram: f64,
    ma_flu: f64,
    ma_vocab: f64,
    ma_overall: f64,
    sessions_count: i64,
    last_objectives: Option<String>,
}

impl ProfileRow {
    fn into_profile(self) -> SkillProfile {
        SkillProfile {
            user_id: self.user_id,
            level: self.level,
            target_cefr: self.target_cefr,
            ma_pron: self.ma_pron,
            ma_gram: self.ma_gram,
            ma_flu: self.ma_flu,
            ma_vocab: self.ma_vocab,
            ma_overall: self.ma_overall,
            sessions_count: self.sessions_count,
            last_objectives: self.last_objectives,
        }
    }
}

/// Fetch the user's profile, creating it with the lazy defaults (level 2,
/// target "B1", zeroed averages) on first access.
pub async fn load_or_create_profile(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<SkillProfile, AppError> {
    let existing = sqlx::query_as::<_, ProfileRow>(
        r#"
        SELECT user_id, level, target_cefr, ma_pron, ma_gram, ma_flu, ma_vocab,
               ma_overall, sessions_count, last_objectives
        FROM profiles
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    if let Some(row) = existing {
        return Ok(row.into_profile());
    }

    let profile = SkillProfile::new(user_id);
    sqlx::query(
        r#"
        INSERT INTO profiles (user_id, level, target_cefr, ma_pron, ma_gram, ma_flu,
                              ma_vocab, ma_overall, sessions_count, last_objectives)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(user_id) DO NOTHING
        "#,
    )
    .bind(profile.user_id)
    .bind(profile.level)
    .bind(&profile.target_cefr)
    .bind(profile.ma_pron)
    .bind(profile.ma_gram)
    .bind(profile.ma_flu)
    .bind(profile.ma_vocab)
    .bind(profile.ma_overall)
    .bind(profile.sessions_count)
    .bind(&profile.last_objectives)
    .execute(pool)
    .await?;

    Ok(profile)
}

/// Write the mutable profile fields back. Identity fields never change.
pub async fn persist_profile(pool: &SqlitePool, profile: &SkillProfile) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE profiles
        SET level = ?, target_cefr = ?, ma_pron = ?, ma_gram = ?, ma_flu = ?,
            ma_vocab = ?, ma_overall = ?, sessions_count = ?, last_objectives = ?
        WHERE user_id = ?
        "#,
    )
    .bind(profile.level)
    .bind(&profile.target_cefr)
    .bind(profile.ma_pron)
    .bind(profile.ma_gram)
    .bind(profile.ma_flu)
    .bind(profile.ma_vocab)
    .bind(profile.ma_overall)
    .bind(profile.sessions_count)
    .bind(&profile.last_objectives)
    .bind(profile.user_id)
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    sqlx::migrate!("../migrations")
        .run(&pool)
        .await
        .expect("migrations apply");
    pool
}
