//! User profile repository (§6.4): the durable counterpart to
//! `interlingo_coordinator::ProfileCache` entries.

use chrono::{DateTime, Utc};
use interlingo_core::{Gender, Language, Preferences, UserProfile, VoiceAvatar};

use crate::{PersistenceError, ScyllaClient};

#[derive(Clone)]
pub struct UserProfileRepository {
    client: ScyllaClient,
}

impl UserProfileRepository {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }

    pub async fn upsert_user_profile(&self, profile: &UserProfile) -> Result<(), PersistenceError> {
        let query = format!(
            "INSERT INTO {}.user_profiles (
                identity, native_language, voice_avatar_id, voice_provider,
                formal_tone, preserve_emotion, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    &profile.identity,
                    profile.native_language.code(),
                    &profile.preferred_voice_avatar.voice_id,
                    &profile.preferred_voice_avatar.provider,
                    profile.preferences.formal_tone,
                    profile.preferences.preserve_emotion,
                    profile.updated_at.timestamp_millis(),
                    profile.updated_at.timestamp_millis(),
                ),
            )
            .await?;

        Ok(())
    }

    pub async fn fetch_user_profile(&self, identity: &str) -> Result<Option<UserProfile>, PersistenceError> {
        let query = format!(
            "SELECT identity, native_language, voice_avatar_id, voice_provider,
                    formal_tone, preserve_emotion, updated_at
             FROM {}.user_profiles WHERE identity = ?",
            self.client.keyspace()
        );

        let result = self.client.session().query_unpaged(query, (identity,)).await?;

        let Some(rows) = result.rows else { return Ok(None) };
        let Some(row) = rows.into_iter().next() else { return Ok(None) };

        let (identity, native_language, voice_avatar_id, voice_provider, formal_tone, preserve_emotion, updated_at): (
            String,
            String,
            String,
            String,
            bool,
            bool,
            i64,
        ) = row.into_typed().map_err(|e| PersistenceError::InvalidData(e.to_string()))?;

        let native_language = Language::parse(&native_language)
            .ok_or_else(|| PersistenceError::InvalidData(format!("unrecognized language tag: {native_language}")))?;

        // Persisted rows only describe the voice avatar's identity, not its
        // display metadata; the full catalog entry comes from the voice
        // avatar repository when a caller needs more than voice_id/provider.
        let preferred_voice_avatar =
            VoiceAvatar::new(voice_avatar_id, voice_provider, native_language, "", Gender::Neutral);

        Ok(Some(UserProfile {
            identity,
            native_language,
            preferred_voice_avatar,
            preferences: Preferences { formal_tone, preserve_emotion },
            updated_at: DateTime::from_timestamp_millis(updated_at).unwrap_or_else(Utc::now),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_preserves_preferences_shape() {
        let avatar = VoiceAvatar::new("v1", "fake-tts", Language::En, "Avatar", Gender::Female);
        let profile = UserProfile::new("alice", Language::En, avatar);
        assert!(!profile.preferences.formal_tone);
        assert!(!profile.preferences.preserve_emotion);
    }
}
