//! Voice avatar catalog repository (§6.4): the durable store backing
//! `VoiceAvatar` lookups, plus a seed catalog with at least one voice per
//! language x gender pair.

use chrono::Utc;
use interlingo_core::{Gender, Language, VoiceAvatar};

use crate::{PersistenceError, ScyllaClient};

#[derive(Clone)]
pub struct VoiceAvatarRepository {
    client: ScyllaClient,
}

impl VoiceAvatarRepository {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }

    pub async fn upsert_voice_avatar(&self, avatar: &VoiceAvatar) -> Result<(), PersistenceError> {
        let now = Utc::now().timestamp_millis();

        let primary = format!(
            "INSERT INTO {}.voice_avatars (
                voice_id, provider, name, gender, accent, description, language, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            self.client.keyspace()
        );
        self.client
            .session()
            .query_unpaged(
                primary,
                (
                    &avatar.voice_id,
                    &avatar.provider,
                    &avatar.display_name,
                    gender_str(avatar.gender),
                    avatar.accent.as_deref(),
                    avatar.description.as_deref(),
                    avatar.language.code(),
                    now,
                    now,
                ),
            )
            .await?;

        let by_language = format!(
            "INSERT INTO {}.voice_avatars_by_language (
                language, voice_id, provider, name, gender, accent, description
            ) VALUES (?, ?, ?, ?, ?, ?, ?)",
            self.client.keyspace()
        );
        self.client
            .session()
            .query_unpaged(
                by_language,
                (
                    avatar.language.code(),
                    &avatar.voice_id,
                    &avatar.provider,
                    &avatar.display_name,
                    gender_str(avatar.gender),
                    avatar.accent.as_deref(),
                    avatar.description.as_deref(),
                ),
            )
            .await?;

        Ok(())
    }

    pub async fn list_voice_avatars_for_language(&self, language: Language) -> Result<Vec<VoiceAvatar>, PersistenceError> {
        let query = format!(
            "SELECT voice_id, provider, name, gender, accent, description
             FROM {}.voice_avatars_by_language WHERE language = ?",
            self.client.keyspace()
        );

        let result = self.client.session().query_unpaged(query, (language.code(),)).await?;

        let mut avatars = Vec::new();
        if let Some(rows) = result.rows {
            for row in rows {
                let (voice_id, provider, name, gender, accent, description): (
                    String,
                    String,
                    String,
                    String,
                    Option<String>,
                    Option<String>,
                ) = row.into_typed().map_err(|e| PersistenceError::InvalidData(e.to_string()))?;

                avatars.push(VoiceAvatar {
                    voice_id,
                    provider,
                    language,
                    display_name: name,
                    gender: parse_gender(&gender),
                    accent,
                    description,
                });
            }
        }

        Ok(avatars)
    }
}

fn gender_str(gender: Gender) -> &'static str {
    match gender {
        Gender::Male => "male",
        Gender::Female => "female",
        Gender::Neutral => "neutral",
    }
}

fn parse_gender(s: &str) -> Gender {
    match s {
        "male" => Gender::Male,
        "female" => Gender::Female,
        _ => Gender::Neutral,
    }
}

/// A minimal seed catalog covering every supported language with at least
/// one male, one female, and one neutral voice, so a fresh deployment never
/// presents an empty voice picker. Intended to be inserted once at startup
/// via `VoiceAvatarRepository::upsert_voice_avatar` if the catalog is empty.
pub fn seed_catalog() -> Vec<VoiceAvatar> {
    const LANGUAGES: [Language; 6] =
        [Language::En, Language::Es, Language::Fr, Language::Yo, Language::Ha, Language::Ig];
    const GENDERS: [(Gender, &str); 3] =
        [(Gender::Male, "male"), (Gender::Female, "female"), (Gender::Neutral, "neutral")];

    let mut catalog = Vec::with_capacity(LANGUAGES.len() * GENDERS.len());
    for language in LANGUAGES {
        for (gender, label) in GENDERS {
            let voice_id = format!("seed-{}-{}", language.code(), label);
            let display_name = format!("{} {}", language.code().to_uppercase(), label);
            catalog.push(VoiceAvatar::new(voice_id, "seed", language, display_name, gender));
        }
    }
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_catalog_covers_every_language_and_gender() {
        let catalog = seed_catalog();
        for language in [Language::En, Language::Es, Language::Fr, Language::Yo, Language::Ha, Language::Ig] {
            for gender in [Gender::Male, Gender::Female, Gender::Neutral] {
                assert!(
                    catalog.iter().any(|v| v.language == language && v.gender == gender),
                    "missing seed voice for {language:?}/{gender:?}"
                );
            }
        }
    }
}
