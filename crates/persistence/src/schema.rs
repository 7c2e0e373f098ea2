//! ScyllaDB schema creation (§6.4): user profiles, rooms, voice catalog.

use scylla::Session;
use crate::error::PersistenceError;

/// Create the keyspace if it doesn't exist
pub async fn create_keyspace(session: &Session, keyspace: &str, replication_factor: u8) -> Result<(), PersistenceError> {
    let query = format!(
        "CREATE KEYSPACE IF NOT EXISTS {} WITH replication = {{'class': 'SimpleStrategy', 'replication_factor': {}}}",
        keyspace, replication_factor
    );

    session.query_unpaged(query, &[]).await
        .map_err(|e| PersistenceError::SchemaError(format!("failed to create keyspace: {}", e)))?;

    Ok(())
}

/// Create the three tables in §6.4.
pub async fn create_tables(session: &Session, keyspace: &str) -> Result<(), PersistenceError> {
    let user_profiles_table = format!(r#"
        CREATE TABLE IF NOT EXISTS {}.user_profiles (
            identity TEXT,
            native_language TEXT,
            voice_avatar_id TEXT,
            voice_provider TEXT,
            formal_tone BOOLEAN,
            preserve_emotion BOOLEAN,
            created_at TIMESTAMP,
            updated_at TIMESTAMP,
            PRIMARY KEY (identity)
        )
    "#, keyspace);

    session.query_unpaged(user_profiles_table, &[]).await
        .map_err(|e| PersistenceError::SchemaError(format!("failed to create user_profiles table: {}", e)))?;

    let rooms_table = format!(r#"
        CREATE TABLE IF NOT EXISTS {}.rooms (
            room_id TEXT,
            room_name TEXT,
            host_identity TEXT,
            max_participants INT,
            is_active BOOLEAN,
            room_type TEXT,
            created_at TIMESTAMP,
            updated_at TIMESTAMP,
            PRIMARY KEY (room_id)
        )
    "#, keyspace);

    session.query_unpaged(rooms_table, &[]).await
        .map_err(|e| PersistenceError::SchemaError(format!("failed to create rooms table: {}", e)))?;

    let voice_avatars_table = format!(r#"
        CREATE TABLE IF NOT EXISTS {}.voice_avatars (
            voice_id TEXT,
            provider TEXT,
            name TEXT,
            gender TEXT,
            accent TEXT,
            description TEXT,
            language TEXT,
            created_at TIMESTAMP,
            updated_at TIMESTAMP,
            PRIMARY KEY (voice_id)
        )
    "#, keyspace);

    session.query_unpaged(voice_avatars_table, &[]).await
        .map_err(|e| PersistenceError::SchemaError(format!("failed to create voice_avatars table: {}", e)))?;

    // Secondary lookup table: voice catalog filtered by language without a
    // scan-and-filter over voice_avatars' primary-key-only partitioning.
    let voice_avatars_by_language_table = format!(r#"
        CREATE TABLE IF NOT EXISTS {}.voice_avatars_by_language (
            language TEXT,
            voice_id TEXT,
            provider TEXT,
            name TEXT,
            gender TEXT,
            accent TEXT,
            description TEXT,
            PRIMARY KEY ((language), voice_id)
        )
    "#, keyspace);

    session.query_unpaged(voice_avatars_by_language_table, &[]).await
        .map_err(|e| PersistenceError::SchemaError(format!("failed to create voice_avatars_by_language table: {}", e)))?;

    tracing::info!("all tables created successfully");
    Ok(())
}
