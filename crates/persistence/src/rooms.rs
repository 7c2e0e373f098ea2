//! Room repository (§6.4): durable room metadata the Worker Host consults
//! when accepting a room-assignment job.

use chrono::{DateTime, Utc};

use crate::{PersistenceError, ScyllaClient};

#[derive(Debug, Clone)]
pub struct Room {
    pub room_id: String,
    pub room_name: String,
    pub host_identity: String,
    pub max_participants: i32,
    pub is_active: bool,
    pub room_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct RoomRepository {
    client: ScyllaClient,
}

impl RoomRepository {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }

    pub async fn upsert_room(&self, room: &Room) -> Result<(), PersistenceError> {
        let query = format!(
            "INSERT INTO {}.rooms (
                room_id, room_name, host_identity, max_participants,
                is_active, room_type, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    &room.room_id,
                    &room.room_name,
                    &room.host_identity,
                    room.max_participants,
                    room.is_active,
                    &room.room_type,
                    room.created_at.timestamp_millis(),
                    room.updated_at.timestamp_millis(),
                ),
            )
            .await?;

        Ok(())
    }

    pub async fn fetch_room(&self, room_id: &str) -> Result<Option<Room>, PersistenceError> {
        let query = format!(
            "SELECT room_id, room_name, host_identity, max_participants,
                    is_active, room_type, created_at, updated_at
             FROM {}.rooms WHERE room_id = ?",
            self.client.keyspace()
        );

        let result = self.client.session().query_unpaged(query, (room_id,)).await?;

        let Some(rows) = result.rows else { return Ok(None) };
        let Some(row) = rows.into_iter().next() else { return Ok(None) };

        let (room_id, room_name, host_identity, max_participants, is_active, room_type, created_at, updated_at): (
            String,
            String,
            String,
            i32,
            bool,
            String,
            i64,
            i64,
        ) = row.into_typed().map_err(|e| PersistenceError::InvalidData(e.to_string()))?;

        Ok(Some(Room {
            room_id,
            room_name,
            host_identity,
            max_participants,
            is_active,
            room_type,
            created_at: DateTime::from_timestamp_millis(created_at).unwrap_or_else(Utc::now),
            updated_at: DateTime::from_timestamp_millis(updated_at).unwrap_or_else(Utc::now),
        }))
    }

    pub async fn set_active(&self, room_id: &str, is_active: bool) -> Result<(), PersistenceError> {
        let query = format!(
            "UPDATE {}.rooms SET is_active = ?, updated_at = ? WHERE room_id = ?",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(query, (is_active, Utc::now().timestamp_millis(), room_id))
            .await?;

        Ok(())
    }
}
