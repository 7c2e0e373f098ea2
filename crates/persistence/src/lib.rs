//! ScyllaDB persistence layer (§6.4, §10.5): durable user profiles, rooms,
//! and the voice avatar catalog. The Worker Host falls back to an in-memory
//! store if this layer is unreachable at startup.

pub mod client;
pub mod error;
pub mod rooms;
pub mod schema;
pub mod user_profiles;
pub mod voice_avatars;

pub use client::{ScyllaClient, ScyllaConfig};
pub use error::PersistenceError;
pub use rooms::{Room, RoomRepository};
pub use user_profiles::UserProfileRepository;
pub use voice_avatars::{seed_catalog, VoiceAvatarRepository};

/// Connect, ensure the schema exists, and build the repository bundle.
pub async fn init(config: ScyllaConfig) -> Result<PersistenceLayer, PersistenceError> {
    let client = ScyllaClient::connect(config).await?;
    client.ensure_schema().await?;

    Ok(PersistenceLayer {
        user_profiles: UserProfileRepository::new(client.clone()),
        rooms: RoomRepository::new(client.clone()),
        voice_avatars: VoiceAvatarRepository::new(client),
    })
}

/// The repository bundle the Worker Host holds for the lifetime of the process.
#[derive(Clone)]
pub struct PersistenceLayer {
    pub user_profiles: UserProfileRepository,
    pub rooms: RoomRepository,
    pub voice_avatars: VoiceAvatarRepository,
}
