//! Room Coordinator and Profile Cache (§4.5, §4.7): the per-room authority
//! that turns participant events into Pipeline and Audio Router state.

pub mod coordinator;
pub mod event;
pub mod profile_cache;
pub mod provider_factory;
pub mod registry;

pub use coordinator::{buffer_policy_from_config, RoomCoordinator, TranslationStats};
pub use event::{CoordinatorEvent, CoordinatorNotification};
pub use profile_cache::{spawn_sweeper, NoSuchProfileLoader, ProfileCache, ProfileLoader};
pub use provider_factory::ProviderFactory;
pub use registry::{RegisteredParticipant, RoomRegistry};
