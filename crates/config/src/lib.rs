//! Layered configuration for the interlingo worker host (§10.3).
//!
//! Settings load from an optional `config/default.{toml,yaml}`, an
//! optional per-environment overlay (`config/production.toml`, ...), and
//! finally `INTERLINGO__`-prefixed environment variables, in that order
//! of increasing precedence.

pub mod error;
pub mod pipeline;
pub mod settings;

pub use error::ConfigError;
pub use pipeline::{BufferConfig, CoordinatorConfig, PipelineConfig};
pub use settings::{
    ObservabilityConfig, PersistenceConfig, ProvidersConfig, RuntimeEnvironment, ServerConfig, Settings,
};
