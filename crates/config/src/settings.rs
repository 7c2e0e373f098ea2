//! Layered runtime settings for the worker host (§10.3).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pipeline::{BufferConfig, CoordinatorConfig, PipelineConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    Development,
    Staging,
    Production,
}

impl fmt::Display for RuntimeEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeEnvironment::Development => write!(f, "development"),
            RuntimeEnvironment::Staging => write!(f, "staging"),
            RuntimeEnvironment::Production => write!(f, "production"),
        }
    }
}

impl Default for RuntimeEnvironment {
    fn default() -> Self {
        RuntimeEnvironment::Development
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_max_concurrent_pipelines")]
    pub max_concurrent_pipelines: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout_ms() -> u64 {
    30_000
}
fn default_max_concurrent_pipelines() -> usize {
    512
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_ms: default_request_timeout_ms(),
            max_concurrent_pipelines: default_max_concurrent_pipelines(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    #[serde(default = "default_scylla_nodes")]
    pub scylla_nodes: Vec<String>,
    #[serde(default = "default_keyspace")]
    pub keyspace: String,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_scylla_nodes() -> Vec<String> {
    vec!["127.0.0.1:9042".to_string()]
}
fn default_keyspace() -> String {
    "interlingo".to_string()
}
fn default_connect_timeout_ms() -> u64 {
    5_000
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            scylla_nodes: default_scylla_nodes(),
            keyspace: default_keyspace(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "default_stt_base_url")]
    pub stt_base_url: String,
    #[serde(default = "default_translator_base_url")]
    pub translator_base_url: String,
    #[serde(default = "default_tts_base_url")]
    pub tts_base_url: String,
    #[serde(default = "default_provider_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_stt_base_url() -> String {
    "http://127.0.0.1:8090".to_string()
}
fn default_translator_base_url() -> String {
    "http://127.0.0.1:8091".to_string()
}
fn default_tts_base_url() -> String {
    "http://127.0.0.1:8092".to_string()
}
fn default_provider_timeout_ms() -> u64 {
    10_000
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            stt_base_url: default_stt_base_url(),
            translator_base_url: default_translator_base_url(),
            tts_base_url: default_tts_base_url(),
            timeout_ms: default_provider_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_format")]
    pub log_format: String,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

fn default_log_format() -> String {
    "json".to_string()
}
fn default_log_filter() -> String {
    "info".to_string()
}
fn default_metrics_port() -> u16 {
    9090
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: default_log_format(),
            log_filter: default_log_filter(),
            otlp_endpoint: None,
            metrics_port: default_metrics_port(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub buffer: BufferConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub coordinator: CoordinatorConfig,
    #[serde(default)]
    pub persistence: PersistenceConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    pub fn load(environment: RuntimeEnvironment) -> Result<Self, ConfigError> {
        let env_label = environment.to_string();
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env_label}")).required(false))
            .add_source(
                config::Environment::with_prefix("INTERLINGO")
                    .separator("__")
                    .try_parsing(true),
            );

        let raw = builder.build()?;
        let mut settings: Settings = raw.try_deserialize()?;
        settings.environment = environment;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_buffer()?;
        self.validate_pipeline()?;
        self.validate_coordinator()?;
        self.validate_persistence()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "must be nonzero".to_string(),
            });
        }
        if self.server.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.request_timeout_ms".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.server.max_concurrent_pipelines == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.max_concurrent_pipelines".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    fn validate_buffer(&self) -> Result<(), ConfigError> {
        const MIN_DELAY_MS: u64 = 200;
        const MAX_DELAY_MS: u64 = 2_000;
        if !(MIN_DELAY_MS..=MAX_DELAY_MS).contains(&self.buffer.max_delay_ms) {
            return Err(ConfigError::InvalidValue {
                field: "buffer.max_delay_ms".to_string(),
                message: format!(
                    "must be between {MIN_DELAY_MS} and {MAX_DELAY_MS}, got {}",
                    self.buffer.max_delay_ms
                ),
            });
        }
        if self.buffer.interim_trigger_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "buffer.interim_trigger_ms".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.buffer.interim_trigger_ms >= self.buffer.max_delay_ms {
            return Err(ConfigError::InvalidValue {
                field: "buffer.interim_trigger_ms".to_string(),
                message: "must be smaller than buffer.max_delay_ms".to_string(),
            });
        }
        Ok(())
    }

    fn validate_pipeline(&self) -> Result<(), ConfigError> {
        if self.pipeline.max_retries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pipeline.max_retries".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.pipeline.max_retries > 10 {
            return Err(ConfigError::InvalidValue {
                field: "pipeline.max_retries".to_string(),
                message: "unreasonably high, check for a misconfiguration".to_string(),
            });
        }
        if self.pipeline.stt_out_capacity == 0 || self.pipeline.translator_out_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pipeline.stt_out_capacity/translator_out_capacity".to_string(),
                message: "queue capacities must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    fn validate_coordinator(&self) -> Result<(), ConfigError> {
        if self.coordinator.reconciliation_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "coordinator.reconciliation_interval_ms".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.coordinator.profile_cache_ttl_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "coordinator.profile_cache_ttl_ms".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    fn validate_persistence(&self) -> Result<(), ConfigError> {
        if self.persistence.scylla_nodes.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "persistence.scylla_nodes".to_string(),
                message: "at least one contact node is required".to_string(),
            });
        }
        if self.persistence.keyspace.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "persistence.keyspace".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_pass_validation() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn buffer_delay_below_floor_is_rejected() {
        let mut settings = Settings::default();
        settings.buffer.max_delay_ms = 100;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "buffer.max_delay_ms"
        ));
    }

    #[test]
    fn buffer_delay_above_ceiling_is_rejected() {
        let mut settings = Settings::default();
        settings.buffer.max_delay_ms = 5_000;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn interim_trigger_must_be_shorter_than_max_delay() {
        let mut settings = Settings::default();
        settings.buffer.interim_trigger_ms = settings.buffer.max_delay_ms;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn zero_port_is_rejected() {
        let mut settings = Settings::default();
        settings.server.port = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn empty_keyspace_is_rejected() {
        let mut settings = Settings::default();
        settings.persistence.keyspace = String::new();
        assert!(settings.validate().is_err());
    }
}
