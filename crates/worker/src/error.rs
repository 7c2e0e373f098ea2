//! Worker Host errors (§7): the process-edge boundary. `main` converts the
//! fatal ones into the exit codes in §6.5; the HTTP surface converts the
//! rest into status codes.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("configuration error: {0}")]
    Config(#[from] interlingo_config::ConfigError),

    #[error("persistence error: {0}")]
    Persistence(#[from] interlingo_persistence::PersistenceError),

    #[error("provider setup failed: {0}")]
    ProviderSetup(#[from] interlingo_core::CoreError),

    #[error("no room with id '{0}' is bound to this worker")]
    UnknownRoom(String),

    #[error("transport authentication failed: {0}")]
    TransportAuth(String),

    #[error("provider outage exceeded the configured grace window: {0}")]
    ProviderOutage(String),
}

impl From<&WorkerError> for axum::http::StatusCode {
    fn from(err: &WorkerError) -> Self {
        match err {
            WorkerError::UnknownRoom(_) => axum::http::StatusCode::NOT_FOUND,
            WorkerError::TransportAuth(_) => axum::http::StatusCode::UNAUTHORIZED,
            WorkerError::Config(_) | WorkerError::Persistence(_) | WorkerError::ProviderSetup(_) => {
                axum::http::StatusCode::INTERNAL_SERVER_ERROR
            }
            WorkerError::ProviderOutage(_) => axum::http::StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Exit codes for the Worker Host process (§6.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Clean = 0,
    FatalConfig = 1,
    TransportAuth = 2,
    ProviderOutage = 3,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_room_maps_to_not_found() {
        let err = WorkerError::UnknownRoom("room-9".to_string());
        assert_eq!(axum::http::StatusCode::from(&err), axum::http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn provider_outage_maps_to_service_unavailable() {
        let err = WorkerError::ProviderOutage("tts down".to_string());
        assert_eq!(axum::http::StatusCode::from(&err), axum::http::StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn exit_codes_match_the_documented_values() {
        assert_eq!(ExitCode::Clean as i32, 0);
        assert_eq!(ExitCode::FatalConfig as i32, 1);
        assert_eq!(ExitCode::TransportAuth as i32, 2);
        assert_eq!(ExitCode::ProviderOutage as i32, 3);
    }
}
