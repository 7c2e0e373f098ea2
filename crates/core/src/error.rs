//! Closed error taxonomy shared by every provider adapter and the pipeline
//! state machine.
//!
//! Five kinds, matching how failures are actually handled downstream: two
//! retry inside the adapter, two fail the pipeline outright, one is a metric
//! rather than a user-visible error.

use thiserror::Error;

/// Errors produced anywhere in the translation path.
#[derive(Debug, Error, Clone)]
pub enum CoreError {
    /// Network blip, rate limit, or 5xx from a provider. Retried inside the
    /// adapter up to its budget; surfaced here only once that budget is
    /// exhausted.
    #[error("provider temporarily unavailable: {0}")]
    TransientProvider(String),

    /// Auth failure or unsupported language/voice. Not retried; the
    /// pipeline transitions to `failed` and is not recreated with the same
    /// parameters.
    #[error("provider permanently failed: {0}")]
    PermanentProvider(String),

    /// Lost subscription or publish failure at the router/transport
    /// boundary. Retried once by the router before failing the pipeline.
    #[error("transport error: {0}")]
    TransportError(String),

    /// A segment missed its deadline. Never surfaced as a hard error;
    /// callers record it as a dropped-segment metric.
    #[error("latency budget exceeded")]
    LatencyExceeded,

    /// An invariant the system depends on (segment ordering, single
    /// pipeline per pair, ...) was violated. The owning pipeline is killed
    /// rather than allowed to limp on with inconsistent state.
    #[error("internal invariant violated: {0}")]
    InternalInvariantViolation(String),
}

impl CoreError {
    pub fn transient(msg: impl Into<String>) -> Self {
        Self::TransientProvider(msg.into())
    }

    pub fn permanent(msg: impl Into<String>) -> Self {
        Self::PermanentProvider(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::TransportError(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InternalInvariantViolation(msg.into())
    }

    /// Transient failures are worth retrying; everything else is not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientProvider(_))
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

/// Fine-grained provider failure kinds named in §4.1. They all fold into
/// [`CoreError`] at the point where the pipeline decides how to react, but
/// adapters return these so the caller can distinguish auth failure from
/// rate limiting when deciding whether to retry at all.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderErrorKind {
    #[error("provider unavailable")]
    ProviderUnavailable,
    #[error("authentication failed")]
    AuthFailure,
    #[error("language unsupported: {0}")]
    LanguageUnsupported(String),
    #[error("stream closed")]
    Closed,
    #[error("rate limited")]
    RateLimited,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("voice unavailable: {0}")]
    VoiceUnavailable(String),
}

impl ProviderErrorKind {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ProviderUnavailable | Self::RateLimited)
    }
}

impl From<ProviderErrorKind> for CoreError {
    fn from(kind: ProviderErrorKind) -> Self {
        match &kind {
            ProviderErrorKind::ProviderUnavailable | ProviderErrorKind::RateLimited => {
                CoreError::TransientProvider(kind.to_string())
            },
            _ => CoreError::PermanentProvider(kind.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_kinds_are_retryable() {
        assert!(ProviderErrorKind::ProviderUnavailable.is_transient());
        assert!(ProviderErrorKind::RateLimited.is_transient());
        assert!(!ProviderErrorKind::AuthFailure.is_transient());
    }

    #[test]
    fn provider_error_folds_into_core_error() {
        let err: CoreError = ProviderErrorKind::AuthFailure.into();
        assert!(!err.is_retryable());
        let err: CoreError = ProviderErrorKind::RateLimited.into();
        assert!(err.is_retryable());
    }
}
