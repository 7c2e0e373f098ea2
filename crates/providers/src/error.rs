use interlingo_core::{CoreError, ProviderErrorKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("request to {provider} failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} rejected the request: {status} {body}")]
    Rejected {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider} does not support language pair {from}->{to}")]
    UnsupportedLanguagePair {
        provider: &'static str,
        from: String,
        to: String,
    },

    #[error("{provider} stream closed before producing a result")]
    StreamClosed { provider: &'static str },
}

impl ProviderError {
    pub fn kind(&self) -> ProviderErrorKind {
        match self {
            ProviderError::Transport { source, .. } => {
                if source.is_timeout() || source.is_connect() {
                    ProviderErrorKind::ProviderUnavailable
                } else {
                    ProviderErrorKind::InvalidInput(source.to_string())
                }
            }
            ProviderError::Rejected { status, body, .. } => match *status {
                401 | 403 => ProviderErrorKind::AuthFailure,
                429 => ProviderErrorKind::RateLimited,
                400..=499 => ProviderErrorKind::InvalidInput(body.clone()),
                _ => ProviderErrorKind::ProviderUnavailable,
            },
            ProviderError::UnsupportedLanguagePair { from, to, .. } => {
                ProviderErrorKind::LanguageUnsupported(format!("{from}->{to}"))
            }
            ProviderError::StreamClosed { .. } => ProviderErrorKind::Closed,
        }
    }
}

impl From<ProviderError> for CoreError {
    fn from(err: ProviderError) -> Self {
        CoreError::from(err.kind())
    }
}
