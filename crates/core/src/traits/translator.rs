//! Translator contract (§4.1): must be cancellable, since a newer final for
//! the same speaker supersedes whatever translation is in flight.

use crate::error::Result;
use crate::language::Language;
use crate::profile::Preferences;
use async_trait::async_trait;

#[async_trait]
pub trait Translator: Send + Sync + 'static {
    /// Translate `text` from `source` to `target`. Implementations must
    /// select a point to check `cancel` at least once per call so that a
    /// cancelled translation releases provider resources promptly (§5).
    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
        preferences: Preferences,
        cancel: tokio_util::sync::CancellationToken,
    ) -> Result<String>;

    fn supports_pair(&self, source: Language, target: Language) -> bool;

    fn provider_name(&self) -> &str;
}
