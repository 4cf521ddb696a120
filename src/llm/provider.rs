use std::time::Duration;

use async_trait::async_trait;

use crate::core::errors::ApiError;
use crate::tools::search::Source;

/// One link in the answer-generation chain.
///
/// Providers are attempted in order; the first non-empty response wins.
/// A failure or empty response never propagates — the generator logs it
/// and moves to the next provider.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Per-attempt budget enforced by the generator.
    fn timeout(&self) -> Duration;

    async fn attempt(
        &self,
        query: &str,
        context: &str,
        sources: &[Source],
    ) -> Result<String, ApiError>;
}
