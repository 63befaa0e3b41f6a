use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;

use crate::errors::FieldlightResult;
use crate::llm::types::CallConfig;

/// Lazy, finite sequence of text chunks from a streaming completion.
///
/// A chunk may hold the whole text so far or only the new text; providers do
/// not say which.
pub type TextStream = Pin<Box<dyn Stream<Item = FieldlightResult<String>> + Send>>;

/// Unified text-generation boundary. New providers implement this trait and
/// are registered in config.toml.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Returns the provider's identifier (matches config.toml key).
    fn name(&self) -> &str;

    /// Checks the provider can serve `cfg` before the first turn.
    async fn probe(&self, _cfg: &CallConfig) -> FieldlightResult<()> {
        Ok(())
    }

    /// Single-shot completion; resolves once the full text is available.
    async fn prompt(&self, prompt: &str, cfg: &CallConfig) -> FieldlightResult<String>;

    /// Streaming completion.
    async fn prompt_streaming(&self, prompt: &str, cfg: &CallConfig) -> FieldlightResult<TextStream>;
}
