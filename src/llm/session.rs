use std::sync::Arc;

use crate::errors::{FieldlightError, FieldlightResult};
use crate::llm::provider::{LlmProvider, TextStream};
use crate::llm::registry::{ProviderRegistry, ROLE_CHAT, ROLE_PLANNING};
use crate::llm::types::CallConfig;

/// The two model calls a turn can make, opened once per widget.
#[derive(Clone)]
pub struct ModelSession {
    planner: Arc<dyn LlmProvider>,
    planner_cfg: CallConfig,
    chat: Arc<dyn LlmProvider>,
    chat_cfg: CallConfig,
}

impl ModelSession {
    /// Planning is always single-shot, whatever the role entry says.
    pub fn new(
        planner: Arc<dyn LlmProvider>,
        planner_cfg: CallConfig,
        chat: Arc<dyn LlmProvider>,
        chat_cfg: CallConfig,
    ) -> Self {
        Self {
            planner,
            planner_cfg: CallConfig {
                stream: false,
                ..planner_cfg
            },
            chat,
            chat_cfg,
        }
    }

    /// One provider for both roles.
    pub fn single(provider: Arc<dyn LlmProvider>, cfg: CallConfig) -> Self {
        Self::new(provider.clone(), cfg.clone(), provider, cfg)
    }

    /// Resolves both roles and probes their providers.
    ///
    /// Any failure is reported as [`FieldlightError::ModelUnavailable`].
    pub async fn open(registry: &ProviderRegistry) -> FieldlightResult<Self> {
        let unavailable = |e: FieldlightError| FieldlightError::ModelUnavailable(e.to_string());

        let (planner, planner_cfg) = registry.call_config_for_role(ROLE_PLANNING).map_err(unavailable)?;
        let (chat, chat_cfg) = registry.call_config_for_role(ROLE_CHAT).map_err(unavailable)?;
        planner.probe(&planner_cfg).await.map_err(unavailable)?;
        chat.probe(&chat_cfg).await.map_err(unavailable)?;

        tracing::info!(
            planner = %planner.name(),
            planner_model = %planner_cfg.model,
            chat = %chat.name(),
            chat_model = %chat_cfg.model,
            "model session opened"
        );
        Ok(Self::new(planner, planner_cfg, chat, chat_cfg))
    }

    pub async fn prompt(&self, prompt: &str) -> FieldlightResult<String> {
        self.planner.prompt(prompt, &self.planner_cfg).await
    }

    /// Streams the chat answer. A chat role configured with `stream = false`
    /// yields its whole answer as one chunk.
    pub async fn prompt_streaming(&self, prompt: &str) -> FieldlightResult<TextStream> {
        if self.chat_cfg.stream {
            return self.chat.prompt_streaming(prompt, &self.chat_cfg).await;
        }
        let text = self.chat.prompt(prompt, &self.chat_cfg).await?;
        Ok(Box::pin(futures_util::stream::once(async move { Ok(text) })))
    }
}
