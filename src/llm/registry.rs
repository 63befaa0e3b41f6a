use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{default_temperature, AppConfig, LlmConfig, ProviderEntry, RoleEntry};
use crate::errors::{FieldlightError, FieldlightResult};
use crate::llm::provider::LlmProvider;
use crate::llm::providers::openai_compatible::OpenAiCompatibleProvider;
use crate::llm::types::CallConfig;

pub const ROLE_PLANNING: &str = "planning";
pub const ROLE_CHAT: &str = "chat";

/// Providers keyed by their config.toml id, plus the role table that picks
/// one of them for each model call.
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn LlmProvider>>,
    active: String,
    llm: LlmConfig,
}

impl ProviderRegistry {
    pub fn new(active: String) -> Self {
        Self {
            providers: HashMap::new(),
            active,
            llm: LlmConfig::default(),
        }
    }

    /// One OpenAI-compatible provider per `[llm.providers.<id>]` entry.
    pub fn from_config(config: &AppConfig) -> Self {
        let mut registry = Self {
            providers: HashMap::new(),
            active: config.llm.active_provider.clone(),
            llm: config.llm.clone(),
        };
        for (id, entry) in &config.llm.providers {
            let provider = OpenAiCompatibleProvider::new(id.clone(), entry.api_base.clone(), api_key(id, entry));
            registry.register(Arc::new(provider));
        }
        registry
    }

    pub fn register(&mut self, provider: Arc<dyn LlmProvider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    pub fn active(&self) -> FieldlightResult<Arc<dyn LlmProvider>> {
        self.provider(&self.active)
    }

    pub fn list_names(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }

    /// Provider and call settings for `role`.
    ///
    /// A configured role wins; an unconfigured one streams from the active
    /// provider with that provider's own model and temperature.
    pub fn call_config_for_role(&self, role: &str) -> FieldlightResult<(Arc<dyn LlmProvider>, CallConfig)> {
        let (provider_id, cfg) = match self.role(role) {
            Some(entry) => (
                entry.provider.as_str(),
                CallConfig {
                    model: entry.model.clone(),
                    stream: entry.stream,
                    temperature: entry
                        .temperature
                        .unwrap_or_else(|| self.defaults(&entry.provider).1),
                },
            ),
            None => {
                let (model, temperature) = self.defaults(&self.active);
                (
                    self.active.as_str(),
                    CallConfig {
                        model,
                        stream: true,
                        temperature,
                    },
                )
            }
        };
        let provider = self.provider(provider_id).map_err(|e| {
            FieldlightError::Config(format!("role '{role}' cannot be served: {e}"))
        })?;
        tracing::debug!(
            role,
            provider = provider_id,
            model = %cfg.model,
            stream = cfg.stream,
            temperature = cfg.temperature,
            "role resolved"
        );
        Ok((provider, cfg))
    }

    fn role(&self, role: &str) -> Option<&RoleEntry> {
        match role {
            ROLE_PLANNING => self.llm.roles.planning.as_ref(),
            ROLE_CHAT => self.llm.roles.chat.as_ref(),
            other => {
                tracing::warn!(role = other, "unknown role, using the active provider");
                None
            }
        }
    }

    /// Model and temperature configured on the provider itself.
    fn defaults(&self, provider_id: &str) -> (String, f64) {
        self.llm
            .providers
            .get(provider_id)
            .map(|p| (p.model.clone(), p.temperature))
            .unwrap_or_else(|| (String::new(), default_temperature()))
    }

    fn provider(&self, id: &str) -> FieldlightResult<Arc<dyn LlmProvider>> {
        self.providers
            .get(id)
            .cloned()
            .ok_or_else(|| FieldlightError::Config(format!("provider '{id}' is not registered")))
    }
}

/// `FIELDLIGHT_<ID>_API_KEY` first, then the key stored in config.toml.
fn api_key(id: &str, entry: &ProviderEntry) -> String {
    std::env::var(format!("FIELDLIGHT_{}_API_KEY", id.to_uppercase()))
        .ok()
        .or_else(|| entry.api_key.clone())
        .unwrap_or_default()
}
