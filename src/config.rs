use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::agent_engine::state::AgentMode;
use crate::errors::{FieldlightError, FieldlightResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub llm: LlmConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub record: RecordConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LlmConfig {
    pub active_provider: String,
    pub providers: HashMap<String, ProviderEntry>,
    /// Role-to-model mapping. If a role is absent, falls back to active_provider defaults.
    #[serde(default)]
    pub roles: RolesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEntry {
    pub display_name: String,
    pub api_base: String,
    /// Default model for this provider (used as fallback when no role config exists).
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Optional API key stored in config.toml (falls back to env var FIELDLIGHT_<ID>_API_KEY).
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Maps the two model calls of a turn to provider+model combinations.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RolesConfig {
    /// Single-shot intent planner. Should return the whole JSON command at once.
    pub planning: Option<RoleEntry>,
    /// Conversational fallback answer, streamed to the transcript.
    pub chat: Option<RoleEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleEntry {
    /// Must match a key under [llm.providers.*].
    pub provider: String,
    /// Model name sent to the API.
    pub model: String,
    #[serde(default = "default_true")]
    pub stream: bool,
    /// Overrides the provider-level temperature for this role.
    pub temperature: Option<f64>,
}

pub fn default_temperature() -> f64 {
    0.1
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Product name used in the planner's role declaration.
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default)]
    pub start_mode: AgentMode,
    /// Duration of a single flash when the planner gives no usable `ms`.
    #[serde(default = "default_flash_ms")]
    pub default_flash_ms: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            start_mode: AgentMode::default(),
            default_flash_ms: default_flash_ms(),
        }
    }
}

fn default_app_name() -> String {
    "the record page".to_string()
}

pub fn default_flash_ms() -> u64 {
    1800
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RecordConfig {
    /// JSON snapshot of the displayed record. Absent means "no record loaded".
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HistoryConfig {
    /// Append every settled turn to a JSONL session log.
    #[serde(default)]
    pub persist: bool,
}

fn resolve_config_path() -> FieldlightResult<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            let candidate = parent.join("config.toml");
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "config found next to executable");
                return Ok(candidate);
            }
        }
    }

    let cwd = std::env::current_dir()?;
    let candidate = cwd.join("config.toml");
    if candidate.exists() {
        tracing::debug!(path = %candidate.display(), "config found in working directory");
        return Ok(candidate);
    }

    Err(FieldlightError::Config(
        "config.toml not found next to executable or in working directory".into(),
    ))
}

pub fn load_config() -> FieldlightResult<AppConfig> {
    let path = resolve_config_path()?;
    load_config_from(&path)
}

pub fn load_config_from(path: &std::path::Path) -> FieldlightResult<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    tracing::info!(path = %path.display(), provider = %config.llm.active_provider, "config loaded");
    Ok(config)
}

pub fn save_config(config: &AppConfig) -> FieldlightResult<()> {
    let path = resolve_config_path()?;
    save_config_to(config, &path)
}

pub fn save_config_to(config: &AppConfig, path: &std::path::Path) -> FieldlightResult<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}
