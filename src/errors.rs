use thiserror::Error;

#[derive(Debug, Error)]
pub enum FieldlightError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("LLM provider error: {0}")]
    LlmProvider(String),

    #[error("SSE parsing error: {0}")]
    SseParsing(String),

    #[error("Language model not available: {0}")]
    ModelUnavailable(String),

    #[error("Streaming error: {0}")]
    Streaming(String),

    #[error("No record loaded")]
    NoRecordLoaded,

    #[error("Error reading record context: {0}")]
    ContextRead(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TOML deserialize error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl serde::Serialize for FieldlightError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

pub type FieldlightResult<T> = Result<T, FieldlightError>;

/// Failures of a single tool call. Returned inside `ToolResult::Failed`, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("Field not found for '{0}'")]
    FieldNotFound(String),

    #[error("Label node not found for '{0}'")]
    ElementNotFound(String),

    #[error("Field '{0}' must be highlighted first")]
    NotHighlighted(String),
}
