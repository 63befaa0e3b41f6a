use serde::{Deserialize, Serialize};

/// Whether turns go through the intent planner first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentMode {
    /// Plan a tool call, fall back to a conversational answer.
    #[default]
    Agent,
    /// Always answer conversationally.
    Chat,
}

impl AgentMode {
    pub fn toggled(self) -> Self {
        match self {
            AgentMode::Agent => AgentMode::Chat,
            AgentMode::Chat => AgentMode::Agent,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgentMode::Agent => "Agent",
            AgentMode::Chat => "Chat",
        }
    }
}

/// Lifecycle of a single turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum TurnPhase {
    Received,
    Planning,
    Dispatched { action: String },
    FallbackAnswering,
    Settled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
    /// Rendered as an error (red) by the surface.
    #[serde(default)]
    pub flagged: bool,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            flagged: false,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            flagged: false,
        }
    }
}

/// Events the surface sends into the conversation loop.
#[derive(Debug, Clone)]
pub enum AgentEvent {
    UserInput(String),
    SetMode(AgentMode),
    ToggleMode,
    Stop,
}
