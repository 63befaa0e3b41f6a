use serde::{Deserialize, Serialize};

use crate::errors::ToolError;

/// The fixed catalog of visual side-effects the planner may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolAction {
    HighlightField,
    UnhighlightField,
    FlashField,
    StartFlashField,
    StopFlashField,
}

impl ToolAction {
    pub const ALL: [ToolAction; 5] = [
        ToolAction::HighlightField,
        ToolAction::UnhighlightField,
        ToolAction::FlashField,
        ToolAction::StartFlashField,
        ToolAction::StopFlashField,
    ];

    /// Wire name, as it appears in planner output.
    pub fn name(self) -> &'static str {
        match self {
            ToolAction::HighlightField => "highlightField",
            ToolAction::UnhighlightField => "unhighlightField",
            ToolAction::FlashField => "flashField",
            ToolAction::StartFlashField => "startFlashField",
            ToolAction::StopFlashField => "stopFlashField",
        }
    }

    /// Exact (case-sensitive) lookup by wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|a| a.name()).collect()
    }
}

impl std::fmt::Display for ToolAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Arguments of a tool call. `target` is a label or field name, not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ToolParams {
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub strong: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ms: Option<u64>,
}

impl ToolParams {
    pub fn target(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    pub action: ToolAction,
    pub params: ToolParams,
}

impl ToolCommand {
    pub fn new(action: ToolAction, params: ToolParams) -> Self {
        Self { action, params }
    }
}

/// Outcome of one dispatched command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolResult {
    Done { field: String },
    Failed { error: ToolError },
}

impl ToolResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, ToolResult::Done { .. })
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            ToolResult::Done { field } => Some(field),
            ToolResult::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ToolError> {
        match self {
            ToolResult::Done { .. } => None,
            ToolResult::Failed { error } => Some(error),
        }
    }
}

impl From<Result<String, ToolError>> for ToolResult {
    fn from(result: Result<String, ToolError>) -> Self {
        match result {
            Ok(field) => ToolResult::Done { field },
            Err(error) => ToolResult::Failed { error },
        }
    }
}
