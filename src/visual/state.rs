use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashMode {
    #[default]
    None,
    Once,
    Continuous,
}

/// Visual state of one field label.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VisualState {
    pub highlighted: bool,
    pub strong: bool,
    pub flash: FlashMode,
    /// CSS color override; last write wins.
    pub color: Option<String>,
}

impl VisualState {
    pub fn is_clear(&self) -> bool {
        *self == VisualState::default()
    }
}
