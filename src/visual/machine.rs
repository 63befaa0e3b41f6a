use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::errors::ToolError;
use crate::visual::locator::{DisplayLocator, LabelNode};
use crate::visual::paint::LabelPaint;
use crate::visual::state::{FlashMode, VisualState};

type StateMap = Arc<Mutex<HashMap<String, VisualState>>>;

/// Per-field visual state, realized on label nodes found through a [`DisplayLocator`].
///
/// Every transition locates the node before touching state, so a missing node
/// leaves the map unchanged. Nodes are repainted from the whole state after each
/// transition, which keeps repeated calls idempotent.
pub struct VisualStateMachine {
    locator: Arc<dyn DisplayLocator>,
    states: StateMap,
}

impl VisualStateMachine {
    pub fn new(locator: Arc<dyn DisplayLocator>) -> Self {
        Self {
            locator,
            states: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn locate(&self, field: &str) -> Result<Arc<dyn LabelNode>, ToolError> {
        self.locator
            .locate(field)
            .ok_or_else(|| ToolError::ElementNotFound(field.to_string()))
    }

    /// Current state of a field, if it was ever touched.
    pub async fn state(&self, field: &str) -> Option<VisualState> {
        self.states.lock().await.get(field).cloned()
    }

    pub async fn apply(
        &self,
        field: &str,
        color: Option<&str>,
        strong: bool,
    ) -> Result<VisualState, ToolError> {
        let node = self.locate(field)?;
        let mut states = self.states.lock().await;
        let state = states.entry(field.to_string()).or_default();
        state.highlighted = true;
        // Strong sticks until the field is cleared.
        state.strong |= strong;
        if let Some(color) = color {
            state.color = Some(color.to_string());
        }
        node.paint(&LabelPaint::from_state(state));
        tracing::debug!(field, ?state, "highlight applied");
        Ok(state.clone())
    }

    pub async fn clear(&self, field: &str) -> Result<VisualState, ToolError> {
        let node = self.locate(field)?;
        let mut states = self.states.lock().await;
        let state = states.entry(field.to_string()).or_default();
        *state = VisualState::default();
        node.paint(&LabelPaint::from_state(state));
        tracing::debug!(field, "highlight cleared");
        Ok(state.clone())
    }

    /// Flashes a highlighted field once, reverting after `ms`.
    ///
    /// The revert is a detached timer that resets `flash` unconditionally when it
    /// fires, so a `start_continuous` issued in between is undone by it.
    pub async fn flash_once(&self, field: &str, ms: u64) -> Result<VisualState, ToolError> {
        let node = self.locate(field)?;
        let snapshot = {
            let mut states = self.states.lock().await;
            let state = states
                .get_mut(field)
                .filter(|s| s.highlighted)
                .ok_or_else(|| ToolError::NotHighlighted(field.to_string()))?;
            state.flash = FlashMode::Once;
            node.paint(&LabelPaint::from_state(state));
            state.clone()
        };

        let states = self.states.clone();
        let field_name = field.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            let mut states = states.lock().await;
            if let Some(state) = states.get_mut(&field_name) {
                state.flash = FlashMode::None;
                node.paint(&LabelPaint::from_state(state));
                tracing::debug!(field = %field_name, "single flash expired");
            }
        });

        tracing::debug!(field, ms, "single flash scheduled");
        Ok(snapshot)
    }

    pub async fn start_continuous(&self, field: &str) -> Result<VisualState, ToolError> {
        let node = self.locate(field)?;
        let mut states = self.states.lock().await;
        let state = states
            .get_mut(field)
            .filter(|s| s.highlighted)
            .ok_or_else(|| ToolError::NotHighlighted(field.to_string()))?;
        state.flash = FlashMode::Continuous;
        node.paint(&LabelPaint::from_state(state));
        tracing::debug!(field, "continuous flash started");
        Ok(state.clone())
    }

    pub async fn stop_continuous(&self, field: &str) -> Result<VisualState, ToolError> {
        let node = self.locate(field)?;
        let mut states = self.states.lock().await;
        let Some(state) = states.get_mut(field) else {
            return Ok(VisualState::default());
        };
        if state.flash == FlashMode::Continuous {
            state.flash = FlashMode::None;
            node.paint(&LabelPaint::from_state(state));
            tracing::debug!(field, "continuous flash stopped");
        }
        Ok(state.clone())
    }

    /// Brings the field's label into view. Missing nodes are ignored.
    pub fn scroll_to(&self, field: &str) {
        if let Some(node) = self.locator.locate(field) {
            node.scroll_into_view();
        }
    }

    /// Drops the state of one field, e.g. after its node was removed.
    pub async fn forget(&self, field: &str) -> bool {
        self.states.lock().await.remove(field).is_some()
    }

    /// Drops state for every field whose node can no longer be located.
    pub async fn prune(&self) -> usize {
        let mut states = self.states.lock().await;
        let before = states.len();
        states.retain(|field, _| self.locator.locate(field).is_some());
        let dropped = before - states.len();
        if dropped > 0 {
            tracing::debug!(dropped, "visual state pruned");
        }
        dropped
    }

    /// Ends the session: blanks every still-visible node and drops all state.
    pub async fn reset(&self) {
        let mut states = self.states.lock().await;
        for field in states.keys() {
            if let Some(node) = self.locator.locate(field) {
                node.paint(&LabelPaint::default());
            }
        }
        states.clear();
    }
}
