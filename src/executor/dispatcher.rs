use std::sync::Arc;

use crate::errors::ToolError;
use crate::executor::command::{ToolAction, ToolCommand, ToolParams, ToolResult};
use crate::record::index::FieldIndex;
use crate::visual::machine::VisualStateMachine;

/// Validates tool commands against the field index and runs them on the visual state machine.
///
/// Never returns an error: every failure comes back as [`ToolResult::Failed`].
pub struct ToolDispatcher {
    index: FieldIndex,
    visuals: Arc<VisualStateMachine>,
    default_flash_ms: u64,
}

impl ToolDispatcher {
    pub fn new(index: FieldIndex, visuals: Arc<VisualStateMachine>, default_flash_ms: u64) -> Self {
        Self {
            index,
            visuals,
            default_flash_ms,
        }
    }

    pub fn index(&self) -> &FieldIndex {
        &self.index
    }

    pub fn visuals(&self) -> &Arc<VisualStateMachine> {
        &self.visuals
    }

    pub async fn dispatch(&self, command: &ToolCommand) -> ToolResult {
        let result = self.run(command.action, &command.params).await;
        match &result {
            Ok(field) => tracing::info!(
                action = %command.action,
                target = %command.params.target,
                field = %field,
                "tool executed"
            ),
            Err(e) => tracing::warn!(
                action = %command.action,
                target = %command.params.target,
                error = %e,
                "tool failed"
            ),
        }
        result.into()
    }

    async fn run(&self, action: ToolAction, params: &ToolParams) -> Result<String, ToolError> {
        let field = self
            .index
            .resolve(&params.target)
            .ok_or_else(|| ToolError::FieldNotFound(params.target.clone()))?;
        let color = params.color.as_deref();
        let vsm = &self.visuals;

        match action {
            ToolAction::HighlightField => {
                vsm.apply(&field, color, params.strong).await?;
                vsm.scroll_to(&field);
            }
            ToolAction::UnhighlightField => {
                vsm.clear(&field).await?;
            }
            ToolAction::FlashField => {
                vsm.apply(&field, color, params.strong).await?;
                let ms = params.ms.unwrap_or(self.default_flash_ms);
                vsm.flash_once(&field, ms).await?;
                vsm.scroll_to(&field);
            }
            ToolAction::StartFlashField => {
                vsm.apply(&field, color, params.strong).await?;
                vsm.start_continuous(&field).await?;
                vsm.scroll_to(&field);
            }
            ToolAction::StopFlashField => {
                vsm.stop_continuous(&field).await?;
            }
        }
        Ok(field)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::record::schema::{FieldDescriptor, FieldValue, RecordSnapshot};
    use crate::visual::locator::LabelBoard;
    use crate::visual::paint::CLASS_FLASH_INFINITE;
    use crate::visual::state::FlashMode;

    fn setup() -> (ToolDispatcher, Arc<LabelBoard>) {
        let snapshot = RecordSnapshot {
            module: Some("Accounts".into()),
            fields: vec![
                FieldDescriptor::new("status", "Status", FieldValue::default()),
                FieldDescriptor::new("account_type", "Account Type", FieldValue::default()),
                FieldDescriptor::new("hidden_field", "Hidden", FieldValue::default()),
            ],
            layout: vec![],
        };
        let board = Arc::new(LabelBoard::from_snapshot(&snapshot));
        board.remove_cell("hidden_field");
        let vsm = Arc::new(VisualStateMachine::new(board.clone()));
        (
            ToolDispatcher::new(FieldIndex::build(&snapshot.fields), vsm, 1800),
            board,
        )
    }

    fn cmd(action: ToolAction, target: &str) -> ToolCommand {
        ToolCommand::new(action, ToolParams::target(target))
    }

    #[tokio::test]
    async fn highlight_by_label_resolves_canonical_field() {
        let (dispatcher, board) = setup();
        let mut command = cmd(ToolAction::HighlightField, "Status");
        command.params.color = Some("yellow".into());
        let result = dispatcher.dispatch(&command).await;
        assert_eq!(result, ToolResult::Done { field: "status".into() });
        let node = board.find("status").unwrap();
        assert_eq!(node.current_paint().outline_color.as_deref(), Some("yellow"));
        assert_eq!(node.scroll_count(), 1);
    }

    #[tokio::test]
    async fn unknown_target_is_field_not_found() {
        let (dispatcher, _) = setup();
        for action in ToolAction::ALL {
            let result = dispatcher.dispatch(&cmd(action, "bogus")).await;
            assert_eq!(
                result,
                ToolResult::Failed {
                    error: ToolError::FieldNotFound("bogus".into())
                }
            );
        }
    }

    #[tokio::test]
    async fn resolved_field_without_node_is_element_not_found() {
        let (dispatcher, _) = setup();
        let result = dispatcher.dispatch(&cmd(ToolAction::HighlightField, "Hidden")).await;
        assert_eq!(
            result.error(),
            Some(&ToolError::ElementNotFound("hidden_field".into()))
        );
        assert!(dispatcher.visuals().state("hidden_field").await.is_none());
    }

    #[tokio::test]
    async fn start_and_stop_flashing() {
        let (dispatcher, board) = setup();
        assert!(dispatcher
            .dispatch(&cmd(ToolAction::StartFlashField, "account type"))
            .await
            .is_ok());
        let state = dispatcher.visuals().state("account_type").await.unwrap();
        assert!(state.highlighted);
        assert_eq!(state.flash, FlashMode::Continuous);
        assert!(board.find("account_type").unwrap().current_paint().has(CLASS_FLASH_INFINITE));

        assert!(dispatcher
            .dispatch(&cmd(ToolAction::StopFlashField, "ACCOUNT_TYPE"))
            .await
            .is_ok());
        let state = dispatcher.visuals().state("account_type").await.unwrap();
        assert_eq!(state.flash, FlashMode::None);
        assert!(state.highlighted);
    }

    #[tokio::test]
    async fn unhighlight_untouched_field_succeeds() {
        let (dispatcher, _) = setup();
        let result = dispatcher.dispatch(&cmd(ToolAction::UnhighlightField, "status")).await;
        assert_eq!(result.field(), Some("status"));
    }

    #[tokio::test(start_paused = true)]
    async fn flash_field_uses_default_duration() {
        let (dispatcher, _) = setup();
        assert!(dispatcher.dispatch(&cmd(ToolAction::FlashField, "status")).await.is_ok());
        let state = dispatcher.visuals().state("status").await.unwrap();
        assert!(state.highlighted);
        assert_eq!(state.flash, FlashMode::Once);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(dispatcher.visuals().state("status").await.unwrap().flash, FlashMode::Once);
        tokio::time::sleep(Duration::from_millis(900)).await;
        assert_eq!(dispatcher.visuals().state("status").await.unwrap().flash, FlashMode::None);
    }
}
