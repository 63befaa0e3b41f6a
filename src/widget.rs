use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::agent_engine::engine::{AgentEngine, ModelState};
use crate::agent_engine::event_bus::{EventBus, TranscriptEvent};
use crate::agent_engine::history::{SessionHistory, Transcript};
use crate::agent_engine::planner::IntentPlanner;
use crate::agent_engine::state::{AgentEvent, AgentMode};
use crate::config::{default_flash_ms, AppConfig};
use crate::errors::{FieldlightError, FieldlightResult};
use crate::executor::dispatcher::ToolDispatcher;
use crate::llm::session::ModelSession;
use crate::record::context::RecordContext;
use crate::visual::locator::DisplayLocator;
use crate::visual::machine::VisualStateMachine;

#[derive(Debug, Clone)]
pub struct WidgetOptions {
    pub app_name: String,
    pub start_mode: AgentMode,
    pub default_flash_ms: u64,
    pub persist_history: bool,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            app_name: "the record page".to_string(),
            start_mode: AgentMode::Agent,
            default_flash_ms: default_flash_ms(),
            persist_history: false,
        }
    }
}

impl From<&AppConfig> for WidgetOptions {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            app_name: cfg.agent.app_name.clone(),
            start_mode: cfg.agent.start_mode,
            default_flash_ms: cfg.agent.default_flash_ms,
            persist_history: cfg.history.persist,
        }
    }
}

/// One assistant attached to one displayed record.
///
/// Created and destroyed explicitly by its owner; several can coexist.
pub struct AssistantWidget {
    tx: mpsc::Sender<AgentEvent>,
    bus: EventBus,
    visuals: Arc<VisualStateMachine>,
    task: JoinHandle<Transcript>,
}

impl AssistantWidget {
    /// Spawns the conversation loop. Must be called inside a Tokio runtime.
    ///
    /// The returned receiver is subscribed before the loop starts, so it also
    /// sees a model-unavailable report issued at startup.
    pub fn create(
        session: FieldlightResult<ModelSession>,
        context: RecordContext,
        locator: Arc<dyn DisplayLocator>,
        options: WidgetOptions,
    ) -> (Self, broadcast::Receiver<TranscriptEvent>) {
        let visuals = Arc::new(VisualStateMachine::new(locator));
        let dispatcher = ToolDispatcher::new(
            context.index.clone(),
            visuals.clone(),
            options.default_flash_ms,
        );

        let model = match session {
            Ok(session) => ModelState::Ready {
                planner: IntentPlanner::new(session.clone(), options.app_name.clone()),
                session,
            },
            Err(e) => ModelState::Unavailable(match e {
                FieldlightError::ModelUnavailable(reason) => reason,
                other => other.to_string(),
            }),
        };

        let bus = EventBus::new();
        let events = bus.subscribe();
        let (tx, rx) = mpsc::channel::<AgentEvent>(32);

        let mut engine = AgentEngine::new(options.start_mode, rx, bus.clone(), model, context, dispatcher);
        if options.persist_history {
            let history = SessionHistory::new();
            tracing::info!(session = %history.session_id, "persisting transcript");
            engine = engine.with_history(history);
        }

        tracing::info!(mode = options.start_mode.label(), "spawning assistant widget");
        let task = tokio::spawn(engine.run_loop());

        (
            Self {
                tx,
                bus,
                visuals,
                task,
            },
            events,
        )
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TranscriptEvent> {
        self.bus.subscribe()
    }

    pub fn visuals(&self) -> &Arc<VisualStateMachine> {
        &self.visuals
    }

    pub async fn submit(&self, text: impl Into<String>) -> FieldlightResult<()> {
        self.send(AgentEvent::UserInput(text.into())).await
    }

    pub async fn set_mode(&self, mode: AgentMode) -> FieldlightResult<()> {
        self.send(AgentEvent::SetMode(mode)).await
    }

    pub async fn toggle_mode(&self) -> FieldlightResult<()> {
        self.send(AgentEvent::ToggleMode).await
    }

    async fn send(&self, event: AgentEvent) -> FieldlightResult<()> {
        self.tx
            .send(event)
            .await
            .map_err(|_| FieldlightError::Agent("assistant is no longer running".into()))
    }

    /// Stops the loop after any queued turns, clears all visual state and
    /// returns the transcript.
    pub async fn destroy(self) -> FieldlightResult<Transcript> {
        // The loop may already have exited (model unavailable); that is fine.
        let _ = self.tx.send(AgentEvent::Stop).await;
        let transcript = self
            .task
            .await
            .map_err(|e| FieldlightError::Agent(format!("assistant task failed: {e}")))?;
        self.visuals.reset().await;
        tracing::info!(turns = transcript.len(), "assistant widget destroyed");
        Ok(transcript)
    }
}
