use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::agent_engine::state::{AgentMode, ConversationTurn, TurnPhase};

/// What the surface needs to keep its transcript view in sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TranscriptEvent {
    TurnAppended { index: usize, turn: ConversationTurn },
    /// Text of an in-flight assistant turn changed (streaming).
    TurnUpdated { index: usize, text: String },
    TurnSettled { index: usize, turn: ConversationTurn },
    PhaseChanged { phase: TurnPhase },
    ModeChanged { mode: AgentMode },
}

#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<TranscriptEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(256);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TranscriptEvent> {
        self.tx.subscribe()
    }

    /// Publishes to current subscribers; having none is not an error.
    pub fn send(&self, event: TranscriptEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("transcript event dropped, no subscribers");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
