use futures_util::StreamExt;
use tokio::sync::mpsc;

use crate::agent_engine::event_bus::{EventBus, TranscriptEvent};
use crate::agent_engine::history::{HistoryEntry, SessionHistory, Transcript};
use crate::agent_engine::planner::{recover_command, IntentPlanner, PlanOutcome};
use crate::agent_engine::state::{AgentEvent, AgentMode, ConversationTurn, TurnPhase};
use crate::agent_engine::stream::StreamAssembler;
use crate::errors::FieldlightResult;
use crate::executor::command::{ToolAction, ToolResult};
use crate::executor::dispatcher::ToolDispatcher;
use crate::llm::session::ModelSession;
use crate::record::context::RecordContext;

pub const THINKING_TEXT: &str = "Thinking…";

/// Prompt for the conversational fallback answer.
pub fn build_answer_prompt(context: &str, question: &str) -> String {
    format!(
        "{context}\n\n\
         Question:\n{question}\n\n\
         - Do not use markdown.\n\
         - Be friendly like a secretary.\n\
         - Answer in a single complete sentence."
    )
}

/// Final text of an assistant turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub text: String,
    pub flagged: bool,
}

impl TurnOutcome {
    fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            flagged: false,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            flagged: true,
        }
    }
}

/// The model side of the engine: either a working session or the reason it failed to open.
pub enum ModelState {
    Ready {
        planner: IntentPlanner,
        session: ModelSession,
    },
    Unavailable(String),
}

/// Conversation loop: plans a tool call, dispatches it, or streams a fallback answer.
///
/// Turns are taken one at a time from the event queue, so a turn submitted
/// while another is in flight waits for it to settle.
pub struct AgentEngine {
    mode: AgentMode,
    event_rx: mpsc::Receiver<AgentEvent>,
    bus: EventBus,
    transcript: Transcript,
    history: Option<SessionHistory>,
    model: ModelState,
    context: RecordContext,
    dispatcher: ToolDispatcher,
}

impl AgentEngine {
    pub fn new(
        mode: AgentMode,
        event_rx: mpsc::Receiver<AgentEvent>,
        bus: EventBus,
        model: ModelState,
        context: RecordContext,
        dispatcher: ToolDispatcher,
    ) -> Self {
        Self {
            mode,
            event_rx,
            bus,
            transcript: Transcript::new(),
            history: None,
            model,
            context,
            dispatcher,
        }
    }

    pub fn with_history(mut self, history: SessionHistory) -> Self {
        self.history = Some(history);
        self
    }

    pub fn mode(&self) -> AgentMode {
        self.mode
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Runs until `Stop` or until every sender is dropped, then hands back the transcript.
    pub async fn run_loop(mut self) -> Transcript {
        if let ModelState::Unavailable(reason) = &self.model {
            let reason = reason.clone();
            tracing::error!(reason = %reason, "language model unavailable, no turns will be processed");
            let idx = self.append(ConversationTurn::assistant(String::new()));
            self.settle(idx, TurnOutcome::error(format!("Language model not available: {reason}")));
            return self.transcript;
        }

        while let Some(event) = self.event_rx.recv().await {
            match event {
                AgentEvent::UserInput(text) => self.handle_user(&text).await,
                AgentEvent::SetMode(mode) => self.set_mode(mode),
                AgentEvent::ToggleMode => self.set_mode(self.mode.toggled()),
                AgentEvent::Stop => break,
            }
            tokio::task::yield_now().await;
        }
        tracing::info!(turns = self.transcript.len(), "agent loop ended");
        self.transcript
    }

    pub fn set_mode(&mut self, mode: AgentMode) {
        if self.mode != mode {
            tracing::info!(mode = mode.label(), "mode changed");
        }
        self.mode = mode;
        self.bus.send(TranscriptEvent::ModeChanged { mode });
    }

    /// Processes one user turn to completion.
    pub async fn handle_user(&mut self, question: &str) {
        if question.trim().is_empty() {
            return;
        }
        let ModelState::Ready { .. } = &self.model else {
            tracing::warn!("turn ignored, model unavailable");
            return;
        };

        self.phase(TurnPhase::Received);
        self.append(ConversationTurn::user(question));
        let idx = self.append(ConversationTurn::assistant(THINKING_TEXT));

        let outcome = match self.run_turn(question, idx).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "turn failed");
                TurnOutcome::error(format!("Error: {e}"))
            }
        };
        self.settle(idx, outcome);
        self.phase(TurnPhase::Settled);
    }

    async fn run_turn(&mut self, question: &str, idx: usize) -> FieldlightResult<TurnOutcome> {
        let ModelState::Ready { planner, .. } = &self.model else {
            return Ok(TurnOutcome::error("Language model not available"));
        };

        if self.mode == AgentMode::Agent {
            self.bus.send(TranscriptEvent::PhaseChanged {
                phase: TurnPhase::Planning,
            });
            let raw = planner
                .plan(question, &self.context.text, &ToolAction::names())
                .await?;

            match recover_command(&raw) {
                PlanOutcome::Command(command) => {
                    self.phase(TurnPhase::Dispatched {
                        action: command.action.name().to_string(),
                    });
                    let result = self.dispatcher.dispatch(&command).await;
                    return Ok(match result {
                        ToolResult::Done { field } => {
                            TurnOutcome::ok(format!("Done: {} on {}.", command.action, field))
                        }
                        ToolResult::Failed { error } => {
                            TurnOutcome::error(format!("Error running {}: {}", command.action, error))
                        }
                    });
                }
                PlanOutcome::UnknownAction(name) => {
                    tracing::warn!(action = %name, "planner chose an unknown action");
                    return Ok(TurnOutcome::error(format!("Unknown action: {name}")));
                }
                PlanOutcome::NoAction => {
                    tracing::debug!("no tool applies, answering conversationally");
                }
                PlanOutcome::Unparsed => {
                    tracing::debug!("no command recovered from planner output, answering conversationally");
                }
            }
        }

        self.phase(TurnPhase::FallbackAnswering);
        self.stream_answer(question, idx).await
    }

    async fn stream_answer(&mut self, question: &str, idx: usize) -> FieldlightResult<TurnOutcome> {
        let ModelState::Ready { session, .. } = &self.model else {
            return Ok(TurnOutcome::error("Language model not available"));
        };
        let prompt = build_answer_prompt(&self.context.text, question);
        let mut stream = session.prompt_streaming(&prompt).await?;

        let mut assembler = StreamAssembler::new();
        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(chunk) => {
                    let text = assembler.push(&chunk);
                    self.transcript.set_text(idx, text);
                    self.bus.send(TranscriptEvent::TurnUpdated {
                        index: idx,
                        text: text.to_string(),
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, partial_len = assembler.text().len(), "answer stream failed");
                    let partial = assembler.into_text();
                    let text = if partial.is_empty() {
                        format!("Error: {e}")
                    } else {
                        format!("{partial}\nError: {e}")
                    };
                    return Ok(TurnOutcome::error(text));
                }
            }
        }
        let text = assembler.into_text();
        if text.is_empty() {
            // Nothing arrived, so the placeholder is never replaced.
            tracing::warn!("answer stream ended without any text");
            return Ok(TurnOutcome::ok(THINKING_TEXT));
        }
        Ok(TurnOutcome::ok(text))
    }

    fn append(&mut self, turn: ConversationTurn) -> usize {
        let index = self.transcript.push(turn.clone());
        self.bus.send(TranscriptEvent::TurnAppended { index, turn });
        index
    }

    fn settle(&mut self, index: usize, outcome: TurnOutcome) {
        let Some(turn) = self.transcript.settle(index, outcome.text, outcome.flagged).cloned() else {
            return;
        };
        if let Some(history) = self.history.as_mut() {
            // Log the user turn that opened this exchange along with the answer.
            let user = index.checked_sub(1).and_then(|i| self.transcript.turns().get(i));
            for entry in user.into_iter().chain(Some(&turn)).map(HistoryEntry::from_turn) {
                if let Err(e) = history.append(&entry) {
                    tracing::warn!(error = %e, "history append failed");
                }
            }
        }
        self.bus.send(TranscriptEvent::TurnSettled { index, turn });
    }

    fn phase(&self, phase: TurnPhase) {
        tracing::debug!(?phase, "turn phase");
        self.bus.send(TranscriptEvent::PhaseChanged { phase });
    }
}
