//! Shared fixtures: a scripted model and a small account record.
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use fieldlight_lib::errors::{FieldlightError, FieldlightResult};
use fieldlight_lib::llm::provider::{LlmProvider, TextStream};
use fieldlight_lib::llm::session::ModelSession;
use fieldlight_lib::llm::types::CallConfig;
use fieldlight_lib::record::context::{read_context, RecordContext};
use fieldlight_lib::record::schema::{FieldDescriptor, FieldValue, RecordSnapshot};
use fieldlight_lib::record::source::StaticRecordSource;
use fieldlight_lib::visual::locator::LabelBoard;

/// Replays canned planner replies and answer streams, recording every prompt.
#[derive(Default)]
pub struct ScriptedProvider {
    plans: Mutex<VecDeque<FieldlightResult<String>>>,
    streams: Mutex<VecDeque<Vec<FieldlightResult<String>>>>,
    pub plan_prompts: Mutex<Vec<String>>,
    pub answer_prompts: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn plan(&self, reply: &str) -> &Self {
        self.plans.lock().unwrap().push_back(Ok(reply.to_string()));
        self
    }

    pub fn plan_error(&self, message: &str) -> &Self {
        self.plans
            .lock()
            .unwrap()
            .push_back(Err(FieldlightError::LlmProvider(message.to_string())));
        self
    }

    pub fn answer(&self, chunks: &[&str]) -> &Self {
        self.streams
            .lock()
            .unwrap()
            .push_back(chunks.iter().map(|c| Ok(c.to_string())).collect());
        self
    }

    pub fn answer_then_fail(&self, chunks: &[&str], message: &str) -> &Self {
        let mut script: Vec<FieldlightResult<String>> =
            chunks.iter().map(|c| Ok(c.to_string())).collect();
        script.push(Err(FieldlightError::Streaming(message.to_string())));
        self.streams.lock().unwrap().push_back(script);
        self
    }

    pub fn plan_calls(&self) -> usize {
        self.plan_prompts.lock().unwrap().len()
    }

    pub fn answer_calls(&self) -> usize {
        self.answer_prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn prompt(&self, prompt: &str, _cfg: &CallConfig) -> FieldlightResult<String> {
        self.plan_prompts.lock().unwrap().push(prompt.to_string());
        self.plans
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(r#"{"action":"none","params":{}}"#.to_string()))
    }

    async fn prompt_streaming(&self, prompt: &str, _cfg: &CallConfig) -> FieldlightResult<TextStream> {
        self.answer_prompts.lock().unwrap().push(prompt.to_string());
        let script = self.streams.lock().unwrap().pop_front().unwrap_or_default();
        Ok(Box::pin(futures_util::stream::iter(script)))
    }
}

pub fn session(provider: Arc<ScriptedProvider>) -> ModelSession {
    ModelSession::single(
        provider,
        CallConfig {
            model: "scripted".into(),
            stream: true,
            temperature: 0.0,
        },
    )
}

pub fn account_snapshot() -> RecordSnapshot {
    RecordSnapshot {
        module: Some("Accounts".into()),
        fields: vec![
            FieldDescriptor::new("name", "Name", FieldValue::Text("Acme Corp".into())),
            FieldDescriptor::new("status", "Status", FieldValue::Text("Active".into())),
            FieldDescriptor::new("account_type", "Account Type", FieldValue::Text("Customer".into())),
            FieldDescriptor::new("description", "Description", FieldValue::default()),
        ],
        layout: vec![],
    }
}

pub fn account_context() -> RecordContext {
    read_context(&StaticRecordSource::new(account_snapshot())).unwrap()
}

pub fn account_board() -> Arc<LabelBoard> {
    Arc::new(LabelBoard::from_snapshot(&account_snapshot()))
}
