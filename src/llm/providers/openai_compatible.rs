use std::collections::VecDeque;
use std::pin::Pin;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};

use crate::errors::{FieldlightError, FieldlightResult};
use crate::llm::provider::{LlmProvider, TextStream};
use crate::llm::sse_parser::{self, SseEvent};
use crate::llm::types::{CallConfig, ChatMessage};

pub struct OpenAiCompatibleProvider {
    id: String,
    api_base: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    pub fn new(id: String, api_base: String, api_key: String) -> Self {
        Self {
            id,
            api_base,
            api_key,
            client: reqwest::Client::new(),
        }
    }

    async fn send(&self, prompt: &str, cfg: &CallConfig, stream: bool) -> FieldlightResult<reqwest::Response> {
        let body = serde_json::json!({
            "model": cfg.model,
            "messages": [ChatMessage::user(prompt)],
            "stream": stream,
            "temperature": cfg.temperature,
        });

        tracing::debug!(
            provider = %self.id,
            model = %cfg.model,
            stream,
            prompt_len = prompt.len(),
            "sending LLM request"
        );

        let mut request = self.client.post(&self.api_base).json(&body);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let err_body = response.text().await.unwrap_or_default();
            return Err(FieldlightError::LlmProvider(format!("{}: {}", status, err_body)));
        }
        Ok(response)
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.id
    }

    async fn probe(&self, cfg: &CallConfig) -> FieldlightResult<()> {
        reqwest::Url::parse(&self.api_base).map_err(|e| {
            FieldlightError::Config(format!("provider '{}' has invalid api_base: {e}", self.id))
        })?;
        if cfg.model.is_empty() {
            return Err(FieldlightError::Config(format!(
                "provider '{}' has no model configured",
                self.id
            )));
        }
        Ok(())
    }

    async fn prompt(&self, prompt: &str, cfg: &CallConfig) -> FieldlightResult<String> {
        let response = self.send(prompt, cfg, false).await?;
        let json: serde_json::Value = response.json().await?;
        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string();
        tracing::info!(provider = %self.id, content_len = content.len(), "LLM JSON response received");
        Ok(content)
    }

    async fn prompt_streaming(&self, prompt: &str, cfg: &CallConfig) -> FieldlightResult<TextStream> {
        let response = self.send(prompt, cfg, true).await?;
        Ok(sse_text_stream(response.bytes_stream()))
    }
}

struct SseState<S> {
    bytes: Pin<Box<S>>,
    line_buf: Vec<u8>,
    pending: VecDeque<String>,
    done: bool,
}

impl<S> SseState<S> {
    fn feed(&mut self, data: &[u8]) {
        for &b in data {
            if b == b'\n' {
                let line = std::mem::take(&mut self.line_buf);
                self.handle_line(&String::from_utf8_lossy(&line));
                if self.done {
                    return;
                }
            } else {
                self.line_buf.push(b);
            }
        }
    }

    fn handle_line(&mut self, raw: &str) {
        let line = raw.trim();
        if line.is_empty() {
            return;
        }
        match sse_parser::parse_sse_line(line) {
            Ok(Some(SseEvent::Text(text))) => self.pending.push_back(text),
            Ok(Some(SseEvent::Reasoning(_))) => {}
            Ok(Some(SseEvent::Finished)) => self.done = true,
            Ok(None) => {}
            Err(e) => tracing::debug!("SSE parse skipped: {e}"),
        }
    }
}

/// Turns an OpenAI-compatible SSE byte stream into incremental content chunks.
pub fn sse_text_stream<S, B>(bytes: S) -> TextStream
where
    S: Stream<Item = reqwest::Result<B>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    let state = SseState {
        bytes: Box::pin(bytes),
        line_buf: Vec::new(),
        pending: VecDeque::new(),
        done: false,
    };

    let stream = futures_util::stream::unfold(state, |mut st| async move {
        loop {
            if let Some(text) = st.pending.pop_front() {
                return Some((Ok(text), st));
            }
            if st.done {
                return None;
            }
            match st.bytes.next().await {
                Some(Ok(data)) => st.feed(data.as_ref()),
                Some(Err(e)) => {
                    st.done = true;
                    return Some((Err(FieldlightError::Streaming(e.to_string())), st));
                }
                None => {
                    // Stream ended without [DONE]; flush a trailing unterminated line.
                    let tail = std::mem::take(&mut st.line_buf);
                    st.handle_line(&String::from_utf8_lossy(&tail));
                    st.done = true;
                }
            }
        }
    });
    Box::pin(stream)
}
