use serde::Deserialize;

use crate::errors::{FieldlightError, FieldlightResult};

/// What one `data:` line of an OpenAI-compatible stream carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// New answer text.
    Text(String),
    /// Reasoning text some models send alongside the answer; never shown.
    Reasoning(String),
    /// `[DONE]` or a `finish_reason`.
    Finished,
}

#[derive(Deserialize)]
struct CompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize, Default)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    reasoning_content: Option<String>,
}

/// Parses one trimmed SSE line. Comments, other fields and empty deltas yield `None`.
pub fn parse_sse_line(line: &str) -> FieldlightResult<Option<SseEvent>> {
    let Some(data) = line.strip_prefix("data:").map(str::trim) else {
        return Ok(None);
    };
    if data == "[DONE]" {
        return Ok(Some(SseEvent::Finished));
    }

    let chunk: CompletionChunk =
        serde_json::from_str(data).map_err(|e| FieldlightError::SseParsing(e.to_string()))?;
    let Some(choice) = chunk.choices.into_iter().next() else {
        return Ok(None);
    };

    let non_empty = |s: Option<String>| s.filter(|s| !s.is_empty());
    let event = if let Some(text) = non_empty(choice.delta.reasoning_content) {
        Some(SseEvent::Reasoning(text))
    } else if let Some(text) = non_empty(choice.delta.content) {
        Some(SseEvent::Text(text))
    } else {
        choice.finish_reason.map(|_| SseEvent::Finished)
    };
    Ok(event)
}
