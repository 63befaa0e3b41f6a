use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;

use crate::agent_engine::state::{ConversationTurn, Role};
use crate::errors::FieldlightResult;

/// Append-only list of turns. Only the text of the newest in-flight assistant
/// turn is ever rewritten, while it streams.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<ConversationTurn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: ConversationTurn) -> usize {
        self.turns.push(turn);
        self.turns.len() - 1
    }

    pub fn set_text(&mut self, index: usize, text: &str) {
        if let Some(turn) = self.turns.get_mut(index) {
            turn.text.clear();
            turn.text.push_str(text);
        }
    }

    pub fn settle(&mut self, index: usize, text: String, flagged: bool) -> Option<&ConversationTurn> {
        let turn = self.turns.get_mut(index)?;
        turn.text = text;
        turn.flagged = flagged;
        Some(turn)
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub ts: i64,
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub flagged: bool,
}

impl HistoryEntry {
    pub fn from_turn(turn: &ConversationTurn) -> Self {
        Self {
            ts: chrono::Utc::now().timestamp_millis(),
            role: turn.role,
            content: turn.text.clone(),
            flagged: turn.flagged,
        }
    }
}

/// JSONL log of settled turns for one widget session.
pub struct SessionHistory {
    pub session_id: String,
    written: usize,
    file_path: PathBuf,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::in_dir(data_dir_or_cwd())
    }

    pub fn in_dir(dir: PathBuf) -> Self {
        let session_id = uuid::Uuid::new_v4().to_string();
        let file_path = dir.join(format!("session_{session_id}.jsonl"));
        Self {
            session_id,
            written: 0,
            file_path,
        }
    }

    /// Lines appended so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn file_path(&self) -> &std::path::Path {
        &self.file_path
    }

    /// Appends one entry to the JSONL file. Nothing is kept in memory.
    pub fn append(&mut self, entry: &HistoryEntry) -> FieldlightResult<()> {
        let line = serde_json::to_string(entry)?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;
        writeln!(file, "{line}")?;
        self.written += 1;
        tracing::debug!(
            path = %self.file_path.display(),
            written = self.written,
            "history entry appended"
        );
        Ok(())
    }
}

impl Default for SessionHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// `<data_local_dir>/fieldlight/sessions`, falling back to the working directory.
fn data_dir_or_cwd() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        let d = data_dir.join("fieldlight").join("sessions");
        if std::fs::create_dir_all(&d).is_ok() {
            return d;
        }
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_settles_in_place() {
        let mut t = Transcript::new();
        t.push(ConversationTurn::user("hi"));
        let idx = t.push(ConversationTurn::assistant("Thinking…"));
        t.set_text(idx, "Hel");
        assert_eq!(t.turns()[idx].text, "Hel");
        let settled = t.settle(idx, "Hello".into(), true).unwrap();
        assert!(settled.flagged);
        assert_eq!(t.len(), 2);
        assert!(t.settle(9, String::new(), false).is_none());
    }

    #[test]
    fn append_writes_jsonl_lines() {
        let dir = tempfile::tempdir().unwrap();
        let mut history = SessionHistory::in_dir(dir.path().to_path_buf());
        history
            .append(&HistoryEntry::from_turn(&ConversationTurn::user("highlight status")))
            .unwrap();
        history
            .append(&HistoryEntry::from_turn(&ConversationTurn::assistant("Done.")))
            .unwrap();
        assert_eq!(history.written(), 2);

        let content = std::fs::read_to_string(history.file_path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let second: HistoryEntry = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.role, Role::Assistant);
        assert_eq!(second.content, "Done.");
    }
}
