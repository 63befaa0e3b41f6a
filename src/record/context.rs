use crate::errors::{FieldlightError, FieldlightResult};
use crate::record::index::FieldIndex;
use crate::record::schema::RecordSnapshot;
use crate::record::source::RecordSource;

pub const READ_ERROR_TEXT: &str = "Error retrieving record data.";

/// Read-only view of the record handed to the planner and the chat prompt.
#[derive(Debug, Clone, Default)]
pub struct RecordContext {
    /// One `"<label> (<field_name>): <value>"` line per field, sorted.
    pub text: String,
    pub index: FieldIndex,
    pub snapshot: Option<RecordSnapshot>,
}

impl RecordContext {
    pub fn from_snapshot(snapshot: RecordSnapshot) -> Self {
        let mut lines: Vec<String> = snapshot
            .fields
            .iter()
            .map(|f| format!("{} ({}): {}", f.label, f.field_name, f.value))
            .collect();
        lines.sort();
        Self {
            text: lines.join("\n"),
            index: FieldIndex::build(&snapshot.fields),
            snapshot: Some(snapshot),
        }
    }

    /// Context used when the record is missing (empty text) or unreadable
    /// (an error line the model can relay). The index is always empty.
    pub fn placeholder(err: &FieldlightError) -> Self {
        let text = match err {
            FieldlightError::NoRecordLoaded => "",
            _ => READ_ERROR_TEXT,
        };
        Self {
            text: text.to_string(),
            index: FieldIndex::default(),
            snapshot: None,
        }
    }
}

/// Reads the record and distinguishes "no record" from "read failure".
pub fn read_context(source: &dyn RecordSource) -> FieldlightResult<RecordContext> {
    match source.snapshot() {
        Ok(Some(snapshot)) => Ok(RecordContext::from_snapshot(snapshot)),
        Ok(None) => Err(FieldlightError::NoRecordLoaded),
        Err(FieldlightError::ContextRead(msg)) => Err(FieldlightError::ContextRead(msg)),
        Err(other) => Err(FieldlightError::ContextRead(other.to_string())),
    }
}

/// Like [`read_context`], but logs the failure and falls back to a placeholder.
pub fn read_context_or_placeholder(source: &dyn RecordSource) -> RecordContext {
    match read_context(source) {
        Ok(ctx) => ctx,
        Err(e @ FieldlightError::NoRecordLoaded) => {
            tracing::info!("no record loaded, continuing with empty context");
            RecordContext::placeholder(&e)
        }
        Err(e) => {
            tracing::warn!(error = %e, "record context unavailable");
            RecordContext::placeholder(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::schema::{FieldDescriptor, FieldValue};
    use crate::record::source::StaticRecordSource;

    struct BrokenSource;

    impl RecordSource for BrokenSource {
        fn snapshot(&self) -> FieldlightResult<Option<RecordSnapshot>> {
            Err(FieldlightError::Agent("host went away".into()))
        }
    }

    #[test]
    fn context_lines_are_sorted_and_carry_both_names() {
        let snap = RecordSnapshot {
            module: None,
            fields: vec![
                FieldDescriptor::new("status", "Status", FieldValue::Text("Active".into())),
                FieldDescriptor::new(
                    "email",
                    "Email",
                    FieldValue::List(vec!["a@x.io".into(), "b@x.io".into()]),
                ),
            ],
            layout: vec![],
        };
        let ctx = read_context(&StaticRecordSource::new(snap)).unwrap();
        assert_eq!(ctx.text, "Email (email): a@x.io, b@x.io\nStatus (status): Active");
        assert_eq!(ctx.index.resolve("status").as_deref(), Some("status"));
    }

    #[test]
    fn no_record_and_read_error_are_distinct() {
        let none = read_context(&StaticRecordSource::empty()).unwrap_err();
        assert!(matches!(none, FieldlightError::NoRecordLoaded));
        let broken = read_context(&BrokenSource).unwrap_err();
        assert!(matches!(broken, FieldlightError::ContextRead(_)));
    }

    #[test]
    fn placeholder_has_empty_index() {
        let ctx = read_context_or_placeholder(&StaticRecordSource::empty());
        assert!(ctx.text.is_empty());
        assert!(ctx.index.is_empty());
        let ctx = read_context_or_placeholder(&BrokenSource);
        assert_eq!(ctx.text, READ_ERROR_TEXT);
    }
}
