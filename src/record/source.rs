use std::path::PathBuf;

use crate::errors::{FieldlightError, FieldlightResult};
use crate::record::schema::RecordSnapshot;

/// Supplies the record currently displayed by the host.
///
/// `Ok(None)` means no record is loaded; `Err` means one could not be read.
pub trait RecordSource: Send + Sync {
    fn snapshot(&self) -> FieldlightResult<Option<RecordSnapshot>>;
}

/// Reads a JSON snapshot exported by the host page.
pub struct JsonRecordSource {
    path: PathBuf,
}

impl JsonRecordSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for JsonRecordSource {
    fn snapshot(&self) -> FieldlightResult<Option<RecordSnapshot>> {
        if !self.path.exists() {
            tracing::info!(path = %self.path.display(), "no record snapshot on disk");
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| FieldlightError::ContextRead(format!("{}: {e}", self.path.display())))?;
        let snapshot: RecordSnapshot = serde_json::from_str(&content)
            .map_err(|e| FieldlightError::ContextRead(format!("{}: {e}", self.path.display())))?;
        tracing::info!(
            path = %self.path.display(),
            fields = snapshot.fields.len(),
            "record snapshot loaded"
        );
        Ok(Some(snapshot))
    }
}

/// A snapshot held in memory, for hosts that push the record directly.
#[derive(Default)]
pub struct StaticRecordSource {
    snapshot: Option<RecordSnapshot>,
}

impl StaticRecordSource {
    pub fn new(snapshot: RecordSnapshot) -> Self {
        Self {
            snapshot: Some(snapshot),
        }
    }

    pub fn empty() -> Self {
        Self { snapshot: None }
    }
}

impl RecordSource for StaticRecordSource {
    fn snapshot(&self) -> FieldlightResult<Option<RecordSnapshot>> {
        Ok(self.snapshot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_means_no_record() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonRecordSource::new(dir.path().join("record.json"));
        assert!(source.snapshot().unwrap().is_none());
    }

    #[test]
    fn invalid_json_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("record.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = JsonRecordSource::new(&path).snapshot().unwrap_err();
        assert!(matches!(err, FieldlightError::ContextRead(_)));
    }

    #[test]
    fn reads_fields_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("record.json");
        std::fs::write(
            &path,
            r#"{"module":"Accounts","fields":[{"name":"status","label":"Status","value":"Active"}]}"#,
        )
        .unwrap();
        let snap = JsonRecordSource::new(&path).snapshot().unwrap().unwrap();
        assert_eq!(snap.module.as_deref(), Some("Accounts"));
        assert_eq!(snap.fields[0].field_name, "status");
    }
}
