use std::collections::HashMap;

use crate::record::schema::FieldDescriptor;

/// Label/identifier lookup for one record schema.
///
/// `by_label` collisions keep the field indexed last.
#[derive(Debug, Clone, Default)]
pub struct FieldIndex {
    by_name: HashMap<String, String>,
    by_label: HashMap<String, String>,
}

impl FieldIndex {
    pub fn build(fields: &[FieldDescriptor]) -> Self {
        let mut index = Self::default();
        for field in fields {
            index
                .by_name
                .insert(field.field_name.to_lowercase(), field.field_name.clone());
            let label_key = field.label.trim().to_lowercase();
            if let Some(previous) = index.by_label.insert(label_key, field.field_name.clone()) {
                if previous != field.field_name {
                    tracing::debug!(
                        label = %field.label,
                        previous = %previous,
                        winner = %field.field_name,
                        "duplicate field label, later entry wins"
                    );
                }
            }
        }
        index
    }

    /// Maps a display label or field key to the canonical field name.
    pub fn resolve(&self, query: &str) -> Option<String> {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return None;
        }
        self.by_name
            .get(&q)
            .or_else(|| self.by_label.get(&q))
            .cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }
}
