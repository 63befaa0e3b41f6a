use serde::{Deserialize, Serialize};

/// Value of a record attribute as shown to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl FieldValue {
    /// Converts an arbitrary JSON attribute into display text.
    ///
    /// List items that are objects render as their `email_address`, else their
    /// `name`, else their JSON text. Other objects render as JSON text.
    pub fn from_json(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => FieldValue::Text(String::new()),
            Value::String(s) => FieldValue::Text(s.clone()),
            Value::Array(items) => FieldValue::List(items.iter().map(list_item_text).collect()),
            other => FieldValue::Text(other.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::List(items) => items.is_empty(),
        }
    }
}

fn list_item_text(item: &serde_json::Value) -> String {
    use serde_json::Value;
    match item {
        Value::Object(map) => map
            .get("email_address")
            .or_else(|| map.get("name"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| item.to_string()),
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::List(items) => f.write_str(&items.join(", ")),
        }
    }
}

/// One attribute of the displayed record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawField")]
pub struct FieldDescriptor {
    /// Canonical key, unique within a record schema.
    #[serde(rename = "name")]
    pub field_name: String,
    /// Human display string. Not guaranteed unique.
    pub label: String,
    pub value: FieldValue,
}

impl FieldDescriptor {
    pub fn new(field_name: impl Into<String>, label: impl Into<String>, value: FieldValue) -> Self {
        let field_name = field_name.into();
        let label = label.into();
        let label = if label.trim().is_empty() {
            field_name.clone()
        } else {
            label
        };
        Self {
            field_name,
            label,
            value,
        }
    }
}

#[derive(Deserialize)]
struct RawField {
    name: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    value: serde_json::Value,
}

impl From<RawField> for FieldDescriptor {
    fn from(raw: RawField) -> Self {
        FieldDescriptor::new(
            raw.name,
            raw.label.unwrap_or_default(),
            FieldValue::from_json(&raw.value),
        )
    }
}

/// A label node as laid out on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutCell {
    /// Structural field name of the enclosing cell, when the markup carries one.
    #[serde(default)]
    pub name: Option<String>,
    /// Visible label text.
    pub label: String,
}

/// Everything the host hands over about the record currently on screen.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordSnapshot {
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    /// Label nodes on screen. When empty, one cell per field is assumed.
    #[serde(default)]
    pub layout: Vec<LayoutCell>,
}

impl RecordSnapshot {
    pub fn field(&self, field_name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.field_name == field_name)
    }

    pub fn layout_or_default(&self) -> Vec<LayoutCell> {
        if !self.layout.is_empty() {
            return self.layout.clone();
        }
        self.fields
            .iter()
            .map(|f| LayoutCell {
                name: Some(f.field_name.clone()),
                label: f.label.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_items_prefer_email_then_name() {
        let v = FieldValue::from_json(&json!([
            {"email_address": "a@example.com", "name": "A"},
            {"name": "B"},
            {"id": 7},
            "plain"
        ]));
        assert_eq!(
            v,
            FieldValue::List(vec![
                "a@example.com".into(),
                "B".into(),
                r#"{"id":7}"#.into(),
                "plain".into()
            ])
        );
        assert_eq!(v.to_string(), r#"a@example.com, B, {"id":7}, plain"#);
    }

    #[test]
    fn null_and_scalars_render_as_text() {
        assert!(FieldValue::from_json(&json!(null)).is_empty());
        assert_eq!(FieldValue::from_json(&json!(42)).to_string(), "42");
        assert_eq!(FieldValue::from_json(&json!(true)).to_string(), "true");
        assert_eq!(
            FieldValue::from_json(&json!({"k": "v"})).to_string(),
            r#"{"k":"v"}"#
        );
    }

    #[test]
    fn blank_label_falls_back_to_field_name() {
        let snap: RecordSnapshot = serde_json::from_value(json!({
            "fields": [
                {"name": "status", "label": "Status", "value": "Active"},
                {"name": "industry", "label": "  "},
                {"name": "website"}
            ]
        }))
        .unwrap();
        assert_eq!(snap.field("industry").unwrap().label, "industry");
        assert_eq!(snap.field("website").unwrap().label, "website");
        assert!(snap.field("website").unwrap().value.is_empty());
        assert_eq!(snap.layout_or_default().len(), 3);
    }
}
