//! Widget records and input normalization.
//!
//! DESIGN
//! ======
//! Records are stored schema-less as JSON objects ([`Document`]) so upserts
//! can shallow-merge arbitrary fields. [`Widget`] is the typed view handed
//! back to callers; [`WidgetPatch`] is the partial form used for inserts
//! with generated ids and for merges.
//!
//! Every mutating input goes through [`check_item`]: it is serialized to a
//! JSON value, which keeps only data fields, then checked for shape and
//! given an id when it has none.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::StoreError;

/// Schema-less record as held by a collection.
pub type Document = Map<String, Value>;

pub const ID_FIELD: &str = "id";

/// Fields that must hold strings whenever present.
const STRING_FIELDS: [&str; 4] = ["text", "description", "visualization", "code"];

// =============================================================================
// WIDGET
// =============================================================================

/// A user-authored script/widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub description: String,
    /// Render tag, e.g. `"graph"` or `"chart"`.
    #[serde(default)]
    pub visualization: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub data: Value,
    /// Fields outside the known schema, kept as stored.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Widget {
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            description: String::new(),
            visualization: String::new(),
            code: String::new(),
            data: Value::Null,
            extra: Map::new(),
        }
    }

    /// Typed view of a stored document. Missing string fields read as empty.
    pub(crate) fn from_document(doc: &Document) -> Self {
        let string_field = |key: &str| {
            doc.get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned()
        };
        let extra = doc
            .iter()
            .filter(|(key, _)| !is_known_field(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Self {
            id: string_field(ID_FIELD),
            text: string_field("text"),
            description: string_field("description"),
            visualization: string_field("visualization"),
            code: string_field("code"),
            data: doc.get("data").cloned().unwrap_or(Value::Null),
            extra,
        }
    }

    #[must_use]
    pub fn summary(&self) -> WidgetSummary {
        WidgetSummary { id: self.id.clone(), text: self.text.clone() }
    }
}

fn is_known_field(key: &str) -> bool {
    key == ID_FIELD || key == "data" || STRING_FIELDS.contains(&key)
}

/// Lightweight projection used for pickers and menus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetSummary {
    pub id: String,
    pub text: String,
}

impl WidgetSummary {
    pub(crate) fn from_document(doc: &Document) -> Self {
        let field = |key: &str| {
            doc.get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned()
        };
        Self { id: field(ID_FIELD), text: field("text") }
    }
}

// =============================================================================
// PATCH
// =============================================================================

/// Partial widget. Unset fields are not serialized, so they neither
/// overwrite stored values on upsert nor appear on insert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WidgetPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visualization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl WidgetPatch {
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self { id: Some(id.into()), ..Self::default() }
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn visualization(mut self, visualization: impl Into<String>) -> Self {
        self.visualization = Some(visualization.into());
        self
    }

    #[must_use]
    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    #[must_use]
    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

// =============================================================================
// NORMALIZATION
// =============================================================================

/// Fresh unique identifier for records submitted without one.
#[must_use]
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Normalize a mutating input into a storable document.
///
/// # Errors
///
/// Returns `Validation` if the input is nil, is not a record, or carries
/// an `id` or string field of the wrong type.
pub fn check_item<T>(item: &T) -> Result<Document, StoreError>
where
    T: Serialize + ?Sized,
{
    let value =
        serde_json::to_value(item).map_err(|e| StoreError::Validation(format!("input is not serializable: {e}")))?;

    let mut doc = match value {
        Value::Null => return Err(StoreError::nil_input()),
        Value::Object(doc) => doc,
        other => {
            return Err(StoreError::Validation(format!("expected a record, got {}", json_kind(&other))));
        }
    };

    match doc.get(ID_FIELD) {
        None | Some(Value::Null) => {
            doc.insert(ID_FIELD.into(), Value::String(generate_id()));
        }
        Some(Value::String(_)) => {}
        Some(other) => {
            return Err(StoreError::Validation(format!("id must be a string, got {}", json_kind(other))));
        }
    }

    for field in STRING_FIELDS {
        if let Some(value) = doc.get(field) {
            if !value.is_string() {
                return Err(StoreError::Validation(format!(
                    "field '{field}' must be a string, got {}",
                    json_kind(value)
                )));
            }
        }
    }

    Ok(doc)
}

/// The `id` of a document, if it has a string one.
#[must_use]
pub fn document_id(doc: &Document) -> Option<&str> {
    doc.get(ID_FIELD).and_then(Value::as_str)
}

pub(crate) fn has_id(doc: &Document, id: &str) -> bool {
    document_id(doc) == Some(id)
}

/// Shallow merge: patch fields overwrite, everything else is kept.
pub(crate) fn merge_into(target: &mut Document, patch: &Document) {
    for (key, value) in patch {
        target.insert(key.clone(), value.clone());
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[path = "widget_test.rs"]
mod tests;
