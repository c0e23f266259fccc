//! Backend-declared field schema
//!
//! One `FieldSchema` describes one question. The list is fetched once per
//! session and never mutated afterwards.

use log::{error, warn};
use std::collections::HashSet;
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Widget family declared by the backend.
///
/// Unknown or missing values deserialize to `Text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Textarea,
    Select,
    Checkbox,
    Date,
    Email,
    Tel,
    Url,
    #[default]
    #[serde(other)]
    Text,
}

impl QuestionType {
    /// The HTML-style input type name
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Text => "text",
            QuestionType::Textarea => "textarea",
            QuestionType::Select => "select",
            QuestionType::Checkbox => "checkbox",
            QuestionType::Date => "date",
            QuestionType::Email => "email",
            QuestionType::Tel => "tel",
            QuestionType::Url => "url",
        }
    }
}

/// Question identifier; backends send numbers or strings
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionId {
    Number(i64),
    Text(String),
}

impl Default for QuestionId {
    fn default() -> Self {
        QuestionId::Number(0)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionId::Number(n) => write!(f, "{}", n),
            QuestionId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Description of one form question
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldSchema {
    #[serde(default)]
    pub id: QuestionId,

    /// Stable key; the form state is indexed by it
    pub text: String,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub q_type: QuestionType,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub hint: Option<String>,

    #[serde(default)]
    pub help_text: Option<String>,

    #[serde(default)]
    pub pattern: Option<String>,

    #[serde(default)]
    pub rows: Option<u32>,

    #[serde(default, deserialize_with = "loose_string")]
    pub default_value: Option<String>,

    #[serde(default)]
    pub options_list: Option<Vec<String>>,
}

impl FieldSchema {
    /// Build a minimal schema entry
    pub fn new(text: impl Into<String>, q_type: QuestionType) -> Self {
        Self {
            text: text.into(),
            q_type,
            ..Self::default()
        }
    }

    /// Label if present, otherwise the key
    pub fn display_name(&self) -> &str {
        self.label
            .as_deref()
            .filter(|label| !label.is_empty())
            .unwrap_or(&self.text)
    }

    /// Declared options; empty for non-select fields
    pub fn options(&self) -> &[String] {
        self.options_list.as_deref().unwrap_or(&[])
    }
}

/// Accept strings, bools and numbers as a string default
fn loose_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Dataset shipped with the binary, used when the backend is unavailable
const FALLBACK_JSON: &str = include_str!("../../data/questions.json");

static FALLBACK: Lazy<Vec<FieldSchema>> = Lazy::new(|| {
    serde_json::from_str(FALLBACK_JSON).unwrap_or_else(|e| {
        error!("Bundled question set is invalid: {}", e);
        Vec::new()
    })
});

/// The bundled static question set
pub fn fallback_questions() -> Vec<FieldSchema> {
    FALLBACK.clone()
}

/// Keep the first declaration of every `text` key
pub fn dedup_keys(schemas: Vec<FieldSchema>) -> Vec<FieldSchema> {
    let mut seen = HashSet::new();
    schemas
        .into_iter()
        .filter(|schema| {
            let first = seen.insert(schema.text.clone());
            if !first {
                warn!("Dropping duplicate question key {}", schema.text);
            }
            first
        })
        .collect()
}
