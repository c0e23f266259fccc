//! Form state management
//!
//! `FormState` holds the current value of every schema field plus the
//! reserved consent flag. It is rebuilt from the schema on load and reset,
//! and only ever holds keys that the last schema declared.

pub mod config;

use crate::form::{FieldSchema, QuestionType};
use crate::{Result, VoxError};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved key for the personal data consent flag
pub const CONSENT_KEY: &str = "consent";

/// Value held by one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Text-like widgets (text, textarea, select, date, email, tel, url)
    Text(String),
    /// Checkbox
    Flag(bool),
}

impl FieldValue {
    /// The empty value for a widget family
    pub fn empty_for(q_type: QuestionType) -> Self {
        match q_type {
            QuestionType::Checkbox => FieldValue::Flag(false),
            _ => FieldValue::Text(String::new()),
        }
    }

    /// Initial value for a schema entry
    pub fn default_for(schema: &FieldSchema) -> Self {
        match (schema.q_type, schema.default_value.as_deref()) {
            (QuestionType::Checkbox, Some(raw)) => FieldValue::Flag(parse_flag(raw)),
            (QuestionType::Checkbox, None) => FieldValue::Flag(false),
            (_, Some(raw)) => FieldValue::Text(raw.to_string()),
            (_, None) => FieldValue::Text(String::new()),
        }
    }

    /// True for "" and unchecked boxes
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Flag(b) => !b,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Flag(_) => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FieldValue::Flag(b) => Some(*b),
            FieldValue::Text(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Flag(true) => write!(f, "yes"),
            FieldValue::Flag(false) => write!(f, "no"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Flag(b)
    }
}

/// Interpret a checkbox default or a typed yes/no answer
pub fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "true" | "on" | "1" | "yes" | "y" | "x"
    )
}

/// Current value of every field, in schema order, plus consent
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormState {
    fields: Vec<(String, FieldValue)>,
    consent: bool,
}

impl FormState {
    /// Build the initial state for a schema list
    ///
    /// One entry per distinct `text` key; duplicates keep the first
    /// declaration. Consent starts unset.
    pub fn initialize(schemas: &[FieldSchema]) -> Self {
        let mut fields: Vec<(String, FieldValue)> = Vec::with_capacity(schemas.len());
        for schema in schemas {
            if fields.iter().any(|(key, _)| key == &schema.text) {
                debug!("Duplicate field key {} ignored", schema.text);
                continue;
            }
            fields.push((schema.text.clone(), FieldValue::default_for(schema)));
        }
        debug!("Form state initialized with {} fields", fields.len());
        Self {
            fields,
            consent: false,
        }
    }

    /// Replace every value with the schema defaults
    pub fn reset(&mut self, schemas: &[FieldSchema]) {
        *self = Self::initialize(schemas);
    }

    /// Overwrite one field's value
    ///
    /// Values are not validated here; unknown keys are refused.
    pub fn set_field(&mut self, key: &str, value: FieldValue) -> Result<()> {
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => {
                *slot = value;
                Ok(())
            }
            None => Err(VoxError::UnknownField(key.to_string())),
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn consent(&self) -> bool {
        self.consent
    }

    pub fn set_consent(&mut self, consent: bool) {
        self.consent = consent;
    }

    /// Number of schema fields (consent excluded)
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Snapshot as a JSON object including the consent key
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (key, value) in &self.fields {
            let json = match value {
                FieldValue::Text(s) => serde_json::Value::String(s.clone()),
                FieldValue::Flag(b) => serde_json::Value::Bool(*b),
            };
            map.insert(key.clone(), json);
        }
        map.insert(CONSENT_KEY.to_string(), serde_json::Value::Bool(self.consent));
        serde_json::Value::Object(map)
    }
}
