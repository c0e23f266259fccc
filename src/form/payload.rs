//! Answer submission payload and submit feedback

use super::{FieldSchema, QuestionId};
use crate::state::{FieldValue, FormState};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Value of `source` for answers produced by this client
pub const SOURCE: &str = "web";

/// One answered question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: QuestionId,
    pub value: FieldValue,
}

/// Body of the submit request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub source: String,
    pub respondent_identifier: String,
    pub answers: Vec<Answer>,
}

impl SubmissionPayload {
    /// Pair every schema entry with its current value, in schema order
    pub fn build(schemas: &[FieldSchema], form: &FormState) -> Self {
        let answers = schemas
            .iter()
            .map(|schema| Answer {
                question_id: schema.id.clone(),
                value: form
                    .get(&schema.text)
                    .cloned()
                    .unwrap_or_else(|| FieldValue::empty_for(schema.q_type)),
            })
            .collect();

        Self {
            source: SOURCE.to_string(),
            respondent_identifier: Uuid::new_v4().to_string(),
            answers,
        }
    }
}

/// Outcome shown after a submit attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitState {
    #[default]
    None,
    Success,
    Error,
}

/// Transient submit feedback
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubmitStatus {
    pub state: SubmitState,
    pub message: String,
}

impl SubmitStatus {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            state: SubmitState::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            state: SubmitState::Error,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::QuestionType;

    #[test]
    fn test_build_payload() {
        let mut name = FieldSchema::new("fullName", QuestionType::Text);
        name.id = QuestionId::Number(1);
        let mut remote = FieldSchema::new("remote", QuestionType::Checkbox);
        remote.id = QuestionId::Number(2);
        let schemas = vec![name, remote];

        let mut form = FormState::initialize(&schemas);
        form.set_field("fullName", "Ivan".into()).unwrap();
        form.set_field("remote", true.into()).unwrap();

        let payload = SubmissionPayload::build(&schemas, &form);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["source"], "web");
        assert_eq!(
            json["answers"],
            serde_json::json!([
                {"question_id": 1, "value": "Ivan"},
                {"question_id": 2, "value": true}
            ])
        );
        assert!(Uuid::parse_str(&payload.respondent_identifier).is_ok());
    }

    #[test]
    fn test_identifiers_differ() {
        let schemas = vec![FieldSchema::new("a", QuestionType::Text)];
        let form = FormState::initialize(&schemas);
        let first = SubmissionPayload::build(&schemas, &form);
        let second = SubmissionPayload::build(&schemas, &form);
        assert_ne!(first.respondent_identifier, second.respondent_identifier);
    }

    #[test]
    fn test_status_serializes() {
        let status = SubmitStatus::success("ok");
        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            serde_json::json!({"state": "success", "message": "ok"})
        );
    }
}
