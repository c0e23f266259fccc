//! Dynamic questionnaire: schema, widgets, payload and the shell tying
//! them to the gateway and the narrator

pub mod payload;
pub mod schema;
pub mod shell;
pub mod widget;

pub use payload::{Answer, SubmissionPayload, SubmitState, SubmitStatus};
pub use schema::{dedup_keys, fallback_questions, FieldSchema, QuestionId, QuestionType};
pub use shell::{FormAction, FormShell, LoadState};
pub use widget::{Direction, FieldEvent, Widget, WidgetKind};
