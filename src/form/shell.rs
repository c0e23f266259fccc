//! Form shell
//!
//! Composes the gateway, the form state, the widgets and the narrator
//! into one questionnaire session: load, fill in, submit, reset.

use super::{
    dedup_keys, Direction, FieldEvent, FieldSchema, SubmissionPayload, SubmitStatus, Widget,
};
use crate::gateway::FormBackend;
use crate::speech::Narrator;
use crate::state::{FieldValue, FormState};
use crate::{Result, ValidationFailure, VoxError};
use log::{debug, info, warn};
use unicode_width::UnicodeWidthStr;

pub const TITLE: &str = "Employment assistance application";
pub const SUBMIT_SUCCESS: &str = "Form submitted successfully! Thank you for your application.";
pub const SUBMIT_FAILURE: &str = "An error occurred while submitting the form. Please try again.";
pub const FORM_CLEARED: &str = "Form cleared. All fields have been reset.";
pub const RESET_PROMPT: &str = "Are you sure you want to clear all fields?";
pub const LOAD_FAILURE: &str = "Error loading the form.";
pub const EMPTY_FORM: &str = "No data to display the form.";

/// Where the question list is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Failed(String),
    Ready,
}

/// Buttons below the field list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Submit,
    Reset,
}

impl FormAction {
    fn spoken_name(&self) -> &'static str {
        match self {
            FormAction::Submit => "Submit questionnaire button.",
            FormAction::Reset => "Clear form button.",
        }
    }
}

/// One questionnaire session
pub struct FormShell<B: FormBackend> {
    backend: B,
    narrator: Narrator,
    schemas: Vec<FieldSchema>,
    widgets: Vec<Widget>,
    form: FormState,
    load_state: LoadState,
    status: SubmitStatus,
}

impl<B: FormBackend> FormShell<B> {
    /// Create a shell; nothing is fetched until `load`
    pub fn new(backend: B, narrator: Narrator) -> Self {
        Self {
            backend,
            narrator,
            schemas: Vec::new(),
            widgets: Vec::new(),
            form: FormState::default(),
            load_state: LoadState::Loading,
            status: SubmitStatus::default(),
        }
    }

    /// Fetch the question list and build the form
    pub async fn load(&mut self) -> &LoadState {
        self.load_state = LoadState::Loading;
        match self.backend.fetch_questions().await {
            Ok(schemas) => self.apply_schema(schemas),
            Err(e) => {
                warn!("Failed to load questions: {}", e);
                self.load_state = LoadState::Failed(format!("Request failed: {}", e));
                self.narrator.speak(LOAD_FAILURE);
            }
        }
        &self.load_state
    }

    /// Reload after a failure
    pub async fn retry(&mut self) -> &LoadState {
        info!("Retrying form load");
        self.load().await
    }

    fn apply_schema(&mut self, schemas: Vec<FieldSchema>) {
        // Widgets, state and answers must agree on one entry per key
        let schemas = dedup_keys(schemas);
        info!("Form ready with {} fields", schemas.len());
        self.widgets = schemas.iter().map(Widget::from_schema).collect();
        self.form = FormState::initialize(&schemas);
        self.schemas = schemas;
        self.status = SubmitStatus::default();
        self.load_state = LoadState::Ready;
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn is_ready(&self) -> bool {
        self.load_state == LoadState::Ready
    }

    pub fn schemas(&self) -> &[FieldSchema] {
        &self.schemas
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn status(&self) -> &SubmitStatus {
        &self.status
    }

    pub fn narrator(&self) -> &Narrator {
        &self.narrator
    }

    pub fn narrator_mut(&mut self) -> &mut Narrator {
        &mut self.narrator
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    // Field events

    fn dispatch(&mut self, index: usize, event: FieldEvent) -> Result<()> {
        let widget = self
            .widgets
            .get(index)
            .ok_or_else(|| VoxError::UnknownField(format!("#{}", index + 1)))?;
        widget.handle(event, &mut self.form, &mut self.narrator)
    }

    pub fn focus(&mut self, index: usize) -> Result<()> {
        self.dispatch(index, FieldEvent::Focus)
    }

    pub fn hover(&mut self, index: usize) -> Result<()> {
        self.dispatch(index, FieldEvent::Hover)
    }

    pub fn change(&mut self, index: usize, value: FieldValue) -> Result<()> {
        self.dispatch(index, FieldEvent::Change(value))
    }

    pub fn step_option(&mut self, index: usize, direction: Direction) -> Result<()> {
        self.dispatch(index, FieldEvent::Step(direction))
    }

    pub fn set_consent(&mut self, consent: bool) {
        self.form.set_consent(consent);
        if self.narrator.auto_speak() {
            self.narrator.speak(if consent {
                "Consent given."
            } else {
                "Consent withdrawn."
            });
        }
    }

    /// Narrate a button under the pointer
    pub fn hover_action(&mut self, action: FormAction) {
        if self.narrator.auto_speak() {
            self.narrator.speak(action.spoken_name());
        }
    }

    // Voice toolbar

    pub fn speak_all(&mut self) {
        self.narrator.speak_all_form(&self.schemas);
    }

    pub fn stop_speech(&mut self) {
        self.narrator.stop();
    }

    pub fn repeat_current_field(&mut self) {
        self.narrator.speak_current_field();
    }

    pub fn set_auto_speak(&mut self, enabled: bool) {
        self.narrator.set_auto_speak(enabled);
    }

    pub fn toggle_auto_speak(&mut self) -> bool {
        let enabled = !self.narrator.auto_speak();
        self.narrator.set_auto_speak(enabled);
        enabled
    }

    // Actions

    /// First widget constraint the current values break
    pub fn validate(&self) -> std::result::Result<(), ValidationFailure> {
        for widget in &self.widgets {
            if let Some(value) = self.form.get(&widget.key) {
                widget.validate(value)?;
            }
        }
        Ok(())
    }

    /// Validate, package and send the answers
    ///
    /// Nothing reaches the backend without consent and valid fields. On
    /// success the form is cleared; on failure the entered data stays.
    pub async fn submit(&mut self) -> &SubmitStatus {
        if !self.is_ready() {
            debug!("Submit ignored, form not ready");
            return &self.status;
        }
        self.narrator.poll();

        if !self.form.consent() {
            self.reject(ValidationFailure::MissingConsent);
            return &self.status;
        }
        if let Err(failure) = self.validate() {
            self.reject(failure);
            return &self.status;
        }

        debug!("Submitting {}", self.form.to_json());
        let payload = SubmissionPayload::build(&self.schemas, &self.form);
        match self.backend.submit_answers(&payload).await {
            Ok(()) => {
                info!("Submitted as {}", payload.respondent_identifier);
                self.form.reset(&self.schemas);
                self.status = SubmitStatus::success(SUBMIT_SUCCESS);
                self.narrator.speak(SUBMIT_SUCCESS);
            }
            Err(e) => {
                warn!("Submit failed: {}", e);
                self.status = SubmitStatus::error(SUBMIT_FAILURE);
                self.narrator.speak(SUBMIT_FAILURE);
            }
        }
        &self.status
    }

    fn reject(&mut self, failure: ValidationFailure) {
        let message = failure.to_string();
        debug!("Submit blocked: {}", message);
        self.narrator.speak(&message);
        self.status = SubmitStatus::error(message);
    }

    /// Clear every field after the user confirms
    pub fn reset<F>(&mut self, confirm: F) -> bool
    where
        F: FnOnce(&str) -> bool,
    {
        if !confirm(RESET_PROMPT) {
            debug!("Reset cancelled");
            return false;
        }
        self.form.reset(&self.schemas);
        self.status = SubmitStatus::default();
        self.narrator.speak(FORM_CLEARED);
        true
    }

    /// Text rendering of the whole page
    pub fn render(&self) -> String {
        match &self.load_state {
            LoadState::Loading => return "Loading the form...".to_string(),
            LoadState::Failed(message) => {
                return format!("{}\n{}\nType :retry to try again.", LOAD_FAILURE, message)
            }
            LoadState::Ready => {}
        }

        let mut out = format!("{}\n{}\n", TITLE, "=".repeat(UnicodeWidthStr::width(TITLE)));
        if self.widgets.is_empty() {
            out.push_str(EMPTY_FORM);
            out.push('\n');
            return out;
        }

        let column = self.widgets.iter().map(Widget::label_width).max().unwrap_or(0);
        for (i, widget) in self.widgets.iter().enumerate() {
            out.push_str(&format!(
                "{:>2}. {}\n",
                i + 1,
                widget.render(self.form.get(&widget.key), column)
            ));
        }
        out.push_str(&format!(
            "Consent to personal data processing: {}\n",
            if self.form.consent() { "[x]" } else { "[ ]" }
        ));
        if !self.status.message.is_empty() {
            out.push_str(&self.status.message);
            out.push('\n');
        }
        out
    }
}
