//! Dynamic field renderer
//!
//! Maps one `FieldSchema` to one interactive widget and routes widget
//! events to the form state and the narrator. The mapping is pure: the
//! same schema always yields the same widget.

use super::{FieldSchema, QuestionType};
use crate::speech::Narrator;
use crate::state::{parse_flag, FieldValue, FormState};
use crate::{Result, ValidationFailure};
use chrono::NaiveDate;
use log::{debug, warn};
use regex::Regex;
use unicode_width::UnicodeWidthStr;

/// Rows used by a textarea without an explicit `rows`
pub const DEFAULT_ROWS: u32 = 3;

/// Placeholder option text when the schema has no hint
pub const DEFAULT_PLACEHOLDER: &str = "Choose an option";

/// Per-type widget data
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetKind {
    Text,
    Textarea { rows: u32 },
    Select { options: Vec<String>, placeholder: String },
    Checkbox,
    Date,
    Email,
    Tel { pattern: Option<String> },
    Url,
}

/// Arrow-key direction inside a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// User interaction with one widget
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEvent {
    Focus,
    Hover,
    Change(FieldValue),
    Step(Direction),
}

/// One rendered field
#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    /// Form state key (`FieldSchema::text`)
    pub key: String,
    pub label: String,
    pub required: bool,
    pub hint: Option<String>,
    pub help_text: Option<String>,
    pub kind: WidgetKind,
}

impl Widget {
    /// Build the widget for a schema entry
    pub fn from_schema(schema: &FieldSchema) -> Self {
        let kind = match schema.q_type {
            QuestionType::Textarea => WidgetKind::Textarea {
                rows: schema.rows.filter(|&r| r > 0).unwrap_or(DEFAULT_ROWS),
            },
            QuestionType::Select => WidgetKind::Select {
                options: schema.options().to_vec(),
                placeholder: schema
                    .hint
                    .clone()
                    .filter(|h| !h.is_empty())
                    .unwrap_or_else(|| DEFAULT_PLACEHOLDER.to_string()),
            },
            QuestionType::Checkbox => WidgetKind::Checkbox,
            QuestionType::Date => WidgetKind::Date,
            QuestionType::Email => WidgetKind::Email,
            QuestionType::Tel => WidgetKind::Tel {
                pattern: schema.pattern.clone().filter(|p| !p.is_empty()),
            },
            QuestionType::Url => WidgetKind::Url,
            // Unrecognized backend types already decode as Text
            QuestionType::Text => WidgetKind::Text,
        };

        Self {
            key: schema.text.clone(),
            label: schema.display_name().to_string(),
            required: schema.required,
            hint: schema.hint.clone().filter(|h| !h.is_empty()),
            help_text: schema.help_text.clone().filter(|h| !h.is_empty()),
            kind,
        }
    }

    pub fn q_type(&self) -> QuestionType {
        match self.kind {
            WidgetKind::Text => QuestionType::Text,
            WidgetKind::Textarea { .. } => QuestionType::Textarea,
            WidgetKind::Select { .. } => QuestionType::Select,
            WidgetKind::Checkbox => QuestionType::Checkbox,
            WidgetKind::Date => QuestionType::Date,
            WidgetKind::Email => QuestionType::Email,
            WidgetKind::Tel { .. } => QuestionType::Tel,
            WidgetKind::Url => QuestionType::Url,
        }
    }

    /// Options of a select widget; empty otherwise
    pub fn options(&self) -> &[String] {
        match &self.kind {
            WidgetKind::Select { options, .. } => options,
            _ => &[],
        }
    }

    /// Route an event to the form state and the narrator
    pub fn handle(
        &self,
        event: FieldEvent,
        form: &mut FormState,
        narrator: &mut Narrator,
    ) -> Result<()> {
        debug!("Field {} event {:?}", self.key, event);
        match event {
            FieldEvent::Change(value) => {
                let spoken = value.to_string();
                form.set_field(&self.key, value)?;
                if self.q_type() == QuestionType::Select {
                    narrator.speak_selected_option(&spoken);
                }
            }
            FieldEvent::Focus => {
                if narrator.auto_speak() {
                    narrator.set_current_field(&self.label, self.q_type());
                    let text = self.describe(form.get(&self.key));
                    narrator.speak(&text);
                }
            }
            FieldEvent::Hover => {
                if narrator.auto_speak() {
                    narrator.speak_field(&self.label, self.q_type());
                }
            }
            FieldEvent::Step(direction) => {
                if let WidgetKind::Select { options, .. } = &self.kind {
                    let current = form.get(&self.key).and_then(|v| v.as_text()).unwrap_or("");
                    let next = step_option(options, current, direction);
                    form.set_field(&self.key, FieldValue::Text(next.clone()))?;
                    narrator.speak_selected_option(&next);
                }
            }
        }
        Ok(())
    }

    /// Rich utterance: label, requirement, value, hint and options
    pub fn describe(&self, value: Option<&FieldValue>) -> String {
        let mut parts = Vec::new();

        let mut head = format!("{}, {}", self.label, self.type_phrase());
        if self.required {
            head.push_str(", required");
        }
        parts.push(format!("{}.", head));

        match (&self.kind, value) {
            (WidgetKind::Checkbox, Some(FieldValue::Flag(true))) => {
                parts.push("Checked.".to_string())
            }
            (WidgetKind::Checkbox, _) => parts.push("Not checked.".to_string()),
            (_, Some(v)) if !v.is_empty() => parts.push(format!("Current value: {}.", v)),
            _ => parts.push("Empty.".to_string()),
        }

        if let Some(hint) = &self.hint {
            parts.push(format!("Hint: {}.", hint));
        }

        if let WidgetKind::Select { options, .. } = &self.kind {
            if options.is_empty() {
                parts.push("No options available.".to_string());
            } else {
                parts.push(format!(
                    "{} options: {}.",
                    options.len(),
                    options.join(", ")
                ));
            }
            parts.push("Use the up and down arrows to choose an option.".to_string());
        }

        parts.join(" ")
    }

    fn type_phrase(&self) -> &'static str {
        match self.kind {
            WidgetKind::Text => "text field",
            WidgetKind::Textarea { .. } => "multi-line text field",
            WidgetKind::Select { .. } => "selection list",
            WidgetKind::Checkbox => "checkbox",
            WidgetKind::Date => "date field, year month day",
            WidgetKind::Email => "email field",
            WidgetKind::Tel { .. } => "phone field",
            WidgetKind::Url => "link field",
        }
    }

    /// Turn a typed console answer into a value for this widget
    pub fn parse_input(&self, raw: &str) -> std::result::Result<FieldValue, ValidationFailure> {
        match &self.kind {
            WidgetKind::Checkbox => {
                let word = raw.trim().to_lowercase();
                if parse_flag(&word) {
                    Ok(FieldValue::Flag(true))
                } else if matches!(word.as_str(), "" | "no" | "n" | "false" | "off" | "0") {
                    Ok(FieldValue::Flag(false))
                } else {
                    Err(ValidationFailure::Malformed {
                        field: self.label.clone(),
                        expected: "yes or no".to_string(),
                    })
                }
            }
            WidgetKind::Select { options, .. } => {
                let answer = raw.trim();
                if answer.is_empty() || answer == "0" {
                    return Ok(FieldValue::Text(String::new()));
                }
                if let Ok(n) = answer.parse::<usize>() {
                    if let Some(option) = n.checked_sub(1).and_then(|i| options.get(i)) {
                        return Ok(FieldValue::Text(option.clone()));
                    }
                }
                options
                    .iter()
                    .find(|o| o.to_lowercase() == answer.to_lowercase())
                    .map(|o| FieldValue::Text(o.clone()))
                    .ok_or_else(|| ValidationFailure::UnknownOption {
                        field: self.label.clone(),
                        value: answer.to_string(),
                    })
            }
            _ => Ok(FieldValue::Text(raw.trim_end_matches(['\r', '\n']).to_string())),
        }
    }

    /// Widget-level constraints: required, type format, pattern, options
    pub fn validate(&self, value: &FieldValue) -> std::result::Result<(), ValidationFailure> {
        if self.required && value.is_empty() {
            return Err(ValidationFailure::MissingRequired {
                field: self.label.clone(),
            });
        }

        let text = match value {
            FieldValue::Flag(_) if self.kind == WidgetKind::Checkbox => return Ok(()),
            FieldValue::Flag(_) => {
                return Err(self.malformed("text"));
            }
            FieldValue::Text(_) if self.kind == WidgetKind::Checkbox => {
                return Err(self.malformed("yes or no"));
            }
            FieldValue::Text(s) => s.trim(),
        };

        if text.is_empty() {
            return Ok(());
        }

        match &self.kind {
            WidgetKind::Email if !is_email(text) => Err(self.malformed("an email address")),
            WidgetKind::Url if url::Url::parse(text).is_err() => {
                Err(self.malformed("an absolute link such as https://example.com"))
            }
            WidgetKind::Date if NaiveDate::parse_from_str(text, "%Y-%m-%d").is_err() => {
                Err(self.malformed("a date as year-month-day"))
            }
            WidgetKind::Tel {
                pattern: Some(pattern),
            } => match full_match(pattern) {
                Some(re) if !re.is_match(text) => {
                    Err(self.malformed(&format!("the format {}", pattern)))
                }
                _ => Ok(()),
            },
            WidgetKind::Select { options, .. } if !options.iter().any(|o| o == text) => {
                Err(ValidationFailure::UnknownOption {
                    field: self.label.clone(),
                    value: text.to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    fn malformed(&self, expected: &str) -> ValidationFailure {
        ValidationFailure::Malformed {
            field: self.label.clone(),
            expected: expected.to_string(),
        }
    }

    /// Display width of the label, for column alignment
    pub fn label_width(&self) -> usize {
        UnicodeWidthStr::width(self.label.as_str()) + if self.required { 2 } else { 0 }
    }

    /// Text rendering of the widget and its current value
    ///
    /// `column` pads the label so values line up across fields.
    pub fn render(&self, value: Option<&FieldValue>, column: usize) -> String {
        let mut label = self.label.clone();
        if self.required {
            label.push_str(" *");
        }
        let pad = column.saturating_sub(UnicodeWidthStr::width(label.as_str()));
        let kind = match &self.kind {
            WidgetKind::Textarea { rows } => format!("textarea, {} rows", rows),
            _ => self.q_type().as_str().to_string(),
        };

        let shown = match (&self.kind, value) {
            (WidgetKind::Checkbox, Some(FieldValue::Flag(true))) => "[x]".to_string(),
            (WidgetKind::Checkbox, _) => "[ ]".to_string(),
            (WidgetKind::Select { placeholder, .. }, Some(v)) if v.is_empty() => {
                format!("({})", placeholder)
            }
            (WidgetKind::Select { placeholder, .. }, None) => format!("({})", placeholder),
            (_, Some(v)) => v.to_string(),
            (_, None) => String::new(),
        };

        let mut out = format!("{}{} [{}]: {}", label, " ".repeat(pad), kind, shown);

        if let Some(hint) = &self.hint {
            out.push_str(&format!("\n    hint: {}", hint));
        }
        if let Some(help) = &self.help_text {
            out.push_str(&format!("\n    help: {}", help));
        }
        if let WidgetKind::Select {
            options,
            placeholder,
        } = &self.kind
        {
            let current = value.and_then(|v| v.as_text()).unwrap_or("");
            let marker = |selected: bool| if selected { ">" } else { " " };
            out.push_str(&format!(
                "\n  {} 0) {}",
                marker(current.is_empty()),
                placeholder
            ));
            for (i, option) in options.iter().enumerate() {
                out.push_str(&format!(
                    "\n  {} {}) {}",
                    marker(option == current),
                    i + 1,
                    option
                ));
            }
        }

        out
    }
}

/// Next option in arrow-key order; the placeholder ("") sits first
pub fn step_option(options: &[String], current: &str, direction: Direction) -> String {
    // 0 is the placeholder, 1..=len are the options
    let position = options
        .iter()
        .position(|o| o == current)
        .map(|i| i + 1)
        .unwrap_or(0);
    let next = match direction {
        Direction::Up => position.saturating_sub(1),
        Direction::Down => (position + 1).min(options.len()),
    };
    if next == 0 {
        String::new()
    } else {
        options[next - 1].clone()
    }
}

/// `local@domain` with no whitespace
fn is_email(text: &str) -> bool {
    match text.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !text.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// Compile a pattern anchored on both ends; invalid patterns are ignored
fn full_match(pattern: &str) -> Option<Regex> {
    match Regex::new(&format!("^(?:{})$", pattern)) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!("Ignoring invalid field pattern {}: {}", pattern, e);
            None
        }
    }
}
