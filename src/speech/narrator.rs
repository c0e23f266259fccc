//! Single-channel narrator
//!
//! Owns the one speech slot of the session. Every new utterance cancels
//! the one in flight before it starts; nothing is ever queued. Without a
//! synthesizer the narrator is silent and every operation is a no-op.

use super::{SpeechRequest, Synth, VoiceSettings};
use crate::form::QuestionType;
use crate::form::FieldSchema;
use log::{debug, error, info, warn};

/// Whether an utterance currently occupies the speech slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarratorState {
    Idle,
    Speaking,
}

/// Asynchronous notifications from a speech engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    /// The active utterance finished playing
    Finished,
    /// The engine gave up on the active utterance
    Failed(String),
}

/// Field the user last asked about, for "repeat"
#[derive(Debug, Clone, PartialEq, Eq)]
struct CurrentField {
    name: String,
    q_type: QuestionType,
}

/// Narrator wrapping the host synthesizer
pub struct Narrator {
    /// Host synthesizer, absent when speech is unavailable
    synth: Option<Box<dyn Synth>>,

    /// Voice parameters stamped onto every request
    voice: VoiceSettings,

    /// The single active utterance
    active: Option<SpeechRequest>,

    current_field: Option<CurrentField>,

    /// Speak on focus/hover without an explicit command
    auto_speak: bool,
}

impl Narrator {
    /// Create a narrator over an existing synthesizer
    pub fn new(synth: Box<dyn Synth>, voice: VoiceSettings) -> Self {
        Self {
            synth: Some(synth),
            voice,
            active: None,
            current_field: None,
            auto_speak: true,
        }
    }

    /// Create a narrator that never speaks
    pub fn silent(voice: VoiceSettings) -> Self {
        Self {
            synth: None,
            voice,
            active: None,
            current_field: None,
            auto_speak: true,
        }
    }

    /// Create a narrator over the host engine.
    ///
    /// Falls back to a silent narrator when the host has no speech
    /// capability; the form stays usable either way.
    pub fn with_host(voice: VoiceSettings) -> Self {
        match super::create_synth() {
            Ok(synth) => Self::new(synth, voice),
            Err(e) => {
                warn!("{}", e);
                Self::silent(voice)
            }
        }
    }

    /// Whether a speech engine is attached
    pub fn is_available(&self) -> bool {
        self.synth.is_some()
    }

    pub fn state(&self) -> NarratorState {
        if self.active.is_some() {
            NarratorState::Speaking
        } else {
            NarratorState::Idle
        }
    }

    pub fn is_speaking(&self) -> bool {
        self.state() == NarratorState::Speaking
    }

    /// The utterance currently occupying the slot
    pub fn active(&self) -> Option<&SpeechRequest> {
        self.active.as_ref()
    }

    pub fn voice(&self) -> &VoiceSettings {
        &self.voice
    }

    pub fn auto_speak(&self) -> bool {
        self.auto_speak
    }

    pub fn set_auto_speak(&mut self, enabled: bool) {
        debug!("Auto speak {}", if enabled { "on" } else { "off" });
        self.auto_speak = enabled;
    }

    /// Name of the field last spoken with `speak_field`
    pub fn current_field(&self) -> Option<&str> {
        self.current_field.as_ref().map(|f| f.name.as_str())
    }

    /// Speak an utterance, pre-empting any active one
    pub fn speak(&mut self, text: &str) {
        let Some(synth) = self.synth.as_mut() else {
            return;
        };

        if let Some(previous) = self.active.take() {
            debug!("Pre-empting utterance: {}", previous.text);
            if let Err(e) = synth.cancel() {
                error!("Failed to cancel active utterance: {}", e);
            }
        }

        let request = SpeechRequest::new(text, &self.voice);
        match synth.speak(&request) {
            Ok(()) => self.active = Some(request),
            Err(e) => error!("Speech failed: {}", e),
        }
    }

    /// Cancel any utterance and force the idle state
    pub fn stop(&mut self) {
        if let Some(synth) = self.synth.as_mut() {
            if let Err(e) = synth.cancel() {
                error!("Failed to stop speech: {}", e);
            }
        }
        self.active = None;
    }

    /// Handle a completion or error notification from the engine
    pub fn notify(&mut self, event: SpeechEvent) {
        if let SpeechEvent::Failed(reason) = &event {
            warn!("Utterance failed: {}", reason);
        }
        self.active = None;
    }

    /// Ask the engine whether the active utterance is still playing
    pub fn poll(&mut self) -> NarratorState {
        if self.active.is_some() {
            let finished = self
                .synth
                .as_ref()
                .and_then(|synth| synth.is_speaking())
                .map(|speaking| !speaking)
                .unwrap_or(false);
            if finished {
                self.notify(SpeechEvent::Finished);
            }
        }
        self.state()
    }

    /// Name a field, with navigation instructions for selections
    pub fn speak_field(&mut self, name: &str, q_type: QuestionType) {
        self.current_field = Some(CurrentField {
            name: name.to_string(),
            q_type,
        });
        let text = field_utterance(name, q_type);
        self.speak(&text);
    }

    /// Repeat the field last named with `speak_field`
    pub fn speak_current_field(&mut self) {
        if let Some(field) = self.current_field.clone() {
            self.speak_field(&field.name, field.q_type);
        }
    }

    /// Remember a field as current without speaking its name
    pub fn set_current_field(&mut self, name: &str, q_type: QuestionType) {
        self.current_field = Some(CurrentField {
            name: name.to_string(),
            q_type,
        });
    }

    /// One summary utterance listing every field in order
    pub fn speak_all_form(&mut self, schemas: &[FieldSchema]) {
        if schemas.is_empty() {
            return;
        }
        info!("Speaking form summary ({} fields)", schemas.len());
        let text = form_summary(schemas);
        self.speak(&text);
    }

    /// Confirm a selection
    pub fn speak_selected_option(&mut self, value: &str) {
        let text = if value.is_empty() {
            "No option selected.".to_string()
        } else {
            format!("Selected: {}.", value)
        };
        self.speak(&text);
    }
}

/// "Field: X." plus arrow-key hint for selections
pub fn field_utterance(name: &str, q_type: QuestionType) -> String {
    if q_type == QuestionType::Select {
        format!(
            "Field: {}. Use the up and down arrows to choose an option.",
            name
        )
    } else {
        format!("Field: {}.", name)
    }
}

/// Welcome text naming every field
pub fn form_summary(schemas: &[FieldSchema]) -> String {
    let fields = schemas
        .iter()
        .map(|schema| schema.display_name())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Welcome to the accessibility questionnaire. \
         The form contains the following fields: {}. \
         Required fields are marked with an asterisk. \
         Move between fields with next and previous.",
        fields
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;
    use std::sync::{Arc, Mutex};

    #[derive(Default, Clone)]
    struct Log(Arc<Mutex<Vec<String>>>);

    struct FakeSynth {
        log: Log,
        speaking: Option<bool>,
    }

    impl Synth for FakeSynth {
        fn speak(&mut self, request: &SpeechRequest) -> Result<()> {
            self.log.0.lock().unwrap().push(format!("speak:{}", request.text));
            Ok(())
        }

        fn cancel(&mut self) -> Result<()> {
            self.log.0.lock().unwrap().push("cancel".to_string());
            Ok(())
        }

        fn is_speaking(&self) -> Option<bool> {
            self.speaking
        }
    }

    fn make_narrator(speaking: Option<bool>) -> (Narrator, Log) {
        let log = Log::default();
        let synth = FakeSynth {
            log: log.clone(),
            speaking,
        };
        (Narrator::new(Box::new(synth), VoiceSettings::default()), log)
    }

    #[test]
    fn test_speak_preempts() {
        let (mut narrator, log) = make_narrator(None);
        narrator.speak("one");
        narrator.speak("two");

        let entries = log.0.lock().unwrap().clone();
        assert_eq!(entries, vec!["speak:one", "cancel", "speak:two"]);
        assert_eq!(narrator.active().unwrap().text, "two");
    }

    #[test]
    fn test_stop_forces_idle() {
        let (mut narrator, _log) = make_narrator(None);
        narrator.stop();
        assert_eq!(narrator.state(), NarratorState::Idle);

        narrator.speak("hello");
        assert_eq!(narrator.state(), NarratorState::Speaking);
        narrator.stop();
        assert_eq!(narrator.state(), NarratorState::Idle);
    }

    #[test]
    fn test_poll_detects_end() {
        let (mut narrator, _log) = make_narrator(Some(false));
        narrator.speak("hello");
        assert_eq!(narrator.poll(), NarratorState::Idle);

        let (mut narrator, _log) = make_narrator(None);
        narrator.speak("hello");
        assert_eq!(narrator.poll(), NarratorState::Speaking);
    }

    #[test]
    fn test_field_utterance() {
        assert_eq!(field_utterance("Name", QuestionType::Text), "Field: Name.");
        assert!(field_utterance("City", QuestionType::Select).contains("up and down"));
    }

    #[test]
    fn test_repeat_without_current_field() {
        let (mut narrator, log) = make_narrator(None);
        narrator.speak_current_field();
        assert!(log.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_selected_option() {
        let (mut narrator, _log) = make_narrator(None);
        narrator.speak_selected_option("Kazan");
        assert_eq!(narrator.active().unwrap().text, "Selected: Kazan.");
        narrator.speak_selected_option("");
        assert_eq!(narrator.active().unwrap().text, "No option selected.");
    }
}
