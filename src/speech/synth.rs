//! Speech synthesizer abstraction
//!
//! Provides a unified interface over the host's text-to-speech engine.
//! The narrator is the only caller; it owns exactly one synthesizer.

use crate::Result;
use log::info;

/// Voice parameters applied to every utterance
///
/// Rate, pitch and volume are multipliers of the engine's normal value,
/// so `1.0` always means "engine default".
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSettings {
    /// BCP 47 language tag used to pick a voice (e.g. `en-US`)
    pub lang: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            lang: "en-US".to_string(),
            rate: 0.8,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

/// A single utterance submitted to the engine
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub text: String,
    pub lang: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl SpeechRequest {
    /// Build a request for `text` using the given voice settings
    pub fn new(text: impl Into<String>, voice: &VoiceSettings) -> Self {
        Self {
            text: text.into(),
            lang: voice.lang.clone(),
            rate: voice.rate,
            pitch: voice.pitch,
            volume: voice.volume,
        }
    }
}

/// Speech synthesizer trait
///
/// Backends wrap a host engine. They do not queue: the narrator cancels
/// before every new utterance.
pub trait Synth: Send {
    /// Start speaking an utterance
    fn speak(&mut self, request: &SpeechRequest) -> Result<()>;

    /// Cancel/silence current speech
    fn cancel(&mut self) -> Result<()>;

    /// Whether the engine is still producing audio.
    ///
    /// `None` when the engine cannot report it.
    fn is_speaking(&self) -> Option<bool> {
        None
    }
}

/// Create the host speech synthesizer
///
/// Uses the `tts` crate, which selects Speech Dispatcher on Linux,
/// AVFoundation on macOS and SAPI/WinRT on Windows.
pub fn create_synth() -> Result<Box<dyn Synth>> {
    let platform = std::env::consts::OS;
    info!("Creating native speech synthesizer for platform: {}", platform);

    use super::backends::native::NativeSynth;

    match NativeSynth::new() {
        Ok(synth) => {
            info!("Initialized native TTS backend");
            Ok(Box::new(synth))
        }
        Err(e) => Err(crate::VoxError::SpeechUnavailable(format!(
            "No speech backend available on platform '{}': {}",
            platform, e
        ))),
    }
}
