//! Native TTS backend using the tts crate
//!
//! The `tts` crate provides a unified interface to:
//! - Speech Dispatcher on Linux
//! - AVFoundation on macOS/iOS
//! - WinRT/SAPI on Windows

use crate::speech::{SpeechRequest, Synth};
use crate::{Result, VoxError};
use log::{debug, error, warn};
use tts::Tts as TtsCrate;

/// Native TTS backend using the tts crate
pub struct NativeSynth {
    /// The tts crate's TTS instance
    tts: TtsCrate,

    /// Language tag of the voice currently selected
    lang: Option<String>,
}

impl NativeSynth {
    /// Create a new native TTS synthesizer
    pub fn new() -> Result<Self> {
        debug!("Creating native TTS backend");

        let tts = TtsCrate::default()
            .map_err(|e| VoxError::Speech(format!("Failed to initialize TTS: {}", e)))?;

        debug!("Native TTS backend created successfully");

        Ok(Self { tts, lang: None })
    }

    /// Scale a multiplier onto the engine's [min, normal, max] range
    fn scale(multiplier: f32, min: f32, normal: f32, max: f32) -> f32 {
        (normal * multiplier).clamp(min, max)
    }

    /// Apply rate, pitch and volume, skipping controls the engine lacks
    fn apply_voice(&mut self, request: &SpeechRequest) -> Result<()> {
        let features = self.tts.supported_features();

        if features.rate {
            let rate = Self::scale(
                request.rate,
                self.tts.min_rate(),
                self.tts.normal_rate(),
                self.tts.max_rate(),
            );
            self.tts
                .set_rate(rate)
                .map_err(|e| VoxError::Speech(format!("Failed to set rate: {}", e)))?;
        }

        if features.pitch {
            let pitch = Self::scale(
                request.pitch,
                self.tts.min_pitch(),
                self.tts.normal_pitch(),
                self.tts.max_pitch(),
            );
            self.tts
                .set_pitch(pitch)
                .map_err(|e| VoxError::Speech(format!("Failed to set pitch: {}", e)))?;
        }

        if features.volume {
            let volume = Self::scale(
                request.volume,
                self.tts.min_volume(),
                self.tts.normal_volume(),
                self.tts.max_volume(),
            );
            self.tts
                .set_volume(volume)
                .map_err(|e| VoxError::Speech(format!("Failed to set volume: {}", e)))?;
        }

        if features.voice && self.lang.as_deref() != Some(request.lang.as_str()) {
            self.select_voice(&request.lang);
            self.lang = Some(request.lang.clone());
        }

        Ok(())
    }

    /// Pick the first voice whose language matches the tag's primary subtag
    fn select_voice(&mut self, lang: &str) {
        let primary = lang.split('-').next().unwrap_or(lang).to_lowercase();

        let voices = match self.tts.voices() {
            Ok(voices) => voices,
            Err(e) => {
                warn!("Failed to list voices: {}", e);
                return;
            }
        };

        let voice = voices.iter().find(|v| {
            let tag = v.language().as_str().to_lowercase();
            tag == lang.to_lowercase() || tag.split('-').next() == Some(primary.as_str())
        });

        match voice {
            Some(voice) => {
                debug!("Selecting voice {} for {}", voice.name(), lang);
                if let Err(e) = self.tts.set_voice(voice) {
                    warn!("Failed to set voice: {}", e);
                }
            }
            None => warn!("No voice for language {} (have {} voices)", lang, voices.len()),
        }
    }
}

impl Synth for NativeSynth {
    fn speak(&mut self, request: &SpeechRequest) -> Result<()> {
        if request.text.is_empty() {
            return Ok(());
        }

        self.apply_voice(request)?;

        debug!("Speaking: {}", request.text);
        self.tts.speak(request.text.as_str(), true).map_err(|e| {
            error!("Failed to speak: {}", e);
            VoxError::Speech(format!("Speak failed: {}", e))
        })?;

        Ok(())
    }

    fn cancel(&mut self) -> Result<()> {
        debug!("Canceling speech");
        self.tts.stop().map_err(|e| {
            error!("Failed to cancel speech: {}", e);
            VoxError::Speech(format!("Cancel failed: {}", e))
        })?;

        Ok(())
    }

    fn is_speaking(&self) -> Option<bool> {
        if !self.tts.supported_features().is_speaking {
            return None;
        }
        self.tts.is_speaking().ok()
    }
}
