//! Speech output: host synthesizer plus the single-slot narrator

pub mod synth;
pub mod narrator;
pub mod backends;

pub use synth::{Synth, SpeechRequest, VoiceSettings, create_synth};
pub use narrator::{Narrator, NarratorState, SpeechEvent};
