//! voxform - voice-assisted accessible questionnaire
//!
//! Fetches a dynamically-defined question list from a backend, renders one
//! widget per question, narrates fields through the host's text-to-speech
//! engine and submits the answers back. Also ships a same-origin relay.

pub mod error;
pub mod form;
pub mod gateway;
pub mod input;
pub mod speech;
pub mod state;

pub use error::{Result, ValidationFailure, VoxError};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "voxform";
