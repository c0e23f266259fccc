//! Network gateway
//!
//! `client::Gateway` talks to the questionnaire backend on behalf of the
//! form shell. `relay` is the same-origin reverse proxy that forwards
//! `/api/proxy/...` to the real backend.

pub mod client;
pub mod relay;

pub use client::Gateway;
pub use relay::{create_router, run_relay, run_relay_with_listener};

use crate::form::{FieldSchema, SubmissionPayload};
use crate::Result;
use std::str::FromStr;
use std::time::Duration;

/// What to do when the question list cannot be fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackPolicy {
    /// Serve the bundled question set
    #[default]
    Static,
    /// Surface the failure to the form shell
    Error,
}

impl FromStr for FallbackPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "static" => Ok(FallbackPolicy::Static),
            "error" => Ok(FallbackPolicy::Error),
            other => Err(format!("unknown fallback policy: {}", other)),
        }
    }
}

/// Gateway settings, passed in at construction
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    /// Backend base URL; `None` selects the bundled question set
    pub base_url: Option<String>,
    /// The hosting surface is secure, so plaintext backends are refused
    pub require_secure_transport: bool,
    pub fallback: FallbackPolicy,
    pub form_id: u32,
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            require_secure_transport: false,
            fallback: FallbackPolicy::Static,
            form_id: 1,
            timeout: Duration::from_secs(30),
        }
    }
}

impl GatewayConfig {
    /// Config pointing at a live backend
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into().trim_end_matches('/').to_string()),
            ..Self::default()
        }
    }

    pub fn questions_path(&self) -> String {
        format!("/api/form/{}/questions/", self.form_id)
    }

    pub fn submit_path(&self) -> String {
        format!("/api/form/{}/submit/", self.form_id)
    }
}

/// Relay settings
#[derive(Debug, Clone, PartialEq)]
pub struct RelayConfig {
    /// Address the relay listens on
    pub listen: String,
    /// Backend every proxied request is forwarded to
    pub upstream: String,
    pub timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:3000".to_string(),
            upstream: "http://127.0.0.1:8000".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// The backend seen by the form shell
#[allow(async_fn_in_trait)]
pub trait FormBackend {
    /// Question list for the configured form
    async fn fetch_questions(&self) -> Result<Vec<FieldSchema>>;

    /// Send the answers; any error is a submit failure
    async fn submit_answers(&self, payload: &SubmissionPayload) -> Result<()>;
}
