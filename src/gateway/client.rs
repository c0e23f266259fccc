//! HTTP client for the questionnaire backend

use super::{FallbackPolicy, FormBackend, GatewayConfig};
use crate::form::{fallback_questions, FieldSchema, SubmissionPayload};
use crate::{Result, VoxError};
use log::{debug, info, warn};

/// Backend client with a bundled fallback question set
#[derive(Clone)]
pub struct Gateway {
    config: GatewayConfig,
    client: reqwest::Client,
}

impl Gateway {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Base URL to contact, or why none may be used
    fn live_base(&self) -> std::result::Result<&str, String> {
        let Some(base) = self.config.base_url.as_deref() else {
            return Err("no backend configured".to_string());
        };
        if self.config.require_secure_transport && !is_secure_url(base) {
            return Err(format!(
                "refusing insecure backend {} from a secure surface",
                base
            ));
        }
        Ok(base)
    }

    /// Apply the fallback policy to a failed fetch
    fn fall_back(&self, reason: String) -> Result<Vec<FieldSchema>> {
        match self.config.fallback {
            FallbackPolicy::Static => {
                warn!("Using bundled questions: {}", reason);
                Ok(fallback_questions())
            }
            FallbackPolicy::Error => Err(VoxError::Network(reason)),
        }
    }
}

impl FormBackend for Gateway {
    async fn fetch_questions(&self) -> Result<Vec<FieldSchema>> {
        let base = match self.live_base() {
            Ok(base) => base,
            Err(reason) => {
                // Not a network failure: static data is the configured source
                info!("Using bundled questions: {}", reason);
                return Ok(fallback_questions());
            }
        };

        let url = format!("{}{}", base, self.config.questions_path());
        debug!("GET {}", url);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => return self.fall_back(format!("request failed: {}", e)),
        };

        let status = response.status();
        if !status.is_success() {
            return self.fall_back(format!("HTTP error, status: {}", status));
        }

        match response.json::<Vec<FieldSchema>>().await {
            Ok(questions) => {
                info!("Fetched {} questions from {}", questions.len(), base);
                Ok(questions)
            }
            Err(e) => self.fall_back(format!("invalid question list: {}", e)),
        }
    }

    async fn submit_answers(&self, payload: &SubmissionPayload) -> Result<()> {
        let base = self.live_base().map_err(VoxError::Network)?;
        let url = format!("{}{}", base, self.config.submit_path());
        debug!("POST {} ({} answers)", url, payload.answers.len());

        let response = self.client.post(&url).json(payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(VoxError::Network(format!(
                "Backend rejected the answers, status: {}",
                status
            )));
        }

        info!("Answers submitted ({})", status);
        Ok(())
    }
}

/// Only `https` counts as secure transport
pub fn is_secure_url(base: &str) -> bool {
    url::Url::parse(base)
        .map(|u| u.scheme() == "https")
        .unwrap_or(false)
}
