//! Blocking HTTP client for a local Ollama instance.
//!
//! Two operations only: a fast liveness probe that gates vision mode at
//! startup, and a single image-conditioned generation call with JSON output
//! forced. Everything else about the vision model is outside this crate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Liveness-probe timeout. The probe gates vision mode before any source is
/// processed, so it must answer quickly.
const PROBE_TIMEOUT_SECS: u64 = 2;

/// Generation timeout. Vision inference on a full poster page is slow.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

#[derive(Error, Debug)]
pub enum OllamaError {
    #[error("Vision service is not reachable at {0}")]
    NotReachable(String),

    #[error("Vision service returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Response parsing failed: {0}")]
    ResponseParsing(String),
}

/// Boundary to the vision collaborator.
pub trait VisionClient: Send + Sync {
    /// Whether the service answers its liveness probe.
    fn is_reachable(&self) -> bool;

    /// One blocking generation call with a base64-encoded image attached.
    /// Returns the raw response body text.
    fn generate_with_image(
        &self,
        model: &str,
        prompt: &str,
        image_b64: &str,
    ) -> Result<String, OllamaError>;
}

pub struct OllamaClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        }
    }

    /// Default local instance with the generation timeout.
    pub fn default_local() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Request body for Ollama /api/generate with an image payload.
/// `format: "json"` asks the model for a bare JSON object body.
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    images: Vec<&'a str>,
    stream: bool,
    format: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl VisionClient for OllamaClient {
    fn is_reachable(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        self.client
            .get(&url)
            .timeout(std::time::Duration::from_secs(PROBE_TIMEOUT_SECS))
            .send()
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn generate_with_image(
        &self,
        model: &str,
        prompt: &str,
        image_b64: &str,
    ) -> Result<String, OllamaError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model,
            prompt,
            images: vec![image_b64],
            stream: false,
            format: "json",
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                OllamaError::NotReachable(self.base_url.clone())
            } else if e.is_timeout() {
                OllamaError::Timeout(self.timeout_secs)
            } else {
                OllamaError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(OllamaError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| OllamaError::ResponseParsing(e.to_string()))?;

        Ok(parsed.response)
    }
}

/// Mock vision client for testing, with a configurable response or failure mode.
pub struct MockVisionClient {
    reachable: bool,
    response: Result<String, u16>,
}

impl MockVisionClient {
    pub fn new(response: &str) -> Self {
        Self {
            reachable: true,
            response: Ok(response.to_string()),
        }
    }

    /// Probe fails; generation is never attempted by a correct caller.
    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            response: Err(503),
        }
    }

    /// Probe succeeds but every generation call returns the given HTTP status.
    pub fn failing(status: u16) -> Self {
        Self {
            reachable: true,
            response: Err(status),
        }
    }
}

impl VisionClient for MockVisionClient {
    fn is_reachable(&self) -> bool {
        self.reachable
    }

    fn generate_with_image(
        &self,
        _model: &str,
        _prompt: &str,
        _image_b64: &str,
    ) -> Result<String, OllamaError> {
        match &self.response {
            Ok(body) => Ok(body.clone()),
            Err(status) => Err(OllamaError::Api {
                status: *status,
                body: "mock failure".into(),
            }),
        }
    }
}
