//! Vision extraction strategy: poster image to content fields via a local
//! vision model.
//!
//! Highest-priority strategy in the chain. It succeeds only if the model's
//! body parses as the expected JSON object with all four content fields;
//! anything else (HTTP error, truncated body, missing field) is a recoverable
//! failure and the chain falls back to text heuristics.

use std::sync::Arc;

use base64::Engine as _;
use serde::Deserialize;

use super::ollama::VisionClient;
use super::types::{CandidateContent, ContentExtractor, PosterSource};
use super::ExtractionError;

/// Fixed structured-output prompt. The request also sets `format: "json"`,
/// but models still occasionally wrap or truncate output, so the response is
/// parsed strictly.
const VISION_PROMPT: &str = r#"You are analyzing a research poster image. Extract the following information in JSON format:

{
  "title": "The main title of the poster",
  "authors": ["Author 1", "Author 2"],
  "tags": ["topic1", "topic2", "topic3"],
  "abstract": "A brief summary (2-3 sentences)"
}

Rules:
- For title: Extract ONLY the main title, not institution names
- For authors: List all author names you can clearly read
- For tags: Identify 3-5 key research topics/technologies
- For abstract: Summarize the main contribution in 2-3 sentences
- Return ONLY valid JSON

Analyze this poster:"#;

pub struct VisionExtraction {
    client: Arc<dyn VisionClient>,
    model: String,
}

impl VisionExtraction {
    pub fn new(client: Arc<dyn VisionClient>, model: String) -> Self {
        Self { client, model }
    }
}

impl ContentExtractor for VisionExtraction {
    fn source_tag(&self) -> &'static str {
        "vision_import"
    }

    fn extract(&self, source: &PosterSource) -> Result<CandidateContent, ExtractionError> {
        let png = source
            .rendered_png
            .as_deref()
            .ok_or(ExtractionError::NoRenderedImage)?;

        let image_b64 = base64::engine::general_purpose::STANDARD.encode(png);
        let start = std::time::Instant::now();

        let raw = self
            .client
            .generate_with_image(&self.model, VISION_PROMPT, &image_b64)?;
        let content = parse_vision_response(&raw)?;

        tracing::info!(
            poster_id = %source.id,
            model = %self.model,
            elapsed_ms = %start.elapsed().as_millis(),
            title = %content.title,
            "Vision extraction succeeded"
        );
        Ok(content)
    }
}

/// Parse the model's body into content fields. All four fields must be
/// present with the right shapes; a non-empty title is required.
fn parse_vision_response(raw: &str) -> Result<CandidateContent, ExtractionError> {
    #[derive(Deserialize)]
    struct RawContent {
        title: String,
        authors: Vec<String>,
        tags: Vec<String>,
        #[serde(rename = "abstract")]
        abstract_text: String,
    }

    let parsed: RawContent = serde_json::from_str(raw.trim())
        .map_err(|e| ExtractionError::VisionShape(e.to_string()))?;

    if parsed.title.trim().is_empty() {
        return Err(ExtractionError::VisionShape("empty title".into()));
    }

    Ok(CandidateContent {
        title: parsed.title,
        authors: parsed.authors,
        tags: parsed.tags,
        abstract_text: parsed.abstract_text,
    })
}
