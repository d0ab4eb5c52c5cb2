//! Ordered fallback chain over extraction strategies.
//!
//! Priority order: vision (when enabled), text heuristics, synthesized
//! default. The first success wins; every failure is a logged, recoverable
//! event that falls through to the next strategy.

use super::heuristics::{synthesized_title, TextHeuristicExtraction};
use super::types::{CandidateContent, ContentExtractor, PosterSource};
use super::vision::VisionExtraction;
use super::ExtractionError;

/// Result of running the chain: content plus the tag of the strategy that
/// produced it, recorded into the candidate's provenance.
#[derive(Debug, Clone)]
pub struct ExtractedContent {
    pub content: CandidateContent,
    pub source_tag: &'static str,
}

pub struct ExtractionChain {
    extractors: Vec<Box<dyn ContentExtractor>>,
}

impl ExtractionChain {
    /// The standard chain: vision (if enabled) → text heuristics → default.
    pub fn standard(vision: Option<VisionExtraction>, text: TextHeuristicExtraction) -> Self {
        let mut extractors: Vec<Box<dyn ContentExtractor>> = Vec::new();
        if let Some(vision) = vision {
            extractors.push(Box::new(vision));
        }
        extractors.push(Box::new(text));
        extractors.push(Box::new(DefaultExtraction));
        Self { extractors }
    }

    /// A chain over an explicit strategy list, mostly for tests.
    pub fn with_extractors(extractors: Vec<Box<dyn ContentExtractor>>) -> Self {
        Self { extractors }
    }

    /// Try each strategy in order; the first success wins. Returns `None`
    /// only when every strategy fails; the caller skips the source.
    pub fn extract(&self, source: &PosterSource) -> Option<ExtractedContent> {
        for extractor in &self.extractors {
            match extractor.extract(source) {
                Ok(content) => {
                    return Some(ExtractedContent {
                        content,
                        source_tag: extractor.source_tag(),
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        poster_id = %source.id,
                        strategy = extractor.source_tag(),
                        error = %err,
                        "Extraction strategy failed, trying next"
                    );
                }
            }
        }
        tracing::warn!(poster_id = %source.id, "All extraction strategies failed");
        None
    }
}

/// Last-resort strategy: synthesized title, empty collections. Used only
/// when the higher-priority strategies are unavailable or failed.
pub struct DefaultExtraction;

impl ContentExtractor for DefaultExtraction {
    fn source_tag(&self) -> &'static str {
        "default"
    }

    fn extract(&self, source: &PosterSource) -> Result<CandidateContent, ExtractionError> {
        Ok(CandidateContent {
            title: synthesized_title(&source.id),
            authors: Vec::new(),
            tags: Vec::new(),
            abstract_text: String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::pipeline::extraction::ollama::MockVisionClient;
    use crate::pipeline::extraction::pdf_text::{FailingTextSource, MockTextSource};

    fn source() -> PosterSource {
        PosterSource {
            id: "poster_001".into(),
            file_name: "demo.pdf".into(),
            stem: "demo".into(),
            pdf_bytes: b"fake pdf".to_vec(),
            rendered_png: Some(b"fake png".to_vec()),
        }
    }

    const VISION_BODY: &str = r#"{
        "title": "Vision Title",
        "authors": ["V. Author"],
        "tags": ["computer-vision"],
        "abstract": "Seen by the model."
    }"#;

    fn text_strategy(text: &str) -> TextHeuristicExtraction {
        TextHeuristicExtraction::new(Arc::new(MockTextSource::new(text)))
    }

    #[test]
    fn vision_wins_when_it_succeeds() {
        let vision = VisionExtraction::new(
            Arc::new(MockVisionClient::new(VISION_BODY)),
            "gemma3:latest".into(),
        );
        let chain = ExtractionChain::standard(Some(vision), text_strategy("Text Title Here"));

        let extracted = chain.extract(&source()).unwrap();
        assert_eq!(extracted.source_tag, "vision_import");
        assert_eq!(extracted.content.title, "Vision Title");
    }

    #[test]
    fn non_json_vision_body_falls_back_to_text() {
        let vision = VisionExtraction::new(
            Arc::new(MockVisionClient::new("<html>not json</html>")),
            "gemma3:latest".into(),
        );
        let chain = ExtractionChain::standard(
            Some(vision),
            text_strategy("A Perfectly Usable Poster Title"),
        );

        let extracted = chain.extract(&source()).unwrap();
        assert_eq!(extracted.source_tag, "pdf_import");
        assert_eq!(extracted.content.title, "A Perfectly Usable Poster Title");
    }

    #[test]
    fn vision_http_error_falls_back_to_text() {
        let vision = VisionExtraction::new(
            Arc::new(MockVisionClient::failing(500)),
            "gemma3:latest".into(),
        );
        let chain = ExtractionChain::standard(
            Some(vision),
            text_strategy("A Perfectly Usable Poster Title"),
        );

        let extracted = chain.extract(&source()).unwrap();
        assert_eq!(extracted.source_tag, "pdf_import");
    }

    #[test]
    fn text_failure_falls_back_to_default() {
        let chain = ExtractionChain::standard(
            None,
            TextHeuristicExtraction::new(Arc::new(FailingTextSource)),
        );

        let extracted = chain.extract(&source()).unwrap();
        assert_eq!(extracted.source_tag, "default");
        assert_eq!(extracted.content.title, "Research Poster poster_001");
        assert!(extracted.content.authors.is_empty());
        assert!(extracted.content.tags.is_empty());
    }

    #[test]
    fn chain_without_vision_uses_text_directly() {
        let chain = ExtractionChain::standard(None, text_strategy("Plain Text Poster Title"));
        let extracted = chain.extract(&source()).unwrap();
        assert_eq!(extracted.source_tag, "pdf_import");
    }

    #[test]
    fn empty_chain_yields_none() {
        let chain = ExtractionChain::with_extractors(vec![]);
        assert!(chain.extract(&source()).is_none());
    }

    #[test]
    fn default_extraction_is_infallible() {
        let content = DefaultExtraction.extract(&source()).unwrap();
        assert_eq!(content.title, "Research Poster poster_001");
        assert!(content.abstract_text.is_empty());
    }
}
