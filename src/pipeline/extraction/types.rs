use serde::{Deserialize, Serialize};

use super::ExtractionError;

/// Content fields produced by one extraction strategy for one source.
/// A candidate record is assembled from this plus the asset reference and
/// provenance by the import orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateContent {
    pub title: String,
    pub authors: Vec<String>,
    pub tags: Vec<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
}

/// One raw poster source as seen by the extraction chain.
#[derive(Debug, Clone)]
pub struct PosterSource {
    pub id: String,
    pub file_name: String,
    /// Filename without extension, the override-file key.
    pub stem: String,
    pub pdf_bytes: Vec<u8>,
    /// Rendered display asset, when rasterization succeeded.
    pub rendered_png: Option<Vec<u8>>,
}

/// Rasterizes the first page of a poster document to a PNG display asset.
pub trait PosterRenderer: Send + Sync {
    fn render_poster(&self, pdf_bytes: &[u8], dpi: u32) -> Result<Vec<u8>, ExtractionError>;
}

/// Extracts the raw text layer of a poster document.
pub trait TextSource: Send + Sync {
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// One strategy for deriving content fields from a source.
///
/// Strategies are tried in priority order by the extraction chain; an `Err`
/// is a recoverable failure that falls through to the next strategy.
pub trait ContentExtractor: Send + Sync {
    /// Provenance tag recorded on records this strategy produced.
    fn source_tag(&self) -> &'static str;

    fn extract(&self, source: &PosterSource) -> Result<CandidateContent, ExtractionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_content_uses_abstract_json_name() {
        let content = CandidateContent {
            title: "T".into(),
            authors: vec!["A".into()],
            tags: vec!["t".into()],
            abstract_text: "body".into(),
        };
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["abstract"], "body");
    }
}
