pub mod chain;
pub mod heuristics;
pub mod ollama;
pub mod pdf_text;
pub mod renderer;
pub mod types;
pub mod vision;

pub use chain::*;
pub use types::*;

use thiserror::Error;

use ollama::OllamaError;

/// Recoverable extraction failures. Each one drives fallback to the next
/// strategy (or skips the source); none of them aborts the batch.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("Poster rendering failed: {0}")]
    Rendering(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Vision service error: {0}")]
    Vision(#[from] OllamaError),

    #[error("Vision response did not match the expected shape: {0}")]
    VisionShape(String),

    #[error("No rendered image available for vision extraction")]
    NoRenderedImage,
}
