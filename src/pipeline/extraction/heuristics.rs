//! Text-heuristic extraction: content fields from a poster's raw text layer.
//!
//! Always available as the fallback behind vision extraction. Posters are not
//! structured documents, so everything here is a best-effort scan over early
//! lines: boilerplate gets skipped, the first plausible line wins, and every
//! field has a synthesized last resort so the strategy itself never fails on
//! readable text.

use std::sync::Arc;

use regex::Regex;

use super::types::{CandidateContent, ContentExtractor, PosterSource, TextSource};
use super::ExtractionError;

/// How many leading lines the title scan considers.
const TITLE_SCAN_LINES: usize = 10;
/// Acceptable title length band, in characters.
const TITLE_MIN_LEN: usize = 10;
const TITLE_MAX_LEN: usize = 150;

/// Author scan window: lines 2 through 5.
const AUTHOR_WINDOW: usize = 4;
const MAX_AUTHORS: usize = 3;

/// Abstract accumulation caps.
const ABSTRACT_FOLLOW_LINES: usize = 9;
const ABSTRACT_TARGET_LEN: usize = 300;
const ABSTRACT_FALLBACK_MAX_LEN: usize = 400;

const MAX_TAGS: usize = 5;

/// Placeholder when no abstract-like text exists at all.
const FALLBACK_ABSTRACT: &str = "Research poster content extracted from PDF.";

/// Keyword → tag table, matched case-insensitively as substrings over the
/// whole text.
const TAG_KEYWORDS: &[(&str, &str)] = &[
    ("ai", "artificial-intelligence"),
    ("machine learning", "machine-learning"),
    ("deep learning", "deep-learning"),
    ("neural network", "neural-networks"),
    ("robot", "robotics"),
    ("iot", "iot"),
    ("edge", "edge-computing"),
    ("security", "security"),
    ("privacy", "privacy"),
    ("healthcare", "healthcare"),
    ("sustainable", "sustainability"),
    ("quantum", "quantum-computing"),
    ("federated", "federated-learning"),
    ("computer vision", "computer-vision"),
    ("nlp", "nlp"),
];

/// Tags assigned when nothing in the table matches.
const DEFAULT_TAGS: [&str; 2] = ["research", "computer-science"];

/// Title synthesized when a source yields no usable lines.
pub fn synthesized_title(poster_id: &str) -> String {
    format!("Research Poster {poster_id}")
}

/// Derive all four content fields from raw extracted text.
pub fn content_from_text(text: &str, poster_id: &str) -> CandidateContent {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    CandidateContent {
        title: extract_title(&lines, poster_id),
        authors: extract_authors(&lines),
        tags: extract_tags(text),
        abstract_text: extract_abstract(&lines),
    }
}

/// Title heuristic over the leading lines.
///
/// Skips institutional boilerplate, page numbers, bare numerals, contact
/// lines and URLs; accepts the first remaining line in the length band that
/// carries at least one uppercase character. Falls back to the first long
/// enough early line (truncated), then to a synthesized title.
pub fn extract_title(lines: &[&str], poster_id: &str) -> String {
    if lines.is_empty() {
        return synthesized_title(poster_id);
    }

    let boilerplate = Regex::new(
        r"(?i)rise.*research.*institute|university|department|page \d+|^\d+$",
    )
    .expect("static regex");

    for line in lines.iter().take(TITLE_SCAN_LINES) {
        if boilerplate.is_match(line) {
            continue;
        }
        if char_len(line) < TITLE_MIN_LEN
            || line.contains('@')
            || line.to_lowercase().contains("http")
        {
            continue;
        }
        if char_len(line) <= TITLE_MAX_LEN && line.chars().any(char::is_uppercase) {
            return line.to_string();
        }
    }

    for line in lines.iter().take(5) {
        if char_len(line) > TITLE_MIN_LEN {
            return truncate_ellipsis(line, TITLE_MAX_LEN);
        }
    }

    synthesized_title(poster_id)
}

/// Author heuristic over an early-line window.
///
/// A line showing two or more capitalized word groups is split on commas,
/// the word "and", and multi-space runs. Capped at three names; the sentinel
/// is used when nothing matches.
pub fn extract_authors(lines: &[&str]) -> Vec<String> {
    let name_shape = Regex::new(r"[A-Z][a-z]+.*[A-Z][a-z]+").expect("static regex");
    let separators = Regex::new(r",|\band\b|\s{2,}").expect("static regex");

    let mut authors: Vec<String> = Vec::new();
    for line in lines.iter().skip(1).take(AUTHOR_WINDOW) {
        if name_shape.is_match(line) && char_len(line) < 100 {
            authors.extend(
                separators
                    .split(line)
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(String::from),
            );
        }
    }

    if authors.is_empty() {
        return vec!["Unknown Author".to_string()];
    }
    authors.truncate(MAX_AUTHORS);
    authors
}

/// Abstract heuristic: accumulate lines after an "abstract"/"summary"/
/// "introduction" marker, else fall back to the first paragraph-like line.
pub fn extract_abstract(lines: &[&str]) -> String {
    const SECTION_KEYWORDS: [&str; 3] = ["abstract", "summary", "introduction"];

    let mut section = String::new();
    for (i, line) in lines.iter().enumerate() {
        let lower = line.to_lowercase();
        if SECTION_KEYWORDS.iter().any(|k| lower.contains(k)) {
            let mut collected: Vec<&str> = Vec::new();
            for follow in lines.iter().skip(i + 1).take(ABSTRACT_FOLLOW_LINES) {
                if char_len(follow) > 20 {
                    collected.push(follow);
                }
                if char_len(&collected.join(" ")) > ABSTRACT_TARGET_LEN {
                    break;
                }
            }
            section = collected.join(" ");
            break;
        }
    }
    if !section.is_empty() {
        return section;
    }

    for line in lines.iter().skip(2) {
        if char_len(line) > 100 {
            return truncate_ellipsis(line, ABSTRACT_FALLBACK_MAX_LEN);
        }
    }

    FALLBACK_ABSTRACT.to_string()
}

/// Tag heuristic: keyword-table membership over the whole text, deduplicated
/// and capped; the default pair when nothing matches.
pub fn extract_tags(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut tags: Vec<String> = Vec::new();
    for (keyword, tag) in TAG_KEYWORDS {
        if lower.contains(keyword) && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }

    if tags.is_empty() {
        return DEFAULT_TAGS.iter().map(|t| t.to_string()).collect();
    }
    tags.truncate(MAX_TAGS);
    tags
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn truncate_ellipsis(s: &str, max_chars: usize) -> String {
    if char_len(s) <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

/// The text-heuristic extraction strategy: raw text layer in, content out.
pub struct TextHeuristicExtraction {
    source: Arc<dyn TextSource>,
}

impl TextHeuristicExtraction {
    pub fn new(source: Arc<dyn TextSource>) -> Self {
        Self { source }
    }
}

impl ContentExtractor for TextHeuristicExtraction {
    fn source_tag(&self) -> &'static str {
        "pdf_import"
    }

    fn extract(&self, source: &PosterSource) -> Result<CandidateContent, ExtractionError> {
        let text = self.source.extract_text(&source.pdf_bytes)?;
        let content = content_from_text(&text, &source.id);
        tracing::info!(
            poster_id = %source.id,
            title = %content.title,
            authors = content.authors.len(),
            tags = content.tags.len(),
            "Text-heuristic extraction complete"
        );
        Ok(content)
    }
}
