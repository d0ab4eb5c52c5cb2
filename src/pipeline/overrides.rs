//! Operator override file: manual corrections applied to freshly extracted
//! content before the merge.
//!
//! The file maps a source-filename stem to either a bare string (replaces the
//! title only) or a mapping naming any of the four content fields. Curated
//! fields cannot be overridden here; they stay operator-owned in the store.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use super::extraction::types::CandidateContent;

/// One override entry: a bare replacement title, or a partial set of content
/// fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OverrideEntry {
    Title(String),
    Fields(FieldOverrides),
}

/// Partial content-field replacement. Unnamed fields are left untouched;
/// unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldOverrides {
    pub title: Option<String>,
    pub authors: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
}

/// Overrides keyed by source-filename stem.
#[derive(Debug, Default)]
pub struct OverrideMap {
    entries: HashMap<String, OverrideEntry>,
}

impl OverrideMap {
    /// Load the override file. A missing file is an empty map; an unparseable
    /// file is logged and treated as empty rather than aborting the batch.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        let parsed = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|raw| {
                serde_yaml::from_str::<HashMap<String, OverrideEntry>>(&raw)
                    .map_err(|e| e.to_string())
            });

        match parsed {
            Ok(entries) => {
                tracing::info!(
                    count = entries.len(),
                    file = %path.display(),
                    "Loaded overrides"
                );
                Self { entries }
            }
            Err(err) => {
                tracing::warn!(file = %path.display(), error = %err, "Could not load overrides");
                Self::default()
            }
        }
    }

    pub fn from_entries(entries: HashMap<String, OverrideEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply the override for `stem`, if any. Pure transformation: only the
    /// fields the override names are touched; absence of a key is a no-op.
    pub fn apply(&self, stem: &str, mut content: CandidateContent) -> CandidateContent {
        match self.entries.get(stem) {
            None => content,
            Some(OverrideEntry::Title(title)) => {
                tracing::info!(stem, title = %title, "Applied title override");
                content.title = title.clone();
                content
            }
            Some(OverrideEntry::Fields(fields)) => {
                if let Some(title) = &fields.title {
                    tracing::info!(stem, "Applied title override");
                    content.title = title.clone();
                }
                if let Some(authors) = &fields.authors {
                    tracing::info!(stem, "Applied authors override");
                    content.authors = authors.clone();
                }
                if let Some(tags) = &fields.tags {
                    tracing::info!(stem, "Applied tags override");
                    content.tags = tags.clone();
                }
                if let Some(abstract_text) = &fields.abstract_text {
                    tracing::info!(stem, "Applied abstract override");
                    content.abstract_text = abstract_text.clone();
                }
                content
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content() -> CandidateContent {
        CandidateContent {
            title: "Extracted Title".into(),
            authors: vec!["Extracted Author".into()],
            tags: vec!["research".into()],
            abstract_text: "Extracted abstract.".into(),
        }
    }

    fn write_yaml(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("poster_overrides.yaml");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn missing_file_is_empty_map() {
        let map = OverrideMap::load(Path::new("/nonexistent/overrides.yaml"));
        assert!(map.is_empty());
    }

    #[test]
    fn bare_string_replaces_title_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_yaml(&dir, "smart_grids: \"Corrected Poster Title\"\n");
        let map = OverrideMap::load(&path);
        assert_eq!(map.len(), 1);

        let result = map.apply("smart_grids", content());
        assert_eq!(result.title, "Corrected Poster Title");
        assert_eq!(result.authors, vec!["Extracted Author"]);
        assert_eq!(result.abstract_text, "Extracted abstract.");
    }

    #[test]
    fn mapping_replaces_exactly_named_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_yaml(
            &dir,
            "smart_grids:\n  title: Fixed Title\n  authors:\n    - Jane Doe\n    - Alan Smith\n",
        );
        let map = OverrideMap::load(&path);

        let result = map.apply("smart_grids", content());
        assert_eq!(result.title, "Fixed Title");
        assert_eq!(result.authors, vec!["Jane Doe", "Alan Smith"]);
        // Unnamed fields untouched.
        assert_eq!(result.tags, vec!["research"]);
        assert_eq!(result.abstract_text, "Extracted abstract.");
    }

    #[test]
    fn mapping_can_replace_abstract_and_tags() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_yaml(
            &dir,
            "p1:\n  abstract: Hand-written summary.\n  tags: [quantum-computing]\n",
        );
        let map = OverrideMap::load(&path);

        let result = map.apply("p1", content());
        assert_eq!(result.abstract_text, "Hand-written summary.");
        assert_eq!(result.tags, vec!["quantum-computing"]);
        assert_eq!(result.title, "Extracted Title");
    }

    #[test]
    fn unmatched_stem_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_yaml(&dir, "other_poster: New Title\n");
        let map = OverrideMap::load(&path);

        let result = map.apply("smart_grids", content());
        assert_eq!(result, content());
    }

    #[test]
    fn unknown_keys_in_mapping_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_yaml(&dir, "p1:\n  booth_id: B9\n  title: Kept Title\n");
        let map = OverrideMap::load(&path);

        let result = map.apply("p1", content());
        // The curated key has no effect; the named content field applies.
        assert_eq!(result.title, "Kept Title");
    }

    #[test]
    fn unparseable_file_is_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_yaml(&dir, ": : : not yaml [");
        let map = OverrideMap::load(&path);
        assert!(map.is_empty());
    }
}
