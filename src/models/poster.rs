use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One question/answer pair in a poster's curated FAQ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

/// Provenance block tracking where a record came from and when.
///
/// Serialized under the `metadata` key of the structured store; the flat
/// store never carries it. `created_at` is immutable once set and never
/// exceeds `updated_at`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    /// Tag identifying the extraction method: `vision_import`, `pdf_import`,
    /// `default`, or `unknown`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// The canonical unit of the metadata store.
///
/// Content fields (`title`, `authors`, `tags`, `abstract`, `poster_image`)
/// are machine-written on every import. Curated fields are operator-owned:
/// they are hand-edited after import and a merge preserves them unless a
/// candidate explicitly carries a replacement, which is logged, never silent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosterRecord {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    /// Set semantics: membership matters, order does not.
    pub tags: Vec<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// Relative path of the rendered display asset.
    pub poster_image: String,

    // Curated fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faq: Option<Vec<FaqEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booth_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_links: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Provenance>,
}

impl PosterRecord {
    /// Copy with the provenance block stripped, the shape written to the
    /// flat store.
    pub fn without_provenance(&self) -> PosterRecord {
        let mut record = self.clone();
        record.metadata = None;
        record
    }

    /// Equality over content + curated fields, ignoring provenance.
    /// This is the comparison the cross-representation check uses.
    pub fn content_eq(&self, other: &PosterRecord) -> bool {
        self.without_provenance() == other.without_provenance()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.metadata.as_ref().and_then(|m| m.created_at)
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.metadata.as_ref().and_then(|m| m.updated_at)
    }
}
