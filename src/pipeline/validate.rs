//! Read-only validation of a poster store and its persisted representations.
//!
//! Validation never mutates anything and never crashes on a gap: each check
//! yields typed violations. Structural violations block persistence; a
//! missing display asset is advisory, since metadata may land ahead of asset
//! generation, but the gap must be surfaced.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;

use crate::config::StorePaths;
use crate::models::PosterRecord;
use crate::store::{load_store, StoreError};

/// External asset store queried for rendered display assets.
pub trait AssetStore {
    fn has_asset(&self, id: &str) -> bool;
}

/// Directory-backed asset store: one `<id>.png` per poster.
pub struct DirAssetStore {
    dir: PathBuf,
}

impl DirAssetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl AssetStore for DirAssetStore {
    fn has_asset(&self, id: &str) -> bool {
        self.dir.join(format!("{id}.png")).is_file()
    }
}

/// In-memory asset store for tests.
#[derive(Default)]
pub struct MockAssetStore {
    ids: HashSet<String>,
}

impl MockAssetStore {
    pub fn with_assets(ids: &[&str]) -> Self {
        Self {
            ids: ids.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl AssetStore for MockAssetStore {
    fn has_asset(&self, id: &str) -> bool {
        self.ids.contains(id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Violation {
    MissingField { id: String, field: &'static str },
    DuplicateId { id: String },
    MissingAsset { id: String, asset: String },
    MissingStore { path: String },
    RepresentationMismatch { detail: String },
}

impl Violation {
    /// Whether this violation must block persistence. A missing display
    /// asset is the one advisory case.
    pub fn is_blocking(&self) -> bool {
        !matches!(self, Violation::MissingAsset { .. })
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingField { id, field } => {
                write!(f, "poster {id}: required field '{field}' is missing or empty")
            }
            Violation::DuplicateId { id } => write!(f, "duplicate poster id '{id}'"),
            Violation::MissingAsset { id, asset } => {
                write!(f, "poster {id}: display asset '{asset}' not found")
            }
            Violation::MissingStore { path } => write!(f, "store file missing: {path}"),
            Violation::RepresentationMismatch { detail } => {
                write!(f, "store representations diverge: {detail}")
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn has_blocking(&self) -> bool {
        self.violations.iter().any(Violation::is_blocking)
    }

    pub fn blocking_count(&self) -> usize {
        self.violations.iter().filter(|v| v.is_blocking()).count()
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.violations.extend(other.violations);
    }
}

/// Required-field completeness for one record.
pub fn validate_record(record: &PosterRecord) -> Vec<Violation> {
    let mut violations = Vec::new();
    let missing = |field| Violation::MissingField {
        id: record.id.clone(),
        field,
    };

    if record.id.trim().is_empty() {
        violations.push(missing("id"));
    }
    if record.title.trim().is_empty() {
        violations.push(missing("title"));
    }
    if record.authors.is_empty() {
        violations.push(missing("authors"));
    }
    if record.tags.is_empty() {
        violations.push(missing("tags"));
    }
    if record.abstract_text.trim().is_empty() {
        violations.push(missing("abstract"));
    }
    if record.poster_image.trim().is_empty() {
        violations.push(missing("poster_image"));
    }
    violations
}

/// Validate one store: field completeness, id uniqueness, asset existence.
pub fn validate_store(posters: &[PosterRecord], assets: &dyn AssetStore) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut seen: HashSet<&str> = HashSet::new();

    for record in posters {
        report.violations.extend(validate_record(record));

        if !seen.insert(record.id.as_str()) {
            report.violations.push(Violation::DuplicateId {
                id: record.id.clone(),
            });
        }

        if !assets.has_asset(&record.id) {
            report.violations.push(Violation::MissingAsset {
                id: record.id.clone(),
                asset: format!("{}.png", record.id),
            });
        }
    }

    report
}

/// Cross-check the two persisted representations: same id set, equal
/// content + curated fields. The flat store never carries provenance, so the
/// comparison ignores it.
pub fn validate_representations(
    structured: &[PosterRecord],
    flat: &[PosterRecord],
) -> ValidationReport {
    let mut report = ValidationReport::default();

    let structured_by_id: HashMap<&str, &PosterRecord> =
        structured.iter().map(|p| (p.id.as_str(), p)).collect();
    let flat_by_id: HashMap<&str, &PosterRecord> =
        flat.iter().map(|p| (p.id.as_str(), p)).collect();

    for record in structured {
        match flat_by_id.get(record.id.as_str()) {
            None => report.violations.push(Violation::RepresentationMismatch {
                detail: format!("poster {} present only in the structured store", record.id),
            }),
            Some(counterpart) => {
                if !record.content_eq(counterpart) {
                    report.violations.push(Violation::RepresentationMismatch {
                        detail: format!("poster {} differs between representations", record.id),
                    });
                }
            }
        }
    }

    for record in flat {
        if !structured_by_id.contains_key(record.id.as_str()) {
            report.violations.push(Violation::RepresentationMismatch {
                detail: format!("poster {} present only in the flat store", record.id),
            });
        }
    }

    report
}

/// Standalone validation over the persisted project: both representations
/// must exist, pass the store checks, and agree with each other.
pub fn validate_project(paths: &StorePaths) -> Result<ValidationReport, StoreError> {
    let mut report = ValidationReport::default();
    let now = Utc::now();

    let structured_path = paths.structured_store();
    let flat_path = paths.flat_store();
    for path in [&structured_path, &flat_path] {
        if !path.exists() {
            report.violations.push(Violation::MissingStore {
                path: path.display().to_string(),
            });
        }
    }
    if !report.is_clean() {
        return Ok(report);
    }

    let structured = load_store(&structured_path, now)?;
    let flat = load_store(&flat_path, now)?;

    let assets = DirAssetStore::new(paths.assets_dir());
    report.merge(validate_store(&structured.posters, &assets));
    report.merge(validate_representations(&structured.posters, &flat.posters));

    tracing::info!(
        posters = structured.posters.len(),
        violations = report.violations.len(),
        "Validation complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Provenance;
    use crate::store::{save_store, PosterStore};

    fn record(id: &str) -> PosterRecord {
        PosterRecord {
            id: id.into(),
            title: "A Title".into(),
            authors: vec!["Jane Doe".into()],
            tags: vec!["research".into()],
            abstract_text: "An abstract.".into(),
            poster_image: format!("assets/posters/{id}.png"),
            faq: None,
            booth_id: None,
            room: None,
            related_links: None,
            keywords: None,
            contact_email: None,
            metadata: Some(Provenance::default()),
        }
    }

    #[test]
    fn complete_record_passes() {
        assert!(validate_record(&record("poster_001")).is_empty());
    }

    #[test]
    fn missing_abstract_fails_validation() {
        let mut r = record("poster_001");
        r.abstract_text = "  ".into();
        let violations = validate_record(&r);
        assert_eq!(
            violations,
            vec![Violation::MissingField {
                id: "poster_001".into(),
                field: "abstract"
            }]
        );
    }

    #[test]
    fn empty_collections_are_missing_fields() {
        let mut r = record("poster_001");
        r.authors.clear();
        r.tags.clear();
        let violations = validate_record(&r);
        assert_eq!(violations.len(), 2);
        assert!(violations.iter().all(Violation::is_blocking));
    }

    #[test]
    fn duplicate_ids_are_flagged() {
        let posters = vec![record("poster_001"), record("poster_001")];
        let assets = MockAssetStore::with_assets(&["poster_001"]);
        let report = validate_store(&posters, &assets);
        assert!(report
            .violations
            .contains(&Violation::DuplicateId { id: "poster_001".into() }));
        assert!(report.has_blocking());
    }

    #[test]
    fn missing_asset_is_advisory() {
        let posters = vec![record("poster_001")];
        let assets = MockAssetStore::default();
        let report = validate_store(&posters, &assets);
        assert_eq!(report.violations.len(), 1);
        assert!(!report.has_blocking());
        assert!(matches!(
            report.violations[0],
            Violation::MissingAsset { .. }
        ));
    }

    #[test]
    fn representations_with_equal_content_pass() {
        let structured = vec![record("poster_001")];
        let flat = vec![record("poster_001").without_provenance()];
        assert!(validate_representations(&structured, &flat).is_clean());
    }

    #[test]
    fn id_set_mismatch_is_flagged_both_directions() {
        let structured = vec![record("poster_001")];
        let flat = vec![record("poster_002").without_provenance()];
        let report = validate_representations(&structured, &flat);
        assert_eq!(report.violations.len(), 2);
        assert!(report.has_blocking());
    }

    #[test]
    fn content_divergence_is_flagged() {
        let structured = vec![record("poster_001")];
        let mut divergent = record("poster_001").without_provenance();
        divergent.title = "Another Title".into();
        let report = validate_representations(&structured, &[divergent]);
        assert!(matches!(
            report.violations[0],
            Violation::RepresentationMismatch { .. }
        ));
    }

    #[test]
    fn validate_project_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = StorePaths::new(dir.path());
        let report = validate_project(&paths).unwrap();
        assert_eq!(report.violations.len(), 2);
        assert!(report.has_blocking());
    }

    #[test]
    fn validate_project_accepts_committed_store_with_assets() {
        let dir = tempfile::tempdir().unwrap();
        let paths = StorePaths::new(dir.path());
        let store = PosterStore::new(vec![record("poster_001")], Utc::now());
        save_store(&paths, &store).unwrap();

        let assets_dir = paths.assets_dir();
        std::fs::create_dir_all(&assets_dir).unwrap();
        std::fs::write(assets_dir.join("poster_001.png"), b"png").unwrap();

        let report = validate_project(&paths).unwrap();
        assert!(report.is_clean(), "{:?}", report.violations);
    }

    #[test]
    fn validate_project_flags_missing_asset_as_advisory() {
        let dir = tempfile::tempdir().unwrap();
        let paths = StorePaths::new(dir.path());
        let store = PosterStore::new(vec![record("poster_001")], Utc::now());
        save_store(&paths, &store).unwrap();

        let report = validate_project(&paths).unwrap();
        assert!(!report.is_clean());
        assert!(!report.has_blocking());
    }

    #[test]
    fn violations_render_as_sentences() {
        let violations = vec![
            Violation::MissingField {
                id: "poster_001".into(),
                field: "abstract",
            },
            Violation::DuplicateId {
                id: "poster_001".into(),
            },
            Violation::MissingAsset {
                id: "poster_001".into(),
                asset: "poster_001.png".into(),
            },
        ];
        for v in violations {
            assert!(v.to_string().contains("poster_001"));
        }
    }
}
