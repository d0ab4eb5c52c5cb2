//! Import orchestrator: sequences extraction, overrides, merge, validation
//! and the two-file commit over a batch of poster sources.
//!
//! Failure discipline: a single source's failure is recoverable (skipped,
//! logged, counted); configuration problems are fatal before any work
//! starts; persistence errors are fatal and never leave a partial commit
//! where avoidable.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;

use crate::config::{self, StorePaths};
use crate::models::{PosterRecord, Provenance};
use crate::pipeline::extraction::chain::ExtractionChain;
use crate::pipeline::extraction::ollama::VisionClient;
use crate::pipeline::extraction::types::{PosterRenderer, PosterSource};
use crate::pipeline::merge::merge_store;
use crate::pipeline::overrides::OverrideMap;
use crate::pipeline::validate::{validate_store, DirAssetStore, ValidationReport};
use crate::store::{load_store, save_store, PosterStore, StoreError};

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Source directory not found: {}", .0.display())]
    SourceDirMissing(PathBuf),

    #[error("Could not enumerate source directory {}: {source}", .path.display())]
    SourceScan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Vision mode requested but the vision service is unreachable at {0}")]
    VisionUnavailable(String),

    #[error("No posters could be imported from {}", .0.display())]
    NoCandidates(PathBuf),

    #[error("Validation failed with {0} blocking violation(s); nothing was written")]
    Validation(usize),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// How an import treats the existing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Reconcile candidates against the existing store (default).
    Merge,
    /// Operator replacement of the whole store.
    Replace,
}

/// Outcome summary of one committed import run.
#[derive(Debug)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
    pub total_in_store: usize,
    pub report: ValidationReport,
}

/// Pre-flight check for vision mode: the service must answer its liveness
/// probe before any source is processed.
pub fn require_vision_service(client: &dyn VisionClient, url: &str) -> Result<(), ImportError> {
    if client.is_reachable() {
        Ok(())
    } else {
        Err(ImportError::VisionUnavailable(url.to_string()))
    }
}

/// Application state for one import run: store paths plus the collaborator
/// set. Constructed once at startup and passed by reference, never global.
pub struct Importer {
    paths: StorePaths,
    renderer: Box<dyn PosterRenderer>,
    chain: ExtractionChain,
    overrides: OverrideMap,
}

impl Importer {
    pub fn new(
        paths: StorePaths,
        renderer: Box<dyn PosterRenderer>,
        chain: ExtractionChain,
        overrides: OverrideMap,
    ) -> Self {
        Self {
            paths,
            renderer,
            chain,
            overrides,
        }
    }

    /// Run one import batch: enumerate sources in stable order, extract each,
    /// merge once against the loaded store, validate, commit.
    pub fn run(
        &self,
        source_dir: &Path,
        start_id: u32,
        mode: ImportMode,
    ) -> Result<ImportSummary, ImportError> {
        if !source_dir.is_dir() {
            return Err(ImportError::SourceDirMissing(source_dir.to_path_buf()));
        }

        let sources = enumerate_sources(source_dir)?;
        tracing::info!(
            sources = sources.len(),
            dir = %source_dir.display(),
            "Found poster sources"
        );

        let mut candidates: Vec<PosterRecord> = Vec::new();
        let mut skipped = 0usize;
        for (offset, path) in sources.iter().enumerate() {
            let poster_id = format!("poster_{:03}", start_id as usize + offset);
            match self.process_source(path, &poster_id) {
                Some(record) => candidates.push(record),
                None => skipped += 1,
            }
        }

        if candidates.is_empty() {
            return Err(ImportError::NoCandidates(source_dir.to_path_buf()));
        }

        let now = Utc::now();
        let existing = match mode {
            ImportMode::Merge => load_store(&self.paths.structured_store(), now)?,
            ImportMode::Replace => {
                tracing::info!("Replace mode: existing store will be discarded");
                PosterStore::empty(now)
            }
        };

        let posters = merge_store(&existing.posters, &candidates, now);

        let assets = DirAssetStore::new(self.paths.assets_dir());
        let report = validate_store(&posters, &assets);
        if report.has_blocking() {
            for violation in &report.violations {
                tracing::error!(%violation, "Validation violation");
            }
            return Err(ImportError::Validation(report.blocking_count()));
        }
        for violation in &report.violations {
            tracing::warn!(%violation, "Validation warning");
        }

        let store = PosterStore::new(posters, now);
        save_store(&self.paths, &store)?;

        tracing::info!(
            imported = candidates.len(),
            skipped,
            total = store.posters.len(),
            "Import committed"
        );

        Ok(ImportSummary {
            imported: candidates.len(),
            skipped,
            total_in_store: store.posters.len(),
            report,
        })
    }

    /// Process one source into a candidate record. Every failure here is
    /// recoverable: the source is skipped and the batch continues.
    fn process_source(&self, path: &Path, poster_id: &str) -> Option<PosterRecord> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unknown".to_string());
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        tracing::info!(poster_id, file = %file_name, "Processing poster source");

        let pdf_bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(poster_id, file = %file_name, error = %err, "Could not read source, skipping");
                return None;
            }
        };

        // Render the display asset first. A failure is logged and does not
        // abort this source's metadata extraction; the record still
        // references the asset and validation surfaces the gap.
        let rendered_png = match self.renderer.render_poster(&pdf_bytes, config::RENDER_DPI) {
            Ok(png) => {
                if let Err(err) = self.write_asset(poster_id, &png) {
                    tracing::warn!(poster_id, error = %err, "Could not write display asset");
                }
                Some(png)
            }
            Err(err) => {
                tracing::warn!(poster_id, error = %err, "Rendering failed; display asset will be missing");
                None
            }
        };

        let source = PosterSource {
            id: poster_id.to_string(),
            file_name: file_name.clone(),
            stem: stem.clone(),
            pdf_bytes,
            rendered_png,
        };

        let extracted = self.chain.extract(&source)?;
        let content = self.overrides.apply(&stem, extracted.content);

        Some(PosterRecord {
            id: poster_id.to_string(),
            title: content.title,
            authors: content.authors,
            tags: content.tags,
            abstract_text: content.abstract_text,
            poster_image: config::poster_image_ref(poster_id),
            faq: None,
            booth_id: None,
            room: None,
            related_links: None,
            keywords: None,
            contact_email: None,
            metadata: Some(Provenance {
                source: Some(extracted.source_tag.to_string()),
                source_file: Some(file_name),
                created_at: None,
                updated_at: None,
            }),
        })
    }

    fn write_asset(&self, poster_id: &str, png: &[u8]) -> Result<(), std::io::Error> {
        let dir = self.paths.assets_dir();
        fs::create_dir_all(&dir)?;
        fs::write(dir.join(config::asset_file_name(poster_id)), png)
    }
}

/// Stable lexicographic enumeration of `*.pdf` sources.
fn enumerate_sources(dir: &Path) -> Result<Vec<PathBuf>, ImportError> {
    let entries = fs::read_dir(dir).map_err(|source| ImportError::SourceScan {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut sources: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("pdf"))
                .unwrap_or(false)
        })
        .collect();
    sources.sort();
    Ok(sources)
}
