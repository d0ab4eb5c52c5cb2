use std::path::{Path, PathBuf};

/// Application-level constants
pub const APP_NAME: &str = "posterdeck";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Schema version written to the structured store file.
pub const SCHEMA_VERSION: &str = "1.0";

/// Default tracing filter when RUST_LOG is unset.
pub const DEFAULT_LOG_FILTER: &str = "posterdeck=info";

/// Rasterization DPI for poster display assets.
pub const RENDER_DPI: u32 = 150;

/// File-system layout of one poster project, relative to its root.
///
/// Two JSON representations of the store are maintained: the structured file
/// is the source of truth (schema wrapper + provenance), the flat file is the
/// bare array consumed by the presentation layer.
#[derive(Debug, Clone)]
pub struct StorePaths {
    project_root: PathBuf,
}

impl StorePaths {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Structured store: `backend/posters.json`
    pub fn structured_store(&self) -> PathBuf {
        self.project_root.join("backend").join("posters.json")
    }

    /// Flat store: `backend/data/posters.json`
    pub fn flat_store(&self) -> PathBuf {
        self.project_root
            .join("backend")
            .join("data")
            .join("posters.json")
    }

    /// Directory holding one rendered `<id>.png` per poster.
    pub fn assets_dir(&self) -> PathBuf {
        self.project_root.join("assets").join("posters")
    }

    /// Operator override file.
    pub fn overrides_file(&self) -> PathBuf {
        self.project_root.join("poster_overrides.yaml")
    }
}

/// Relative asset reference written into a record's `poster_image` field.
pub fn poster_image_ref(id: &str) -> String {
    format!("assets/posters/{id}.png")
}

/// File name of a poster's rendered display asset.
pub fn asset_file_name(id: &str) -> String {
    format!("{id}.png")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_paths_under_project_root() {
        let paths = StorePaths::new("/tmp/demo");
        assert!(paths.structured_store().starts_with("/tmp/demo"));
        assert!(paths.structured_store().ends_with("backend/posters.json"));
        assert!(paths.flat_store().ends_with("backend/data/posters.json"));
        assert!(paths.assets_dir().ends_with("assets/posters"));
        assert!(paths.overrides_file().ends_with("poster_overrides.yaml"));
    }

    #[test]
    fn structured_and_flat_paths_differ() {
        let paths = StorePaths::new(".");
        assert_ne!(paths.structured_store(), paths.flat_store());
    }

    #[test]
    fn poster_image_ref_matches_asset_file() {
        let reference = poster_image_ref("poster_001");
        assert_eq!(reference, "assets/posters/poster_001.png");
        assert!(reference.ends_with(&asset_file_name("poster_001")));
    }
}
