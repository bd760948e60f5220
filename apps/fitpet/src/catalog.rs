//! # Landmark Catalog Loading
//!
//! Landmarks come from a TOML file:
//!
//! ```toml
//! [[landmark]]
//! quest_id = "gyeongbokgung"
//! name = "Gyeongbokgung Palace"
//! lat = 37.5796
//! lng = 126.9770
//! ```
//!
//! Without a file the built-in catalog is used.

use crate::AppError;
use fitpet_core::primitives::MAX_QUEST_ID_LENGTH;
use fitpet_core::{QuestCatalog, StaticCatalog};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Maximum catalog file size (1 MB).
const MAX_CATALOG_FILE_SIZE: u64 = 1024 * 1024;

/// Resolve `path` and make sure it is a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, AppError> {
    let canonical = path.canonicalize().map_err(|e| {
        AppError::Catalog(format!("invalid file path '{}': {}", path.display(), e))
    })?;
    if !canonical.is_file() {
        return Err(AppError::Catalog(format!(
            "'{}' is not a regular file",
            path.display()
        )));
    }
    Ok(canonical)
}

fn validate_file_size(path: &Path, max_size: u64) -> Result<(), AppError> {
    let len = std::fs::metadata(path)?.len();
    if len > max_size {
        return Err(AppError::Catalog(format!(
            "file size {len} bytes exceeds maximum {max_size} bytes"
        )));
    }
    Ok(())
}

/// Parse and validate a catalog from TOML text.
pub fn parse_catalog(text: &str) -> Result<StaticCatalog, AppError> {
    let catalog: StaticCatalog =
        toml::from_str(text).map_err(|e| AppError::Catalog(e.to_string()))?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

/// Every landmark needs a unique, non-empty id and valid coordinates.
pub fn validate_catalog(catalog: &StaticCatalog) -> Result<(), AppError> {
    if catalog.is_empty() {
        return Err(AppError::Catalog("catalog has no landmarks".to_string()));
    }
    let mut seen = BTreeSet::new();
    for landmark in catalog.landmarks() {
        let id = landmark.quest_id.as_str();
        if id.trim().is_empty() || id.len() > MAX_QUEST_ID_LENGTH {
            return Err(AppError::Catalog(format!("invalid quest id '{id}'")));
        }
        if !seen.insert(id) {
            return Err(AppError::Catalog(format!("duplicate quest id '{id}'")));
        }
        if !(-90.0..=90.0).contains(&landmark.lat) || !(-180.0..=180.0).contains(&landmark.lng) {
            return Err(AppError::Catalog(format!(
                "landmark '{id}' has out-of-range coordinates"
            )));
        }
    }
    Ok(())
}

/// Load the catalog at `path`, or the built-in one.
pub fn load_catalog(path: Option<&Path>) -> Result<StaticCatalog, AppError> {
    let Some(path) = path else {
        return Ok(StaticCatalog::builtin());
    };
    let path = validate_file_path(path)?;
    validate_file_size(&path, MAX_CATALOG_FILE_SIZE)?;
    let text = std::fs::read_to_string(&path)?;
    let catalog = parse_catalog(&text)?;
    tracing::info!(path = %path.display(), landmarks = catalog.len(), "loaded landmark catalog");
    Ok(catalog)
}
