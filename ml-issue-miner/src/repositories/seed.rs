//! Seed repository-metadata CSV.
//!
//! The seed file is a wide, positional CSV: only the category, repository
//! name, owner and language columns are read.

use crate::dataset::{require, DatasetError};
use crate::layout::RepoSlug;
use std::path::Path;
use tracing::{debug, warn};

const CATEGORY_COLUMN: usize = 0;
const NAME_COLUMN: usize = 3;
const OWNER_COLUMN: usize = 4;
const LANGUAGE_COLUMN: usize = 16;

/// Reads the repositories of the seed CSV whose category and language
/// match (case-insensitive, trimmed).
///
/// Rows that are too short or carry an unusable owner/name are logged and
/// skipped.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file is missing or is not valid CSV.
pub fn read_seed(
    path: &Path,
    category: &str,
    language: &str,
) -> Result<Vec<RepoSlug>, DatasetError> {
    require(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| DatasetError::csv(path, e))?;

    let category = category.trim().to_lowercase();
    let language = language.trim().to_lowercase();
    let mut slugs = Vec::new();

    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| DatasetError::csv(path, e))?;
        let column = |i: usize| record.get(i).map(|value| value.trim().to_lowercase());

        if column(CATEGORY_COLUMN).as_deref() != Some(category.as_str())
            || column(LANGUAGE_COLUMN).as_deref() != Some(language.as_str())
        {
            continue;
        }

        let (Some(owner), Some(name)) = (record.get(OWNER_COLUMN), record.get(NAME_COLUMN)) else {
            warn!(row = index + 2, "Seed row too short, skipping");
            continue;
        };
        match RepoSlug::new(owner, name) {
            Ok(slug) if !slugs.contains(&slug) => slugs.push(slug),
            Ok(_) => debug!(row = index + 2, "Duplicate seed repository"),
            Err(e) => warn!(row = index + 2, error = %e, "Invalid seed repository, skipping"),
        }
    }

    Ok(slugs)
}
