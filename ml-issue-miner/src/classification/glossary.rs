//! Keyword extraction from the saved ML glossary page.

use crate::dataset::DatasetError;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A row of the keyword CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryRow {
    pub id: usize,
    pub keyword: String,
}

/// Reads the `data-text` attribute of every `h2.hide-from-toc` heading.
///
/// # Errors
///
/// Returns [`DatasetError::Malformed`] if the selector cannot be built.
pub fn extract_keywords(html: &str, source: &Path) -> Result<Vec<GlossaryRow>, DatasetError> {
    let selector = Selector::parse("h2.hide-from-toc")
        .map_err(|e| DatasetError::malformed(source, format!("invalid selector: {e}")))?;
    let document = Html::parse_document(html);

    let rows = document
        .select(&selector)
        .filter_map(|heading| heading.value().attr("data-text"))
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .enumerate()
        .map(|(index, keyword)| GlossaryRow {
            id: index + 1,
            keyword: keyword.to_string(),
        })
        .collect();

    Ok(rows)
}
