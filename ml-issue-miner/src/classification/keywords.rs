//! Glossary keyword matching over issue titles.

use crate::dataset::{require, DatasetError};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Lowercase ML glossary keywords.
#[derive(Debug, Clone, Default)]
pub struct Glossary {
    keywords: Vec<String>,
}

impl Glossary {
    /// Builds a glossary from raw keywords: lowercased, trimmed,
    /// de-duplicated in first-seen order, blanks dropped.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let keywords = keywords
            .into_iter()
            .map(|keyword| keyword.as_ref().trim().to_lowercase())
            .filter(|keyword| !keyword.is_empty())
            .filter(|keyword| seen.insert(keyword.clone()))
            .collect();
        Self { keywords }
    }

    /// Loads keywords from the second column of a headed CSV.
    ///
    /// The file is decoded as UTF-8, falling back to Latin-1.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the file is missing or not valid CSV.
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        require(path)?;
        let bytes = fs::read(path).map_err(|e| DatasetError::io(path, e))?;
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => e.into_bytes().iter().map(|&b| char::from(b)).collect(),
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());
        let mut raw = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| DatasetError::csv(path, e))?;
            if let Some(keyword) = record.get(1) {
                raw.push(keyword.to_string());
            }
        }

        let glossary = Self::new(raw);
        debug!(path = %path.display(), keywords = glossary.len(), "Loaded glossary");
        Ok(glossary)
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// First keyword equal to a token of the normalized title.
    #[must_use]
    pub fn find_in(&self, title: &str) -> Option<&str> {
        let tokens = normalize_title(title);
        self.keywords
            .iter()
            .find(|keyword| tokens.iter().any(|token| token == *keyword))
            .map(String::as_str)
    }

    #[must_use]
    pub fn matches(&self, title: &str) -> bool {
        self.find_in(title).is_some()
    }
}

/// Lowercases a title, turns `. , < > =` into spaces, deletes
/// `" ' ` [ ] ( )` and splits on whitespace.
#[must_use]
pub fn normalize_title(title: &str) -> Vec<String> {
    let cleaned: String = title
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '"' | '\'' | '`' | '[' | ']' | '(' | ')'))
        .map(|c| if matches!(c, '.' | ',' | '<' | '>' | '=') { ' ' } else { c })
        .collect();
    cleaned.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn normalizes_titles() {
        assert_eq!(
            normalize_title("Fix `Model.fit()` when batch_size=1, [GPU]"),
            vec!["fix", "model", "fit", "when", "batch_size", "1", "gpu"]
        );
        assert_eq!(normalize_title("\"Epoch\" <-> 'loss'"), vec!["epoch", "-", "loss"]);
    }

    #[test]
    fn matches_whole_tokens_only() {
        let glossary = Glossary::new(["Epoch", "tensor", " epoch ", ""]);

        assert_eq!(glossary.len(), 2);
        assert_eq!(glossary.find_in("Loss is NaN after first epoch."), Some("epoch"));
        assert!(glossary.matches("Wrong (tensor) shape"));
        assert!(!glossary.matches("Tensorboard does not start"));
    }

    #[test]
    fn loads_second_column_with_latin1_fallback() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Keyword_list.csv");
        let mut content = b"id,keyword\n1,Epoch\n2,Na\xefve Bayes\n3,epoch\n4,\n".to_vec();
        content.extend_from_slice(b"5,Tensor\n");
        fs::write(&path, content).unwrap();

        let glossary = Glossary::load(&path).unwrap();

        assert_eq!(glossary.len(), 3);
        assert!(glossary.matches("NaN tensor"));
    }
}
