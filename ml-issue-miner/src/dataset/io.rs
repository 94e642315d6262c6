//! CSV and JSON artifact readers and writers.

use super::DatasetError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads every row of a headed CSV file.
///
/// # Errors
///
/// Returns [`DatasetError::MissingFile`] if the file does not exist, or a
/// CSV error if any row fails to deserialize.
pub fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DatasetError> {
    require(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| DatasetError::csv(path, e))?;

    let rows = reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| DatasetError::csv(path, e))?;

    debug!(path = %path.display(), rows = rows.len(), "Read CSV");
    Ok(rows)
}

/// Writes rows to a headed CSV file, creating parent directories.
///
/// # Errors
///
/// Returns an error if the file cannot be created or a row fails to serialize.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), DatasetError> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path).map_err(|e| DatasetError::csv(path, e))?;
    for row in rows {
        writer.serialize(row).map_err(|e| DatasetError::csv(path, e))?;
    }
    writer
        .flush()
        .map_err(|e| DatasetError::io(path, e))?;

    debug!(path = %path.display(), rows = rows.len(), "Wrote CSV");
    Ok(())
}

/// Reads and deserializes a JSON document.
///
/// # Errors
///
/// Returns an error if the file is missing, unreadable, or not valid JSON for `T`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DatasetError> {
    require(path)?;
    let content = fs::read_to_string(path).map_err(|e| DatasetError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| DatasetError::json(path, e))
}

/// Serializes a value as JSON, creating parent directories.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized or the file written.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), DatasetError> {
    let content = serde_json::to_string(value).map_err(|e| DatasetError::json(path, e))?;
    write_text(path, &content)
}

/// Writes text to a file, creating parent directories.
///
/// # Errors
///
/// Returns an error if a directory or the file cannot be created.
pub fn write_text(path: &Path, content: &str) -> Result<(), DatasetError> {
    ensure_parent(path)?;
    fs::write(path, content).map_err(|e| DatasetError::io(path, e))
}

/// Lists non-hidden entries of a directory, sorted by file name.
///
/// A missing directory yields an empty list.
///
/// # Errors
///
/// Returns an error if the directory exists but cannot be read.
pub fn list_dir(dir: &Path) -> Result<Vec<PathBuf>, DatasetError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| DatasetError::io(dir, e))? {
        let entry = entry.map_err(|e| DatasetError::io(dir, e))?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        entries.push(entry.path());
    }
    entries.sort();
    Ok(entries)
}

/// Returns [`DatasetError::MissingFile`] unless `path` exists.
pub(crate) fn require(path: &Path) -> Result<(), DatasetError> {
    if path.exists() {
        Ok(())
    } else {
        Err(DatasetError::MissingFile {
            path: path.display().to_string(),
        })
    }
}

fn ensure_parent(path: &Path) -> Result<(), DatasetError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| DatasetError::io(parent, e))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Row {
        name: String,
        count: u32,
    }

    #[test]
    fn writes_and_reads_csv_in_nested_directory() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/rows.csv");
        let rows = vec![
            Row {
                name: "a, with comma".to_string(),
                count: 1,
            },
            Row {
                name: "b".to_string(),
                count: 2,
            },
        ];

        write_csv(&path, &rows).unwrap();
        let loaded: Vec<Row> = read_csv(&path).unwrap();

        assert_eq!(loaded, rows);
    }

    #[test]
    fn missing_csv_is_reported() {
        let temp = TempDir::new().unwrap();
        let result = read_csv::<Row>(&temp.path().join("absent.csv"));
        assert!(matches!(result, Err(DatasetError::MissingFile { .. })));
    }

    #[test]
    fn list_dir_skips_hidden_entries() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".DS_Store"), "").unwrap();
        fs::write(temp.path().join("b.json"), "[]").unwrap();
        fs::write(temp.path().join("a.json"), "[]").unwrap();

        let entries = list_dir(temp.path()).unwrap();
        let names: Vec<_> = entries
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(names, vec!["a.json", "b.json"]);
        assert!(list_dir(&temp.path().join("missing")).unwrap().is_empty());
    }
}
