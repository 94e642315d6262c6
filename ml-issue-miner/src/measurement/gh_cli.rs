//! Line counts through the GitHub CLI.

use super::{LineCounts, MeasureError};
use crate::layout::RepoSlug;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Runs `gh pr view <n> --repo owner/name --json additions,deletions,changedFiles`.
///
/// # Errors
///
/// Returns [`MeasureError`] if `gh` cannot be started, fails, or prints
/// unexpected output.
pub async fn pr_line_counts(slug: &RepoSlug, number: u64) -> Result<LineCounts, MeasureError> {
    debug!(repo = %slug, pull = number, "Running gh pr view");

    let output = Command::new("gh")
        .args([
            "pr",
            "view",
            &number.to_string(),
            "--repo",
            &slug.full_name(),
            "--json",
            "additions,deletions,changedFiles",
        ])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| MeasureError::GhCliFailed {
            repository: slug.full_name(),
            pull: number,
            message: format!("Failed to execute gh: {e}"),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MeasureError::GhCliFailed {
            repository: slug.full_name(),
            pull: number,
            message: stderr.trim().to_string(),
        });
    }

    serde_json::from_slice(&output.stdout).map_err(|e| MeasureError::GhCliOutput {
        repository: slug.full_name(),
        pull: number,
        source: e,
    })
}
