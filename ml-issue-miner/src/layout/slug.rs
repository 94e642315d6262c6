//! Filesystem-safe repository identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Character substituted for `/` when a repository name is used as a file name.
pub const SLUG_SEPARATOR: char = '*';

/// Error returned when a repository identifier cannot be parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid repository identifier '{input}': expected owner/name")]
pub struct SlugError {
    /// The rejected input.
    pub input: String,
}

/// A repository identified by owner and name.
///
/// Displays (and serializes) as `owner/name`; [`RepoSlug::file_stem`]
/// yields the `owner*name` form used for artifact file names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepoSlug {
    owner: String,
    name: String,
}

impl RepoSlug {
    /// Creates a slug from its parts.
    ///
    /// # Errors
    ///
    /// Returns [`SlugError`] if either part is empty or contains a separator.
    pub fn new(owner: &str, name: &str) -> Result<Self, SlugError> {
        let owner = owner.trim();
        let name = name.trim();
        let invalid = |part: &str| {
            part.is_empty() || part.contains('/') || part.contains(SLUG_SEPARATOR)
        };
        if invalid(owner) || invalid(name) {
            return Err(SlugError {
                input: format!("{owner}/{name}"),
            });
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// Parses the `owner*name` form used in artifact file names.
    ///
    /// # Errors
    ///
    /// Returns [`SlugError`] if the stem does not contain exactly one separator.
    pub fn from_file_stem(stem: &str) -> Result<Self, SlugError> {
        let (owner, name) = stem.split_once(SLUG_SEPARATOR).ok_or_else(|| SlugError {
            input: stem.to_string(),
        })?;
        Self::new(owner, name).map_err(|_| SlugError {
            input: stem.to_string(),
        })
    }

    /// Repository owner (user or organization).
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `owner/name`.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Returns `owner*name`.
    pub fn file_stem(&self) -> String {
        format!("{}{SLUG_SEPARATOR}{}", self.owner, self.name)
    }

    /// Web URL of an issue in this repository.
    pub fn issue_url(&self, number: u64) -> String {
        format!("https://github.com/{}/{}/issues/{number}", self.owner, self.name)
    }

    /// Web URL of a pull request in this repository.
    pub fn pull_url(&self, number: u64) -> String {
        format!("https://github.com/{}/{}/pull/{number}", self.owner, self.name)
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoSlug {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (owner, name) = s.trim().split_once('/').ok_or_else(|| SlugError {
            input: s.to_string(),
        })?;
        Self::new(owner, name).map_err(|_| SlugError {
            input: s.to_string(),
        })
    }
}

impl TryFrom<String> for RepoSlug {
    type Error = SlugError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RepoSlug> for String {
    fn from(slug: RepoSlug) -> Self {
        slug.full_name()
    }
}
