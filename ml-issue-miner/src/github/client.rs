//! Thin JSON client over octocrab.

use crate::github::FetchError;
use crate::layout::RepoSlug;
use crate::rate_limit::ensure_core_rate_limit;
use octocrab::models::repos::Content;
use octocrab::Octocrab;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

/// Page size of every list request.
pub const PER_PAGE: u8 = 100;

/// Query parameters of a paged list request.
#[derive(Debug, Serialize)]
struct PageParams<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<&'a str>,
    per_page: u8,
    page: u32,
}

#[derive(Debug, Serialize)]
struct RefParams<'a> {
    #[serde(rename = "ref")]
    reference: &'a str,
}

/// GitHub client used by the download stages.
///
/// Requests are issued one at a time, each preceded by a core rate limit
/// check.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    octocrab: Octocrab,
}

impl GitHubClient {
    /// Builds a client, authenticated when a token is given.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the underlying client cannot be built.
    pub fn new(token: Option<&str>) -> Result<Self, FetchError> {
        let builder = Octocrab::builder();
        let octocrab = match token {
            Some(token) => builder.personal_token(token.to_string()).build()?,
            None => {
                warn!("No GitHub token given, using the unauthenticated rate limit");
                builder.build()?
            }
        };
        Ok(Self { octocrab })
    }

    /// Fetches a JSON document. HTTP 404 and 410 yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on any other API failure.
    pub async fn fetch_json<P: Serialize + ?Sized>(
        &self,
        route: &str,
        params: Option<&P>,
    ) -> Result<Option<Value>, FetchError> {
        ensure_core_rate_limit(&self.octocrab).await?;
        debug!(route, "GET");

        match self.octocrab.get::<Value, _, _>(route, params).await {
            Ok(value) => Ok(Some(value)),
            Err(err) if is_gone(&err) => {
                debug!(route, "Not found");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Fetches `route` page by page until an empty page.
    ///
    /// Returns `Ok(None)` when the first page is a 404.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on API failures or when a page is not an array.
    pub async fn fetch_all_pages(
        &self,
        route: &str,
        state: Option<&str>,
    ) -> Result<Option<Vec<Value>>, FetchError> {
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let params = PageParams {
                state,
                per_page: PER_PAGE,
                page,
            };
            let Some(document) = self.fetch_json(route, Some(&params)).await? else {
                if page == 1 {
                    return Ok(None);
                }
                break;
            };

            let Value::Array(batch) = document else {
                return Err(FetchError::UnexpectedShape {
                    route: route.to_string(),
                    message: format!("page {page} is not a JSON array"),
                });
            };
            if batch.is_empty() {
                break;
            }

            items.extend(batch);
            page += 1;
        }

        debug!(route, count = items.len(), pages = page - 1, "Fetched all pages");
        Ok(Some(items))
    }

    /// Fetches the text of `path` at commit `sha`.
    ///
    /// Returns `Ok(None)` when the file does not exist at that commit or the
    /// API does not inline its content (files above 1 MB).
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on API failures.
    pub async fn fetch_file_content(
        &self,
        slug: &RepoSlug,
        path: &str,
        sha: &str,
    ) -> Result<Option<String>, FetchError> {
        let route = contents_route(slug, path).ok_or_else(|| FetchError::UnexpectedShape {
            route: path.to_string(),
            message: "cannot build contents route".to_string(),
        })?;
        let params = RefParams { reference: sha };

        let Some(document) = self.fetch_json(&route, Some(&params)).await? else {
            return Ok(None);
        };
        let content: Content =
            serde_json::from_value(document).map_err(|e| FetchError::UnexpectedShape {
                route: route.clone(),
                message: e.to_string(),
            })?;

        Ok(content.decoded_content())
    }
}

fn is_gone(err: &octocrab::Error) -> bool {
    match err {
        octocrab::Error::GitHub { source, .. } => {
            matches!(source.status_code.as_u16(), 404 | 410)
        }
        _ => false,
    }
}

/// Builds `/repos/{owner}/{repo}/contents/{path}` with each path segment
/// percent-encoded.
pub(crate) fn contents_route(slug: &RepoSlug, path: &str) -> Option<String> {
    let mut url = Url::parse("https://api.github.com").ok()?;
    {
        let mut segments = url.path_segments_mut().ok()?;
        segments.extend(["repos", slug.owner(), slug.name(), "contents"]);
        segments.extend(path.split('/').filter(|s| !s.is_empty()));
    }
    Some(url.path().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contents_route_encodes_segments() {
        let slug = RepoSlug::new("owner", "repo").unwrap();
        let route = contents_route(&slug, "src/my model.py").unwrap();
        assert_eq!(route, "/repos/owner/repo/contents/src/my%20model.py");
    }

    #[test]
    fn page_params_serialize_like_the_rest_api() {
        let params = PageParams {
            state: Some("all"),
            per_page: PER_PAGE,
            page: 3,
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["state"], "all");
        assert_eq!(value["per_page"], 100);
        assert_eq!(value["page"], 3);

        let no_state = PageParams {
            state: None,
            per_page: PER_PAGE,
            page: 1,
        };
        let value = serde_json::to_value(&no_state).unwrap();
        assert!(value.get("state").is_none());
    }

    #[tokio::test]
    async fn builds_unauthenticated_client() {
        assert!(GitHubClient::new(None).is_ok());
    }
}
