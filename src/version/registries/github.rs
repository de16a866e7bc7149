//! GitHub tags API implementation

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{FETCH_TIMEOUT_MS, MAX_TAG_PAGES, TAGS_PER_PAGE};
use crate::version::error::FetchError;
use crate::version::source::TagSource;

/// Response item from GitHub Tags API
#[derive(Debug, Deserialize)]
struct Tag {
    name: String,
}

/// Tag source backed by the GitHub Tags API
pub struct GitHubTagSource {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubTagSource {
    /// Creates a new GitHubTagSource with a custom base URL
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("release-sync/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_millis(FETCH_TIMEOUT_MS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Authenticate requests, which raises the API rate limit
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    async fn fetch_page(&self, project: &str, page: u32) -> Result<Vec<Tag>, FetchError> {
        let url = format!(
            "{}/repos/{}/tags?per_page={}&page={}",
            self.base_url, project, TAGS_PER_PAGE, page
        );
        debug!("Fetching {}", url);

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github.v3+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(project.to_string()));
        }

        let rate_limit_exhausted = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == "0");

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || (status == reqwest::StatusCode::FORBIDDEN && rate_limit_exhausted)
        {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(FetchError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(FetchError::Unauthorized(format!(
                "GitHub API returned status {} for {}",
                status, project
            )));
        }

        if !status.is_success() {
            warn!("GitHub API returned status {}: {}", status, url);
            return Err(FetchError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        response.json().await.map_err(|e| {
            warn!("Failed to parse GitHub tags response: {}", e);
            FetchError::InvalidResponse(e.to_string())
        })
    }
}

#[async_trait::async_trait]
impl TagSource for GitHubTagSource {
    async fn list_release_tags(&self, project: &str) -> Result<Vec<String>, FetchError> {
        let mut names = Vec::new();

        for page in 1..=MAX_TAG_PAGES {
            let tags = self.fetch_page(project, page).await?;
            let last_page = tags.len() < TAGS_PER_PAGE;
            names.extend(tags.into_iter().map(|t| t.name));
            if last_page {
                break;
            }
            if page == MAX_TAG_PAGES {
                warn!(
                    "Stopped after {} pages of tags for {}; older tags are ignored",
                    MAX_TAG_PAGES, project
                );
            }
        }

        debug!("Fetched {} tags for {}", names.len(), project);
        Ok(names)
    }
}
