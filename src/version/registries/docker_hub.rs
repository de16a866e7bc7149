//! Docker Hub registry implementation

use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::FETCH_TIMEOUT_MS;
use crate::version::error::FetchError;
use crate::version::source::ImageRegistry;

/// Response from the Docker Hub token service
#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

/// Response from the Registry v2 tag list endpoint
#[derive(Debug, Deserialize)]
struct TagList {
    #[serde(default)]
    tags: Option<Vec<String>>,
}

/// Image registry backed by the Docker Hub Registry v2 API
pub struct DockerHubRegistry {
    client: reqwest::Client,
    registry_url: String,
    auth_url: String,
}

impl DockerHubRegistry {
    pub fn new(registry_url: &str, auth_url: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("release-sync/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_millis(FETCH_TIMEOUT_MS))
            .build()?;

        Ok(Self {
            client,
            registry_url: registry_url.trim_end_matches('/').to_string(),
            auth_url: auth_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get an anonymous pull token for `repository`
    async fn pull_token(&self, repository: &str) -> Result<String, FetchError> {
        let url = format!(
            "{}/token?scope=repository:{}:pull&service=registry.docker.io",
            self.auth_url, repository
        );
        debug!("Requesting pull token for {}", repository);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::Unauthorized(format!(
                "token service returned status {} for {}",
                status, repository
            )));
        }

        let body: TokenResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse token response: {}", e);
            FetchError::InvalidResponse(e.to_string())
        })?;

        Ok(body.token)
    }
}

/// Keep tags shaped like `<major>.<minor>.<patch>-<distro>`, minus the suffix.
pub fn filter_distro_tags(tags: &[String], distro: &str) -> Vec<String> {
    let pattern = format!(r"^([0-9]+\.[0-9]+\.[0-9]+)-{}$", regex::escape(distro));
    let Ok(matcher) = Regex::new(&pattern) else {
        return Vec::new();
    };

    tags.iter()
        .filter_map(|tag| matcher.captures(tag))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

#[async_trait::async_trait]
impl ImageRegistry for DockerHubRegistry {
    async fn list_image_tags(
        &self,
        repository: &str,
        distro: &str,
    ) -> Result<Vec<String>, FetchError> {
        let token = self.pull_token(repository).await?;
        let url = format!("{}/v2/{}/tags/list", self.registry_url, repository);

        let response = self
            .client
            .get(&url)
            .header(
                "Accept",
                "application/vnd.docker.distribution.manifest.v2+json",
            )
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(repository.to_string()));
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(FetchError::Unauthorized(format!(
                "registry rejected token for {}",
                repository
            )));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(FetchError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            warn!("Registry returned status {}: {}", status, url);
            return Err(FetchError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let list: TagList = response.json().await.map_err(|e| {
            warn!("Failed to parse registry tag list: {}", e);
            FetchError::InvalidResponse(e.to_string())
        })?;

        let all_tags = list.tags.unwrap_or_default();
        let versions = filter_distro_tags(&all_tags, distro);
        debug!(
            "{} of {} tags in {} match distro {}",
            versions.len(),
            all_tags.len(),
            repository,
            distro
        );

        Ok(versions)
    }
}
