//! Platform gateway.
//!
//! Platform lookups go through a remote function endpoint that proxies the
//! individual streaming services and storefronts. Every call is treated as
//! unreliable: it may fail outright or succeed with empty data, and the two
//! cases are kept distinct. A failed platform is omitted from aggregation
//! input by the caller; an empty-but-successful answer contributes nothing
//! but is not an error. No placeholder stats are ever fabricated for a
//! failed fetch.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use encore_common::{AppError, AppResult};
use encore_db::entities::platform_link::Platform;
use encore_db::entities::release::ReleaseType;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;

/// Search hit for an artist on one platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformArtistSummary {
    pub platform: Platform,
    pub platform_artist_id: String,
    pub name: String,
    pub followers: Option<i64>,
}

/// Detailed per-platform stats for one artist.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformArtistDetail {
    pub platform: Platform,
    pub platform_artist_id: String,
    pub name: String,
    pub followers: Option<i64>,
    pub popularity: Option<i32>,
}

/// A release as reported by a platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformRelease {
    pub platform: Platform,
    pub platform_release_id: String,
    pub name: String,
    pub release_type: ReleaseType,
    pub released_at: DateTime<Utc>,
    pub track_count: i32,
    pub popularity: Option<i32>,
}

/// Trait for platform lookups.
///
/// Lets the engine services query platforms without depending on the
/// remote-call implementation.
#[async_trait]
pub trait PlatformGateway: Send + Sync {
    /// Search for artists on one platform.
    async fn search_artists(
        &self,
        platform: Platform,
        query: &str,
    ) -> AppResult<Vec<PlatformArtistSummary>>;

    /// Fetch current stats for one artist on one platform.
    ///
    /// `Ok(None)` means the platform answered but knows nothing about the
    /// artist; `Err` means the call itself failed.
    async fn artist_details(
        &self,
        platform: Platform,
        platform_artist_id: &str,
    ) -> AppResult<Option<PlatformArtistDetail>>;

    /// Fetch the releases a platform currently reports for an artist.
    async fn artist_releases(
        &self,
        platform: Platform,
        platform_artist_id: &str,
    ) -> AppResult<Vec<PlatformRelease>>;
}

/// Response envelope of the remote function endpoint.
#[derive(Debug, Deserialize)]
struct FunctionEnvelope<T> {
    data: Option<T>,
    error: Option<FunctionError>,
}

#[derive(Debug, Deserialize)]
struct FunctionError {
    message: String,
}

/// Production gateway calling the remote function endpoint over HTTP.
#[derive(Clone)]
pub struct HttpPlatformGateway {
    client: reqwest::Client,
    function_url: String,
}

impl HttpPlatformGateway {
    /// Create a new gateway against a function endpoint base URL.
    pub fn new(function_url: &str, timeout_secs: u64) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(Self {
            client,
            function_url: function_url.trim_end_matches('/').to_string(),
        })
    }

    /// Invoke one remote function and unwrap its `{data, error}` envelope.
    async fn invoke<T: DeserializeOwned>(
        &self,
        function: &str,
        payload: serde_json::Value,
    ) -> AppResult<Option<T>> {
        let url = format!("{}/{function}", self.function_url);

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("{function}: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "{function}: status {}",
                response.status()
            )));
        }

        let envelope: FunctionEnvelope<T> = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("{function}: {e}")))?;

        if let Some(err) = envelope.error {
            return Err(AppError::ExternalService(format!(
                "{function}: {}",
                err.message
            )));
        }

        // data may legitimately be absent: an empty answer is not an error
        Ok(envelope.data)
    }
}

#[async_trait]
impl PlatformGateway for HttpPlatformGateway {
    async fn search_artists(
        &self,
        platform: Platform,
        query: &str,
    ) -> AppResult<Vec<PlatformArtistSummary>> {
        let result = self
            .invoke(
                "search-artists",
                json!({ "platform": platform.as_tag(), "query": query }),
            )
            .await?;
        Ok(result.unwrap_or_default())
    }

    async fn artist_details(
        &self,
        platform: Platform,
        platform_artist_id: &str,
    ) -> AppResult<Option<PlatformArtistDetail>> {
        self.invoke(
            "artist-details",
            json!({ "platform": platform.as_tag(), "artistId": platform_artist_id }),
        )
        .await
    }

    async fn artist_releases(
        &self,
        platform: Platform,
        platform_artist_id: &str,
    ) -> AppResult<Vec<PlatformRelease>> {
        let result = self
            .invoke(
                "artist-releases",
                json!({ "platform": platform.as_tag(), "artistId": platform_artist_id }),
            )
            .await?;
        Ok(result.unwrap_or_default())
    }
}

/// In-memory gateway for tests.
#[derive(Default)]
pub struct InMemoryPlatformGateway {
    summaries: Mutex<HashMap<Platform, Vec<PlatformArtistSummary>>>,
    details: Mutex<HashMap<(Platform, String), PlatformArtistDetail>>,
    releases: Mutex<HashMap<(Platform, String), Vec<PlatformRelease>>>,
    failing: Mutex<HashSet<Platform>>,
}

impl InMemoryPlatformGateway {
    /// Create an empty gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register search results for a platform.
    pub fn set_summaries(&self, platform: Platform, summaries: Vec<PlatformArtistSummary>) {
        if let Ok(mut map) = self.summaries.lock() {
            map.insert(platform, summaries);
        }
    }

    /// Register artist details.
    pub fn set_detail(&self, detail: PlatformArtistDetail) {
        if let Ok(mut map) = self.details.lock() {
            map.insert(
                (detail.platform, detail.platform_artist_id.clone()),
                detail,
            );
        }
    }

    /// Register reported releases for an artist.
    pub fn set_releases(
        &self,
        platform: Platform,
        platform_artist_id: &str,
        releases: Vec<PlatformRelease>,
    ) {
        if let Ok(mut map) = self.releases.lock() {
            map.insert((platform, platform_artist_id.to_string()), releases);
        }
    }

    /// Make every call against a platform fail.
    pub fn fail_platform(&self, platform: Platform) {
        if let Ok(mut set) = self.failing.lock() {
            set.insert(platform);
        }
    }

    fn check_failing(&self, platform: Platform) -> AppResult<()> {
        let failing = self
            .failing
            .lock()
            .map_err(|_| AppError::Internal("poisoned lock".to_string()))?;
        if failing.contains(&platform) {
            return Err(AppError::ExternalService(format!(
                "{}: unavailable",
                platform.as_tag()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl PlatformGateway for InMemoryPlatformGateway {
    async fn search_artists(
        &self,
        platform: Platform,
        _query: &str,
    ) -> AppResult<Vec<PlatformArtistSummary>> {
        self.check_failing(platform)?;
        let map = self
            .summaries
            .lock()
            .map_err(|_| AppError::Internal("poisoned lock".to_string()))?;
        Ok(map.get(&platform).cloned().unwrap_or_default())
    }

    async fn artist_details(
        &self,
        platform: Platform,
        platform_artist_id: &str,
    ) -> AppResult<Option<PlatformArtistDetail>> {
        self.check_failing(platform)?;
        let map = self
            .details
            .lock()
            .map_err(|_| AppError::Internal("poisoned lock".to_string()))?;
        Ok(map.get(&(platform, platform_artist_id.to_string())).cloned())
    }

    async fn artist_releases(
        &self,
        platform: Platform,
        platform_artist_id: &str,
    ) -> AppResult<Vec<PlatformRelease>> {
        self.check_failing(platform)?;
        let map = self
            .releases
            .lock()
            .map_err(|_| AppError::Internal("poisoned lock".to_string()))?;
        Ok(map
            .get(&(platform, platform_artist_id.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_gateway_distinguishes_failure_from_empty() {
        let gateway = InMemoryPlatformGateway::new();
        gateway.fail_platform(Platform::Deezer);

        // Failed platform: an error, not fabricated data
        let err = gateway.artist_details(Platform::Deezer, "d1").await;
        assert!(matches!(err, Err(AppError::ExternalService(_))));

        // Unknown artist on a healthy platform: empty success
        let empty = gateway
            .artist_details(Platform::Spotify, "unknown")
            .await
            .unwrap();
        assert!(empty.is_none());
    }
}
