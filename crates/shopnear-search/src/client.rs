//! HTTP client for the Nearby Search API.
//!
//! `GET {base}/{shops|products}/nearby?latitude=..&longitude=..&radius=..`
//! with the radius in meters. The response is a JSON array; items are run
//! through [`crate::normalize`] so a malformed entity never fails the whole
//! response.

use std::time::Duration;

use reqwest::{Client, Url};
use shopnear_core::{NearbyResult, ProximityQuery};

use crate::coordinator::NearbySearch;
use crate::error::SearchError;
use crate::normalize::normalize_results;

/// Client for the Nearby Search API.
///
/// Use [`NearbyClient::new`] with the configured API base URL, or point it
/// at a mock server in tests.
#[derive(Debug, Clone)]
pub struct NearbyClient {
    client: Client,
    base_url: Url,
}

impl NearbyClient {
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`SearchError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // A trailing slash makes `Url::join` append to the base path instead
        // of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| SearchError::InvalidBaseUrl {
            base_url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// Fetches entities of `query.kind` within `query.radius` of
    /// `query.position`.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Http`] on network failure.
    /// - [`SearchError::UnexpectedStatus`] on any non-2xx status.
    /// - [`SearchError::Deserialize`] if the body is not JSON.
    /// - [`SearchError::UnexpectedShape`] if the body is not a JSON array.
    pub async fn fetch_nearby(
        &self,
        query: &ProximityQuery,
    ) -> Result<Vec<NearbyResult>, SearchError> {
        let url = self.build_url(query)?;
        tracing::debug!(%url, "nearby search request");

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let payload: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| SearchError::Deserialize {
                context: url.to_string(),
                source: e,
            })?;

        let serde_json::Value::Array(items) = payload else {
            return Err(SearchError::UnexpectedShape {
                url: url.to_string(),
            });
        };

        let results = normalize_results(query.kind, items);
        tracing::debug!(kind = %query.kind, count = results.len(), "nearby search response");
        Ok(results)
    }

    /// Builds `{base}/{kind}/nearby` with percent-encoded query parameters.
    fn build_url(&self, query: &ProximityQuery) -> Result<Url, SearchError> {
        let mut url = self
            .base_url
            .join(&format!("{}/nearby", query.kind.path_segment()))
            .map_err(|e| SearchError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        url.query_pairs_mut()
            .append_pair("latitude", &query.position.latitude().to_string())
            .append_pair("longitude", &query.position.longitude().to_string())
            .append_pair("radius", &query.radius.meters().to_string());
        Ok(url)
    }
}

impl NearbySearch for NearbyClient {
    async fn search_nearby(&self, query: &ProximityQuery) -> Result<Vec<NearbyResult>, SearchError> {
        self.fetch_nearby(query).await
    }
}
