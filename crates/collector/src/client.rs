// Copyright 2024 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! HTTP client for a single Logstash node.

use crate::{CollectorError, ScrapeError};
use bytes::Bytes;
use logstash_responses::NodeStatsResponse;
use tokio::time::{Instant, timeout_at};
use tracing::debug;
use url::Url;

/// Path of the node stats API, relative to the node's base URL.
pub const NODE_STATS_PATH: &str = "_node/stats";

const USER_AGENT: &str = concat!("logstash-exporter/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by every node client.
///
/// Per-request deadlines are applied by [`NodeClient`], so the client itself
/// carries no global timeout.
pub fn build_http_client() -> Result<reqwest::Client, CollectorError> {
    Ok(reqwest::Client::builder().user_agent(USER_AGENT).build()?)
}

/// Issues requests against one node.
#[derive(Debug, Clone)]
pub struct NodeClient {
    client: reqwest::Client,
    base_url: Url,
    stats_url: Url,
}

impl NodeClient {
    /// Create a client for `base_url` on top of a shared `reqwest::Client`.
    pub fn new(client: reqwest::Client, base_url: &str) -> Result<Self, CollectorError> {
        let invalid = |reason: String| CollectorError::InvalidNodeUrl {
            url: base_url.to_string(),
            reason,
        };

        let mut base = Url::parse(base_url.trim()).map_err(|e| invalid(e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {:?}", base.scheme())));
        }
        if base.cannot_be_a_base() || base.host_str().is_none() {
            return Err(invalid("missing host".to_string()));
        }

        // Url::join replaces the last path segment unless the path ends with '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let stats_url = base.join(NODE_STATS_PATH).map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base,
            stats_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn stats_url(&self) -> &Url {
        &self.stats_url
    }

    /// Fetch and decode `GET <base>/_node/stats`.
    ///
    /// The deadline bounds connect, headers and body read. No retries.
    pub async fn fetch(&self, deadline: Instant) -> Result<NodeStatsResponse, ScrapeError> {
        let payload = self.get(&self.stats_url, deadline).await?;
        debug!(url = %self.stats_url, bytes = payload.len(), "received node stats");
        Ok(NodeStatsResponse::from_slice(&payload)?)
    }

    /// Check that the node answers on its base URL.
    pub async fn ping(&self, deadline: Instant) -> Result<(), ScrapeError> {
        self.get(&self.base_url, deadline).await.map(|_| ())
    }

    async fn get(&self, url: &Url, deadline: Instant) -> Result<Bytes, ScrapeError> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(ScrapeError::Timeout);
        }

        let request = async {
            let response = self.client.get(url.clone()).timeout(remaining).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(ScrapeError::Protocol { status: status.as_u16() });
            }
            Ok::<_, ScrapeError>(response.bytes().await?)
        };

        timeout_at(deadline, request).await.unwrap_or(Err(ScrapeError::Timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: &str) -> Result<NodeClient, CollectorError> {
        NodeClient::new(reqwest::Client::new(), url)
    }

    #[test]
    fn test_stats_url_is_joined_onto_base() {
        let c = client("http://localhost:9600").expect("valid url");
        assert_eq!(c.stats_url().as_str(), "http://localhost:9600/_node/stats");
        assert_eq!(c.base_url().as_str(), "http://localhost:9600/");
    }

    #[test]
    fn test_base_path_is_preserved() {
        let c = client("https://proxy.internal/logstash-a").expect("valid url");
        assert_eq!(c.stats_url().as_str(), "https://proxy.internal/logstash-a/_node/stats");

        let c = client("https://proxy.internal/logstash-a/").expect("valid url");
        assert_eq!(c.stats_url().as_str(), "https://proxy.internal/logstash-a/_node/stats");
    }

    #[test]
    fn test_invalid_urls_are_rejected() {
        for url in ["", "localhost:9600", "ftp://localhost:9600", "not a url", "mailto:ops@example.com"] {
            let err = client(url).expect_err("url must be rejected");
            assert!(matches!(err, CollectorError::InvalidNodeUrl { .. }), "{url}: {err}");
        }
    }

    #[tokio::test]
    async fn test_expired_deadline_times_out_without_io() {
        let c = client("http://192.0.2.1:9600").expect("valid url");
        let err = c.fetch(Instant::now()).await.expect_err("deadline already passed");
        assert_eq!(err, ScrapeError::Timeout);
    }
}
