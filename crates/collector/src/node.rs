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

use crate::{NodeClient, ScrapeOutcome, flatten};
use logstash_metrics::PrometheusMetric;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Scrapes and flattens one configured node.
#[derive(Debug, Clone)]
pub struct NodeCollector {
    client: NodeClient,
    hostname: String,
}

impl NodeCollector {
    /// `hostname` is the configured URL, used verbatim as the label value.
    pub fn new(client: NodeClient, hostname: impl Into<String>) -> Self {
        Self {
            client,
            hostname: hostname.into(),
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn client(&self) -> &NodeClient {
        &self.client
    }

    /// Scrape the node once. Never fails: transport and decode errors come
    /// back as a failure outcome with no samples.
    pub async fn collect(&self, deadline: Instant) -> (Vec<PrometheusMetric>, ScrapeOutcome) {
        let started = Instant::now();

        match self.client.fetch(deadline).await {
            Ok(stats) => {
                let samples = flatten::node_stats(&stats, &self.hostname);
                let elapsed = started.elapsed();
                debug!(
                    hostname = %self.hostname,
                    samples = samples.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "scraped logstash node"
                );
                (samples, ScrapeOutcome::success(elapsed))
            }
            Err(err) => {
                warn!(
                    hostname = %self.hostname,
                    error_kind = err.kind(),
                    error = %err,
                    "failed to scrape logstash node"
                );
                (Vec::new(), ScrapeOutcome::failure(started.elapsed(), err))
            }
        }
    }
}
