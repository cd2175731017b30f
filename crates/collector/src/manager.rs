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

//! Concurrent collection across every configured node.

use crate::flatten::{self, HOSTNAME_LABEL};
use crate::{CollectorError, NodeClient, NodeCollector, NodeOutcome, ScrapeError, ScrapeOutcome, build_http_client};
use async_trait::async_trait;
use atomic_enum::atomic_enum;
use futures::future::join_all;
use logstash_metrics::{Collector, MetricDescriptor, PrometheusMetric};
use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, error, warn};

const UP: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_exporter_up",
    "Whether the last scrape of the Logstash node succeeded (1) or failed (0)",
    &[HOSTNAME_LABEL],
);
const SCRAPE_DURATION: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_exporter_scrape_duration_seconds",
    "Duration of the last scrape of the Logstash node in seconds",
    &[HOSTNAME_LABEL],
);

/// Phase of the collection cycle currently running on a manager.
#[atomic_enum]
#[derive(PartialEq)]
pub enum CycleState {
    Idle,
    FanningOut,
    Merging,
}

/// Merged samples of one cycle plus the outcome of every node.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub samples: Vec<PrometheusMetric>,
    pub outcomes: Vec<NodeOutcome>,
}

type NodeResult = (Vec<PrometheusMetric>, ScrapeOutcome);

/// Resets the cycle state when a cycle ends, including when the caller
/// drops the cycle future mid-flight.
struct CycleGuard<'a>(&'a AtomicCycleState);

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.0.store(CycleState::Idle, Ordering::SeqCst);
    }
}

/// Owns the configured nodes and runs collection cycles over them.
pub struct CollectorManager {
    collectors: Vec<NodeCollector>,
    timeout: Duration,
    state: AtomicCycleState,
    cycle_gate: Mutex<()>,
}

impl CollectorManager {
    /// Build a manager for `nodes`, validating every URL.
    ///
    /// Each URL becomes a `hostname` label, so a URL listed twice is
    /// rejected. No network I/O happens here.
    pub fn new(nodes: Vec<String>, timeout: Duration) -> Result<Self, CollectorError> {
        if nodes.is_empty() {
            return Err(CollectorError::NoNodesConfigured);
        }
        let mut seen = HashSet::with_capacity(nodes.len());
        if let Some(url) = nodes.iter().find(|url| !seen.insert(url.as_str())) {
            return Err(CollectorError::DuplicateNode { url: url.clone() });
        }

        let http = build_http_client()?;
        let collectors = nodes
            .into_iter()
            .map(|url| {
                let client = NodeClient::new(http.clone(), &url)?;
                Ok(NodeCollector::new(client, url))
            })
            .collect::<Result<Vec<_>, CollectorError>>()?;

        Ok(Self {
            collectors,
            timeout,
            state: AtomicCycleState::new(CycleState::Idle),
            cycle_gate: Mutex::new(()),
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.collectors.iter().map(NodeCollector::hostname)
    }

    pub fn state(&self) -> CycleState {
        self.state.load(Ordering::SeqCst)
    }

    /// Every family a cycle can emit. Static, independent of the nodes.
    pub fn descriptors() -> Vec<MetricDescriptor> {
        let mut descriptors = flatten::descriptors();
        descriptors.extend([UP, SCRAPE_DURATION]);
        descriptors
    }

    /// Run one cycle and return only the merged samples.
    pub async fn collect_cycle(&self, deadline: Instant) -> Vec<PrometheusMetric> {
        self.run_cycle(deadline).await.samples
    }

    /// Scrape every node concurrently under one shared deadline.
    ///
    /// Cycles are serialized: a call made while another cycle runs waits for
    /// it to finish. Every node contributes exactly one `up` and one duration
    /// sample, whatever happened to it.
    pub async fn run_cycle(&self, deadline: Instant) -> CycleReport {
        let _gate = self.cycle_gate.lock().await;
        self.fan_out(deadline).await
    }

    /// Like [`run_cycle`](Self::run_cycle), but the deadline is `timeout`
    /// from the moment this cycle gets its turn, so time spent queued behind
    /// another cycle does not count against the nodes.
    pub async fn run_cycle_for(&self, timeout: Duration) -> CycleReport {
        let _gate = self.cycle_gate.lock().await;
        self.fan_out(Instant::now() + timeout).await
    }

    // Caller holds the cycle gate.
    async fn fan_out(&self, deadline: Instant) -> CycleReport {
        let _guard = CycleGuard(&self.state);
        let started = Instant::now();

        self.state.store(CycleState::FanningOut, Ordering::SeqCst);
        let mut tasks = JoinSet::new();
        for (index, collector) in self.collectors.iter().cloned().enumerate() {
            tasks.spawn(async move {
                let scrape_started = Instant::now();
                let result = match timeout_at(deadline, collector.collect(deadline)).await {
                    Ok(result) => result,
                    Err(_) => {
                        warn!(
                            hostname = collector.hostname(),
                            error_kind = ScrapeError::Timeout.kind(),
                            "logstash node did not answer before the scrape deadline"
                        );
                        (Vec::new(), ScrapeOutcome::failure(scrape_started.elapsed(), ScrapeError::Timeout))
                    }
                };
                (index, result)
            });
        }

        let mut results: Vec<Option<NodeResult>> = vec![None; self.collectors.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(err) => error!(error = %err, "scrape task terminated abnormally"),
            }
        }

        self.state.store(CycleState::Merging, Ordering::SeqCst);
        let mut samples = Vec::new();
        let mut outcomes = Vec::with_capacity(self.collectors.len());
        for (collector, result) in self.collectors.iter().zip(results) {
            let (node_samples, outcome) = result.unwrap_or_else(|| {
                (
                    Vec::new(),
                    ScrapeOutcome::failure(started.elapsed(), ScrapeError::unreachable("scrape task aborted")),
                )
            });

            let labels = [Cow::Owned(collector.hostname().to_string())];
            samples.extend(node_samples);
            samples.push(UP.sample(if outcome.success { 1.0 } else { 0.0 }, &labels));
            samples.push(SCRAPE_DURATION.sample(outcome.duration.as_secs_f64(), &labels));
            outcomes.push(NodeOutcome {
                hostname: collector.hostname().to_string(),
                outcome,
            });
        }

        debug!(
            nodes = outcomes.len(),
            healthy = outcomes.iter().filter(|o| o.outcome.success).count(),
            samples = samples.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "collection cycle finished"
        );

        CycleReport { samples, outcomes }
    }

    /// Ping every node concurrently. Returns the failing nodes, if any.
    pub async fn healthcheck(&self, deadline: Instant) -> Result<(), Vec<(String, ScrapeError)>> {
        let checks = self.collectors.iter().map(|collector| async move {
            let result = collector.client().ping(deadline).await;
            (collector.hostname().to_string(), result)
        });

        let failures: Vec<(String, ScrapeError)> = join_all(checks)
            .await
            .into_iter()
            .filter_map(|(hostname, result)| result.err().map(|err| (hostname, err)))
            .collect();

        if failures.is_empty() { Ok(()) } else { Err(failures) }
    }
}

#[async_trait]
impl Collector for CollectorManager {
    fn describe(&self) -> Vec<MetricDescriptor> {
        Self::descriptors()
    }

    async fn collect(&self) -> Vec<PrometheusMetric> {
        self.run_cycle_for(self.timeout).await.samples
    }
}
