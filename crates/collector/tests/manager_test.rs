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

mod common;

use axum::http::StatusCode;
use common::{FIXTURE, MALFORMED, MINIMAL, NO_PIPELINES, slow_node, stats_node, status_node, unreachable_node};
use futures::future::join_all;
use logstash_collector::{CollectorManager, CycleState, ScrapeError, flatten};
use logstash_metrics::{Collector, PrometheusMetric, Registry};
use logstash_responses::NodeStatsResponse;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

const SLACK: Duration = Duration::from_millis(500);

fn manager(nodes: &[&str], timeout: Duration) -> CollectorManager {
    CollectorManager::new(nodes.iter().map(|n| n.to_string()).collect(), timeout).expect("valid manager")
}

fn samples_for<'a>(samples: &'a [PrometheusMetric], hostname: &str) -> Vec<&'a PrometheusMetric> {
    samples
        .iter()
        .filter(|s| s.label("hostname") == Some(hostname) && !s.name.starts_with("logstash_exporter_"))
        .collect()
}

fn sample_set<'a>(samples: impl IntoIterator<Item = &'a PrometheusMetric>) -> BTreeSet<String> {
    samples
        .into_iter()
        .map(|s| format!("{} {:?} {}", s.name, s.labels, s.value))
        .collect()
}

fn up_values(samples: &[PrometheusMetric]) -> HashMap<String, f64> {
    samples
        .iter()
        .filter(|s| s.name == "logstash_exporter_up")
        .map(|s| (s.label("hostname").unwrap_or_default().to_string(), s.value))
        .collect()
}

#[tokio::test]
async fn test_valid_slow_and_malformed_nodes() {
    let a = stats_node(NO_PIPELINES).await;
    let b = slow_node(Duration::from_secs(5)).await;
    let c = stats_node(MALFORMED).await;
    let timeout = Duration::from_millis(300);
    let manager = manager(&[&a, &b, &c], timeout);

    let started = Instant::now();
    let report = manager.run_cycle(started + timeout).await;
    assert!(started.elapsed() < timeout + SLACK, "cycle took {:?}", started.elapsed());

    let kinds: Vec<_> = report.outcomes.iter().map(|o| (o.hostname.as_str(), o.outcome.error_kind())).collect();
    assert_eq!(kinds, vec![(a.as_str(), None), (b.as_str(), Some("timeout")), (c.as_str(), Some("decode"))]);
    assert!(report.outcomes[0].outcome.success);

    let stats = NodeStatsResponse::from_slice(NO_PIPELINES.as_bytes()).expect("node a payload");
    let expected = flatten::node_stats(&stats, &a);
    assert!(!expected.is_empty());
    assert_eq!(sample_set(samples_for(&report.samples, &a)), sample_set(&expected));
    assert!(samples_for(&report.samples, &b).is_empty());
    assert!(samples_for(&report.samples, &c).is_empty());

    let up = up_values(&report.samples);
    assert_eq!(up.len(), 3);
    assert_eq!(up[&a], 1.0);
    assert_eq!(up[&b], 0.0);
    assert_eq!(up[&c], 0.0);

    let durations = report
        .samples
        .iter()
        .filter(|s| s.name == "logstash_exporter_scrape_duration_seconds")
        .count();
    assert_eq!(durations, 3);
}

#[tokio::test]
async fn test_unreachable_node_does_not_reduce_healthy_samples() {
    let healthy = stats_node(FIXTURE).await;
    let dead = unreachable_node().await;
    let deadline = || Instant::now() + Duration::from_secs(2);

    let alone = manager(&[&healthy], Duration::from_secs(2)).collect_cycle(deadline()).await;
    let mixed = manager(&[&dead, &healthy], Duration::from_secs(2)).collect_cycle(deadline()).await;

    assert_eq!(samples_for(&alone, &healthy), samples_for(&mixed, &healthy));

    let report = manager(&[&dead], Duration::from_secs(2)).run_cycle(deadline()).await;
    assert!(matches!(report.outcomes[0].outcome.error, Some(ScrapeError::Unreachable { .. })));
}

#[tokio::test]
async fn test_exactly_one_up_sample_per_node() {
    let nodes = [
        stats_node(MINIMAL).await,
        stats_node(FIXTURE).await,
        unreachable_node().await,
        status_node(StatusCode::SERVICE_UNAVAILABLE).await,
    ];
    let refs: Vec<&str> = nodes.iter().map(String::as_str).collect();
    let samples = manager(&refs, Duration::from_secs(2))
        .collect_cycle(Instant::now() + Duration::from_secs(2))
        .await;

    let up = up_values(&samples);
    assert_eq!(samples.iter().filter(|s| s.name == "logstash_exporter_up").count(), nodes.len());
    assert_eq!(up.values().filter(|v| **v == 1.0).count(), 2);
}

#[tokio::test]
async fn test_non_success_status_is_a_protocol_error() {
    let node = status_node(StatusCode::SERVICE_UNAVAILABLE).await;
    let report = manager(&[&node], Duration::from_secs(2))
        .run_cycle(Instant::now() + Duration::from_secs(2))
        .await;

    assert_eq!(report.outcomes[0].outcome.error, Some(ScrapeError::Protocol { status: 503 }));
}

#[tokio::test]
async fn test_repeated_cycles_yield_the_same_sample_set() {
    let node = stats_node(FIXTURE).await;
    let manager = manager(&[&node], Duration::from_secs(2));

    let names = |samples: Vec<PrometheusMetric>| -> BTreeSet<String> {
        samples
            .into_iter()
            .filter(|s| s.name != "logstash_exporter_scrape_duration_seconds")
            .map(|s| format!("{} {:?} {}", s.name, s.labels, s.value))
            .collect()
    };

    let first = names(manager.collect_cycle(Instant::now() + Duration::from_secs(2)).await);
    let second = names(manager.collect_cycle(Instant::now() + Duration::from_secs(2)).await);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_every_emitted_sample_is_described() {
    let node = stats_node(FIXTURE).await;
    let manager = manager(&[&node], Duration::from_secs(2));
    let described = manager.describe();

    for sample in manager.collect_cycle(Instant::now() + Duration::from_secs(2)).await {
        assert!(
            described.iter().any(|d| d.matches(&sample)),
            "{} {:?} is not described",
            sample.name,
            sample.labels
        );
    }
}

#[tokio::test]
async fn test_registry_renders_each_family_once() {
    let a = stats_node(FIXTURE).await;
    let b = stats_node(MINIMAL).await;
    let mut registry = Registry::new();
    registry
        .register(Arc::new(manager(&[&a, &b], Duration::from_secs(2))))
        .expect("register manager");

    let output = registry.render().await;

    assert_eq!(output.matches("# TYPE logstash_exporter_up gauge").count(), 1);
    assert_eq!(output.matches("# HELP logstash_stats_jvm_threads_count ").count(), 1);
    assert!(output.contains(&format!("logstash_exporter_up{{hostname=\"{a}\"}} 1")));
    assert!(output.contains(&format!("logstash_exporter_up{{hostname=\"{b}\"}} 1")));

    // both nodes' up samples sit directly below the family header
    let lines: Vec<&str> = output.lines().collect();
    let header = lines
        .iter()
        .position(|l| *l == "# TYPE logstash_exporter_up gauge")
        .expect("up family header");
    assert!(lines[header + 1].starts_with("logstash_exporter_up{"));
    assert!(lines[header + 2].starts_with("logstash_exporter_up{"));
}

#[tokio::test]
async fn test_cycle_state_transitions() {
    let node = slow_node(Duration::from_millis(400)).await;
    let manager = Arc::new(manager(&[&node], Duration::from_secs(2)));
    assert_eq!(manager.state(), CycleState::Idle);

    let running = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.run_cycle(Instant::now() + Duration::from_secs(2)).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(manager.state(), CycleState::FanningOut);

    let report = running.await.expect("cycle task");
    assert!(report.outcomes[0].outcome.success);
    assert_eq!(manager.state(), CycleState::Idle);
}

#[tokio::test]
async fn test_concurrent_cycles_are_serialized() {
    let node = slow_node(Duration::from_millis(200)).await;
    let manager = Arc::new(manager(&[&node], Duration::from_secs(2)));

    let started = Instant::now();
    let cycles = (0..2).map(|_| {
        let manager = manager.clone();
        tokio::spawn(async move { manager.run_cycle(Instant::now() + Duration::from_secs(2)).await })
    });
    let reports: Vec<_> = join_all(cycles).await.into_iter().map(|r| r.expect("cycle task")).collect();

    assert!(reports.iter().all(|r| r.outcomes[0].outcome.success));
    assert!(started.elapsed() >= Duration::from_millis(400), "cycles overlapped");
}

#[tokio::test]
async fn test_queued_scrape_gets_its_own_deadline() {
    let node = slow_node(Duration::from_millis(1200)).await;
    let manager = Arc::new(manager(&[&node], Duration::from_secs(2)));

    let scrapes = (0..2).map(|_| {
        let manager = manager.clone();
        tokio::spawn(async move { Collector::collect(manager.as_ref()).await })
    });
    for samples in join_all(scrapes).await {
        let up = up_values(&samples.expect("scrape task"));
        assert_eq!(up[&node], 1.0, "queued scrape reported a healthy node as down");
    }
}

#[tokio::test]
async fn test_run_cycle_for_starts_the_clock_after_queueing() {
    let node = slow_node(Duration::from_millis(300)).await;
    let manager = Arc::new(manager(&[&node], Duration::from_secs(2)));

    let first = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.run_cycle(Instant::now() + Duration::from_secs(2)).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    let queued = manager.run_cycle_for(Duration::from_millis(500)).await;

    assert!(first.await.expect("first cycle").outcomes[0].outcome.success);
    assert!(queued.outcomes[0].outcome.success);
}

#[tokio::test]
async fn test_duplicate_nodes_are_rejected() {
    let node = stats_node(MINIMAL).await;
    let err = CollectorManager::new(vec![node.clone(), node.clone()], Duration::from_secs(1)).err();
    assert!(matches!(err, Some(logstash_collector::CollectorError::DuplicateNode { ref url }) if *url == node));
}

#[tokio::test]
async fn test_healthcheck_reports_failing_nodes() {
    let healthy = stats_node(MINIMAL).await;
    let dead = unreachable_node().await;

    let ok = manager(&[&healthy], Duration::from_secs(1));
    assert!(ok.healthcheck(Instant::now() + Duration::from_secs(1)).await.is_ok());

    let mixed = manager(&[&healthy, &dead], Duration::from_secs(1));
    let failures = mixed
        .healthcheck(Instant::now() + Duration::from_secs(1))
        .await
        .expect_err("dead node must fail");
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, dead);
}
