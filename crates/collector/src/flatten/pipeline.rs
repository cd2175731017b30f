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

//! Per-pipeline and per-plugin metrics.
//!
//! Pipeline samples carry `hostname` and `pipeline`. Plugin samples add
//! `plugin_type` (`input`, `codec`, `filter` or `output`), `plugin` (the
//! plugin name) and `plugin_id`. Document and bulk request counters are only
//! emitted for outputs, the only plugins that report them.

use super::push_flow;
use logstash_metrics::{MetricDescriptor, PrometheusMetric};
use logstash_responses::{PipelineStats, PluginStats};
use std::borrow::Cow;

const PIPELINE_LABELS: &[&str] = &["hostname", "pipeline"];
const PLUGIN_LABELS: &[&str] = &["hostname", "pipeline", "plugin_type", "plugin", "plugin_id"];
const RESPONSE_LABELS: &[&str] = &["hostname", "pipeline", "plugin_type", "plugin", "plugin_id", "status"];

const UP: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_pipeline_up",
    "Whether the pipeline is up (1) or its last reload failed (0)",
    PIPELINE_LABELS,
);

const EVENTS_IN: MetricDescriptor =
    MetricDescriptor::counter("logstash_stats_pipeline_events_in", "Number of events received by the pipeline", PIPELINE_LABELS);
const EVENTS_FILTERED: MetricDescriptor = MetricDescriptor::counter(
    "logstash_stats_pipeline_events_filtered",
    "Number of events filtered by the pipeline",
    PIPELINE_LABELS,
);
const EVENTS_OUT: MetricDescriptor =
    MetricDescriptor::counter("logstash_stats_pipeline_events_out", "Number of events emitted by the pipeline", PIPELINE_LABELS);
const EVENTS_DURATION: MetricDescriptor = MetricDescriptor::counter(
    "logstash_stats_pipeline_events_duration_millis",
    "Time spent processing events in the pipeline in milliseconds",
    PIPELINE_LABELS,
);
const EVENTS_QUEUE_PUSH_DURATION: MetricDescriptor = MetricDescriptor::counter(
    "logstash_stats_pipeline_events_queue_push_duration_millis",
    "Time spent pushing events into the pipeline queue in milliseconds",
    PIPELINE_LABELS,
);

const FLOW_INPUT_CURRENT: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_pipeline_flow_input_current",
    "Current input throughput of the pipeline in events per second",
    PIPELINE_LABELS,
);
const FLOW_INPUT_LIFETIME: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_pipeline_flow_input_lifetime",
    "Lifetime input throughput of the pipeline in events per second",
    PIPELINE_LABELS,
);
const FLOW_FILTER_CURRENT: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_pipeline_flow_filter_current",
    "Current filter throughput of the pipeline in events per second",
    PIPELINE_LABELS,
);
const FLOW_FILTER_LIFETIME: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_pipeline_flow_filter_lifetime",
    "Lifetime filter throughput of the pipeline in events per second",
    PIPELINE_LABELS,
);
const FLOW_OUTPUT_CURRENT: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_pipeline_flow_output_current",
    "Current output throughput of the pipeline in events per second",
    PIPELINE_LABELS,
);
const FLOW_OUTPUT_LIFETIME: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_pipeline_flow_output_lifetime",
    "Lifetime output throughput of the pipeline in events per second",
    PIPELINE_LABELS,
);
const FLOW_BACKPRESSURE_CURRENT: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_pipeline_flow_queue_backpressure_current",
    "Current ratio of time the pipeline spent blocked on queue writes",
    PIPELINE_LABELS,
);
const FLOW_BACKPRESSURE_LIFETIME: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_pipeline_flow_queue_backpressure_lifetime",
    "Lifetime ratio of time the pipeline spent blocked on queue writes",
    PIPELINE_LABELS,
);
const FLOW_WORKER_CONCURRENCY_CURRENT: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_pipeline_flow_worker_concurrency_current",
    "Current average number of busy pipeline workers",
    PIPELINE_LABELS,
);
const FLOW_WORKER_CONCURRENCY_LIFETIME: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_pipeline_flow_worker_concurrency_lifetime",
    "Lifetime average number of busy pipeline workers",
    PIPELINE_LABELS,
);
const FLOW_WORKER_UTILIZATION_CURRENT: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_pipeline_flow_worker_utilization_current",
    "Current percentage of available worker capacity in use",
    PIPELINE_LABELS,
);
const FLOW_WORKER_UTILIZATION_LIFETIME: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_pipeline_flow_worker_utilization_lifetime",
    "Lifetime percentage of available worker capacity in use",
    PIPELINE_LABELS,
);

const RELOADS_SUCCESSES: MetricDescriptor = MetricDescriptor::counter(
    "logstash_stats_pipeline_reloads_successes",
    "Number of successful reloads of the pipeline",
    PIPELINE_LABELS,
);
const RELOADS_FAILURES: MetricDescriptor = MetricDescriptor::counter(
    "logstash_stats_pipeline_reloads_failures",
    "Number of failed reloads of the pipeline",
    PIPELINE_LABELS,
);
const RELOADS_LAST_SUCCESS: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_pipeline_reloads_last_success_timestamp",
    "Unix timestamp of the last successful reload in seconds",
    PIPELINE_LABELS,
);
const RELOADS_LAST_FAILURE: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_pipeline_reloads_last_failure_timestamp",
    "Unix timestamp of the last failed reload in seconds",
    PIPELINE_LABELS,
);

const QUEUE_EVENTS_COUNT: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_pipeline_queue_events_count",
    "Number of events in the pipeline queue",
    PIPELINE_LABELS,
);
const QUEUE_SIZE: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_pipeline_queue_size_bytes",
    "Size of the pipeline queue in bytes",
    PIPELINE_LABELS,
);
const QUEUE_MAX_SIZE: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_pipeline_queue_max_size_bytes",
    "Maximum size of the pipeline queue in bytes",
    PIPELINE_LABELS,
);

const DLQ_SIZE: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_pipeline_dead_letter_queue_size_bytes",
    "Size of the dead letter queue in bytes",
    PIPELINE_LABELS,
);
const DLQ_MAX_SIZE: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_pipeline_dead_letter_queue_max_size_bytes",
    "Maximum size of the dead letter queue in bytes",
    PIPELINE_LABELS,
);
const DLQ_DROPPED_EVENTS: MetricDescriptor = MetricDescriptor::counter(
    "logstash_stats_pipeline_dead_letter_queue_dropped_events",
    "Number of events dropped by the dead letter queue",
    PIPELINE_LABELS,
);
const DLQ_EXPIRED_EVENTS: MetricDescriptor = MetricDescriptor::counter(
    "logstash_stats_pipeline_dead_letter_queue_expired_events",
    "Number of events expired from the dead letter queue",
    PIPELINE_LABELS,
);

const PLUGIN_EVENTS_IN: MetricDescriptor = MetricDescriptor::counter(
    "logstash_stats_pipeline_plugin_events_in",
    "Number of events received by the plugin",
    PLUGIN_LABELS,
);
const PLUGIN_EVENTS_OUT: MetricDescriptor = MetricDescriptor::counter(
    "logstash_stats_pipeline_plugin_events_out",
    "Number of events emitted by the plugin",
    PLUGIN_LABELS,
);
const PLUGIN_EVENTS_DURATION: MetricDescriptor = MetricDescriptor::counter(
    "logstash_stats_pipeline_plugin_events_duration_millis",
    "Time spent processing events in the plugin in milliseconds",
    PLUGIN_LABELS,
);
const PLUGIN_EVENTS_QUEUE_PUSH_DURATION: MetricDescriptor = MetricDescriptor::counter(
    "logstash_stats_pipeline_plugin_events_queue_push_duration_millis",
    "Time the plugin spent pushing events into the queue in milliseconds",
    PLUGIN_LABELS,
);
const PLUGIN_DOCUMENTS_SUCCESSES: MetricDescriptor = MetricDescriptor::counter(
    "logstash_stats_pipeline_plugin_documents_successes",
    "Number of documents successfully indexed by the output",
    PLUGIN_LABELS,
);
const PLUGIN_DOCUMENTS_NON_RETRYABLE_FAILURES: MetricDescriptor = MetricDescriptor::counter(
    "logstash_stats_pipeline_plugin_documents_non_retryable_failures",
    "Number of documents the output failed to index without retry",
    PLUGIN_LABELS,
);
const PLUGIN_BULK_SUCCESSES: MetricDescriptor = MetricDescriptor::counter(
    "logstash_stats_pipeline_plugin_bulk_requests_successes",
    "Number of successful bulk requests",
    PLUGIN_LABELS,
);
const PLUGIN_BULK_FAILURES: MetricDescriptor = MetricDescriptor::counter(
    "logstash_stats_pipeline_plugin_bulk_requests_failures",
    "Number of failed bulk requests",
    PLUGIN_LABELS,
);
const PLUGIN_BULK_WITH_ERRORS: MetricDescriptor = MetricDescriptor::counter(
    "logstash_stats_pipeline_plugin_bulk_requests_with_errors",
    "Number of bulk requests answered with item errors",
    PLUGIN_LABELS,
);
const PLUGIN_BULK_RESPONSES: MetricDescriptor = MetricDescriptor::counter(
    "logstash_stats_pipeline_plugin_bulk_requests_responses",
    "Number of bulk responses by HTTP status code",
    RESPONSE_LABELS,
);

pub(crate) const DESCRIPTORS: &[MetricDescriptor] = &[
    UP,
    EVENTS_IN,
    EVENTS_FILTERED,
    EVENTS_OUT,
    EVENTS_DURATION,
    EVENTS_QUEUE_PUSH_DURATION,
    FLOW_INPUT_CURRENT,
    FLOW_INPUT_LIFETIME,
    FLOW_FILTER_CURRENT,
    FLOW_FILTER_LIFETIME,
    FLOW_OUTPUT_CURRENT,
    FLOW_OUTPUT_LIFETIME,
    FLOW_BACKPRESSURE_CURRENT,
    FLOW_BACKPRESSURE_LIFETIME,
    FLOW_WORKER_CONCURRENCY_CURRENT,
    FLOW_WORKER_CONCURRENCY_LIFETIME,
    FLOW_WORKER_UTILIZATION_CURRENT,
    FLOW_WORKER_UTILIZATION_LIFETIME,
    RELOADS_SUCCESSES,
    RELOADS_FAILURES,
    RELOADS_LAST_SUCCESS,
    RELOADS_LAST_FAILURE,
    QUEUE_EVENTS_COUNT,
    QUEUE_SIZE,
    QUEUE_MAX_SIZE,
    DLQ_SIZE,
    DLQ_MAX_SIZE,
    DLQ_DROPPED_EVENTS,
    DLQ_EXPIRED_EVENTS,
    PLUGIN_EVENTS_IN,
    PLUGIN_EVENTS_OUT,
    PLUGIN_EVENTS_DURATION,
    PLUGIN_EVENTS_QUEUE_PUSH_DURATION,
    PLUGIN_DOCUMENTS_SUCCESSES,
    PLUGIN_DOCUMENTS_NON_RETRYABLE_FAILURES,
    PLUGIN_BULK_SUCCESSES,
    PLUGIN_BULK_FAILURES,
    PLUGIN_BULK_WITH_ERRORS,
    PLUGIN_BULK_RESPONSES,
];

pub(crate) fn collect(name: &str, stats: &PipelineStats, host: &Cow<'static, str>, out: &mut Vec<PrometheusMetric>) {
    let pipeline: Cow<'static, str> = Cow::Owned(name.to_string());
    let labels = [host.clone(), pipeline.clone()];

    out.push(UP.sample(if stats.reloads.is_up() { 1.0 } else { 0.0 }, &labels));

    let events = &stats.events;
    out.push(EVENTS_IN.sample(events.r#in as f64, &labels));
    out.push(EVENTS_FILTERED.sample(events.filtered as f64, &labels));
    out.push(EVENTS_OUT.sample(events.out as f64, &labels));
    out.push(EVENTS_DURATION.sample(events.duration_in_millis as f64, &labels));
    out.push(EVENTS_QUEUE_PUSH_DURATION.sample(events.queue_push_duration_in_millis as f64, &labels));

    let flow = &stats.flow;
    push_flow(out, (&FLOW_INPUT_CURRENT, &FLOW_INPUT_LIFETIME), &flow.input_throughput, &labels);
    push_flow(out, (&FLOW_FILTER_CURRENT, &FLOW_FILTER_LIFETIME), &flow.filter_throughput, &labels);
    push_flow(out, (&FLOW_OUTPUT_CURRENT, &FLOW_OUTPUT_LIFETIME), &flow.output_throughput, &labels);
    push_flow(out, (&FLOW_BACKPRESSURE_CURRENT, &FLOW_BACKPRESSURE_LIFETIME), &flow.queue_backpressure, &labels);
    push_flow(
        out,
        (&FLOW_WORKER_CONCURRENCY_CURRENT, &FLOW_WORKER_CONCURRENCY_LIFETIME),
        &flow.worker_concurrency,
        &labels,
    );
    push_flow(
        out,
        (&FLOW_WORKER_UTILIZATION_CURRENT, &FLOW_WORKER_UTILIZATION_LIFETIME),
        &flow.worker_utilization,
        &labels,
    );

    let reloads = &stats.reloads;
    out.push(RELOADS_SUCCESSES.sample(reloads.successes as f64, &labels));
    out.push(RELOADS_FAILURES.sample(reloads.failures as f64, &labels));
    if let Some(ts) = reloads.last_success() {
        out.push(RELOADS_LAST_SUCCESS.sample(ts.timestamp() as f64, &labels));
    }
    if let Some(ts) = reloads.last_failure() {
        out.push(RELOADS_LAST_FAILURE.sample(ts.timestamp() as f64, &labels));
    }

    let queue = &stats.queue;
    out.push(QUEUE_EVENTS_COUNT.sample(queue.events_count as f64, &labels));
    out.push(QUEUE_SIZE.sample(queue.queue_size_in_bytes as f64, &labels));
    out.push(QUEUE_MAX_SIZE.sample(queue.max_queue_size_in_bytes as f64, &labels));

    let dlq = &stats.dead_letter_queue;
    out.push(DLQ_SIZE.sample(dlq.queue_size_in_bytes as f64, &labels));
    out.push(DLQ_MAX_SIZE.sample(dlq.max_queue_size_in_bytes as f64, &labels));
    out.push(DLQ_DROPPED_EVENTS.sample(dlq.dropped_events as f64, &labels));
    out.push(DLQ_EXPIRED_EVENTS.sample(dlq.expired_events as f64, &labels));

    for (plugin_type, plugin) in stats.plugins.iter() {
        collect_plugin(plugin_type, plugin, &labels, out);
    }
}

fn collect_plugin(
    plugin_type: &'static str,
    plugin: &PluginStats,
    pipeline_labels: &[Cow<'static, str>; 2],
    out: &mut Vec<PrometheusMetric>,
) {
    let [host, pipeline] = pipeline_labels;
    let labels = [
        host.clone(),
        pipeline.clone(),
        Cow::Borrowed(plugin_type),
        Cow::Owned(plugin.name.clone()),
        Cow::Owned(plugin.id.clone()),
    ];

    let events = &plugin.events;
    out.push(PLUGIN_EVENTS_IN.sample(events.r#in as f64, &labels));
    out.push(PLUGIN_EVENTS_OUT.sample(events.out as f64, &labels));
    out.push(PLUGIN_EVENTS_DURATION.sample(events.duration_in_millis as f64, &labels));
    out.push(PLUGIN_EVENTS_QUEUE_PUSH_DURATION.sample(events.queue_push_duration_in_millis as f64, &labels));

    if plugin_type != "output" {
        return;
    }

    out.push(PLUGIN_DOCUMENTS_SUCCESSES.sample(plugin.documents.successes as f64, &labels));
    out.push(PLUGIN_DOCUMENTS_NON_RETRYABLE_FAILURES.sample(plugin.documents.non_retryable_failures as f64, &labels));

    let bulk = &plugin.bulk_requests;
    out.push(PLUGIN_BULK_SUCCESSES.sample(bulk.successes as f64, &labels));
    out.push(PLUGIN_BULK_FAILURES.sample(bulk.failures as f64, &labels));
    out.push(PLUGIN_BULK_WITH_ERRORS.sample(bulk.with_errors as f64, &labels));
    for (status, count) in &bulk.responses {
        let mut response_labels = labels.to_vec();
        response_labels.push(Cow::Owned(status.clone()));
        out.push(PLUGIN_BULK_RESPONSES.sample(*count as f64, &response_labels));
    }
}
