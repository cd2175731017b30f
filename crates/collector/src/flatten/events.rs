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

//! Node-wide events, flow, reloads and queue totals.

use super::{NODE_LABELS, push_flow};
use logstash_metrics::{MetricDescriptor, PrometheusMetric};
use logstash_responses::NodeStatsResponse;
use std::borrow::Cow;

const EVENTS_IN: MetricDescriptor =
    MetricDescriptor::counter("logstash_stats_events_in", "Number of events received by the node", NODE_LABELS);
const EVENTS_FILTERED: MetricDescriptor =
    MetricDescriptor::counter("logstash_stats_events_filtered", "Number of events filtered by the node", NODE_LABELS);
const EVENTS_OUT: MetricDescriptor =
    MetricDescriptor::counter("logstash_stats_events_out", "Number of events emitted by the node", NODE_LABELS);
const EVENTS_DURATION: MetricDescriptor = MetricDescriptor::counter(
    "logstash_stats_events_duration_millis",
    "Time spent processing events in milliseconds",
    NODE_LABELS,
);
const EVENTS_QUEUE_PUSH_DURATION: MetricDescriptor = MetricDescriptor::counter(
    "logstash_stats_events_queue_push_duration_millis",
    "Time spent pushing events into the queue in milliseconds",
    NODE_LABELS,
);

const FLOW_INPUT_CURRENT: MetricDescriptor =
    MetricDescriptor::gauge("logstash_stats_flow_input_current", "Current input throughput in events per second", NODE_LABELS);
const FLOW_INPUT_LIFETIME: MetricDescriptor =
    MetricDescriptor::gauge("logstash_stats_flow_input_lifetime", "Lifetime input throughput in events per second", NODE_LABELS);
const FLOW_FILTER_CURRENT: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_flow_filter_current",
    "Current filter throughput in events per second",
    NODE_LABELS,
);
const FLOW_FILTER_LIFETIME: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_flow_filter_lifetime",
    "Lifetime filter throughput in events per second",
    NODE_LABELS,
);
const FLOW_OUTPUT_CURRENT: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_flow_output_current",
    "Current output throughput in events per second",
    NODE_LABELS,
);
const FLOW_OUTPUT_LIFETIME: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_flow_output_lifetime",
    "Lifetime output throughput in events per second",
    NODE_LABELS,
);
const FLOW_BACKPRESSURE_CURRENT: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_flow_queue_backpressure_current",
    "Current ratio of time spent blocked on queue writes",
    NODE_LABELS,
);
const FLOW_BACKPRESSURE_LIFETIME: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_flow_queue_backpressure_lifetime",
    "Lifetime ratio of time spent blocked on queue writes",
    NODE_LABELS,
);
const FLOW_WORKER_CONCURRENCY_CURRENT: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_flow_worker_concurrency_current",
    "Current average number of busy workers",
    NODE_LABELS,
);
const FLOW_WORKER_CONCURRENCY_LIFETIME: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_flow_worker_concurrency_lifetime",
    "Lifetime average number of busy workers",
    NODE_LABELS,
);

const RELOADS_SUCCESSES: MetricDescriptor = MetricDescriptor::counter(
    "logstash_stats_reloads_successes",
    "Number of successful pipeline reloads",
    NODE_LABELS,
);
const RELOADS_FAILURES: MetricDescriptor =
    MetricDescriptor::counter("logstash_stats_reloads_failures", "Number of failed pipeline reloads", NODE_LABELS);
const QUEUE_EVENTS_COUNT: MetricDescriptor =
    MetricDescriptor::gauge("logstash_stats_queue_events_count", "Number of events in the queue", NODE_LABELS);

pub(crate) const DESCRIPTORS: &[MetricDescriptor] = &[
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
    RELOADS_SUCCESSES,
    RELOADS_FAILURES,
    QUEUE_EVENTS_COUNT,
];

pub(crate) fn collect(stats: &NodeStatsResponse, host: &Cow<'static, str>, out: &mut Vec<PrometheusMetric>) {
    let labels = [host.clone()];
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

    out.push(RELOADS_SUCCESSES.sample(stats.reloads.successes as f64, &labels));
    out.push(RELOADS_FAILURES.sample(stats.reloads.failures as f64, &labels));
    out.push(QUEUE_EVENTS_COUNT.sample(stats.queue.events_count as f64, &labels));
}
