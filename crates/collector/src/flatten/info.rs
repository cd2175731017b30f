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

//! Node identity, status and pipeline defaults.

use super::NODE_LABELS;
use logstash_metrics::{MetricDescriptor, PrometheusMetric};
use logstash_responses::NodeStatsResponse;
use std::borrow::Cow;

const NODE: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_info_node",
    "A metric with a constant '1' value labeled by node name, version, host, http_address, and id",
    &["hostname", "name", "id", "version", "host", "http_address"],
);
const STATUS: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_info_status",
    "A metric with a constant '1' value labeled by the node status",
    &["hostname", "status"],
);
const PIPELINE_WORKERS: MetricDescriptor =
    MetricDescriptor::gauge("logstash_info_pipeline_workers", "Default number of pipeline workers", NODE_LABELS);
const PIPELINE_BATCH_SIZE: MetricDescriptor =
    MetricDescriptor::gauge("logstash_info_pipeline_batch_size", "Default pipeline batch size", NODE_LABELS);
const PIPELINE_BATCH_DELAY: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_info_pipeline_batch_delay",
    "Default pipeline batch delay in milliseconds",
    NODE_LABELS,
);

pub(crate) const DESCRIPTORS: &[MetricDescriptor] =
    &[NODE, STATUS, PIPELINE_WORKERS, PIPELINE_BATCH_SIZE, PIPELINE_BATCH_DELAY];

pub(crate) fn collect(stats: &NodeStatsResponse, host: &Cow<'static, str>, out: &mut Vec<PrometheusMetric>) {
    let owned = |value: &str| Cow::Owned(value.to_string());

    out.push(NODE.sample(
        1.0,
        &[
            host.clone(),
            owned(&stats.name),
            owned(&stats.id),
            owned(&stats.version),
            owned(&stats.host),
            owned(&stats.http_address),
        ],
    ));
    out.push(STATUS.sample(1.0, &[host.clone(), owned(&stats.status)]));

    let labels = [host.clone()];
    out.push(PIPELINE_WORKERS.sample(stats.pipeline.workers as f64, &labels));
    out.push(PIPELINE_BATCH_SIZE.sample(stats.pipeline.batch_size as f64, &labels));
    out.push(PIPELINE_BATCH_DELAY.sample(stats.pipeline.batch_delay as f64, &labels));
}
