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

//! Pure translation of a [`NodeStatsResponse`] into metric samples.
//!
//! Every family is declared up front as a `const` [`MetricDescriptor`] in
//! the submodule that emits it. Names follow `logstash_<subsystem>_<metric>`
//! and every sample carries the `hostname` label first.
//!
//! | Module       | Families                                                         |
//! |--------------|------------------------------------------------------------------|
//! | `info`       | `logstash_info_*`                                                |
//! | `jvm`        | `logstash_stats_jvm_*`                                           |
//! | `process`    | `logstash_stats_process_*`, `logstash_stats_os_cgroup_*`         |
//! | `events`     | `logstash_stats_{events,flow,reloads,queue}_*`                   |
//! | `pipeline`   | `logstash_stats_pipeline_*`, `logstash_stats_pipeline_plugin_*`  |

mod events;
mod info;
mod jvm;
mod pipeline;
mod process;

use logstash_metrics::{MetricDescriptor, PrometheusMetric};
use logstash_responses::{FlowRate, NodeStatsResponse};
use std::borrow::Cow;

pub const HOSTNAME_LABEL: &str = "hostname";

pub(crate) const NODE_LABELS: &[&str] = &[HOSTNAME_LABEL];

/// Every family the flattening functions can emit.
pub fn descriptors() -> Vec<MetricDescriptor> {
    [
        info::DESCRIPTORS,
        jvm::DESCRIPTORS,
        process::DESCRIPTORS,
        events::DESCRIPTORS,
        pipeline::DESCRIPTORS,
    ]
    .concat()
}

/// Flatten one node's stats. `hostname` is the node's configured URL.
#[must_use]
pub fn node_stats(stats: &NodeStatsResponse, hostname: &str) -> Vec<PrometheusMetric> {
    let host: Cow<'static, str> = Cow::Owned(hostname.to_string());
    let mut out = Vec::with_capacity(256);

    info::collect(stats, &host, &mut out);
    jvm::collect(&stats.jvm, &host, &mut out);
    process::collect(stats, &host, &mut out);
    events::collect(stats, &host, &mut out);
    for (name, pipeline_stats) in &stats.pipelines {
        pipeline::collect(name, pipeline_stats, &host, &mut out);
    }

    out
}

/// Emit `current` and `lifetime` samples of one flow rate.
pub(crate) fn push_flow(
    out: &mut Vec<PrometheusMetric>,
    (current, lifetime): (&MetricDescriptor, &MetricDescriptor),
    rate: &FlowRate,
    labels: &[Cow<'static, str>],
) {
    out.push(current.sample(rate.current, labels));
    out.push(lifetime.sample(rate.lifetime, labels));
}
