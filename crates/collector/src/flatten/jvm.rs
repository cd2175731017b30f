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

//! JVM threads, heap, memory pools and garbage collectors.

use super::NODE_LABELS;
use logstash_metrics::{MetricDescriptor, PrometheusMetric};
use logstash_responses::JvmStats;
use std::borrow::Cow;

const POOL_LABELS: &[&str] = &["hostname", "pool"];
const GC_LABELS: &[&str] = &["hostname", "collector"];

const THREADS_COUNT: MetricDescriptor =
    MetricDescriptor::gauge("logstash_stats_jvm_threads_count", "Number of live JVM threads", NODE_LABELS);
const THREADS_PEAK_COUNT: MetricDescriptor =
    MetricDescriptor::gauge("logstash_stats_jvm_threads_peak_count", "Peak number of live JVM threads", NODE_LABELS);

const HEAP_USED_PERCENT: MetricDescriptor =
    MetricDescriptor::gauge("logstash_stats_jvm_mem_heap_used_percent", "Percentage of the heap in use", NODE_LABELS);
const HEAP_COMMITTED: MetricDescriptor =
    MetricDescriptor::gauge("logstash_stats_jvm_mem_heap_committed_bytes", "Committed heap memory in bytes", NODE_LABELS);
const HEAP_MAX: MetricDescriptor =
    MetricDescriptor::gauge("logstash_stats_jvm_mem_heap_max_bytes", "Maximum heap memory in bytes", NODE_LABELS);
const HEAP_USED: MetricDescriptor =
    MetricDescriptor::gauge("logstash_stats_jvm_mem_heap_used_bytes", "Used heap memory in bytes", NODE_LABELS);
const NON_HEAP_USED: MetricDescriptor =
    MetricDescriptor::gauge("logstash_stats_jvm_mem_non_heap_used_bytes", "Used non-heap memory in bytes", NODE_LABELS);
const NON_HEAP_COMMITTED: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_jvm_mem_non_heap_committed_bytes",
    "Committed non-heap memory in bytes",
    NODE_LABELS,
);

const POOL_USED: MetricDescriptor =
    MetricDescriptor::gauge("logstash_stats_jvm_mem_pool_used_bytes", "Used bytes in the memory pool", POOL_LABELS);
const POOL_PEAK_USED: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_jvm_mem_pool_peak_used_bytes",
    "Peak used bytes in the memory pool",
    POOL_LABELS,
);
const POOL_COMMITTED: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_jvm_mem_pool_committed_bytes",
    "Committed bytes in the memory pool",
    POOL_LABELS,
);
const POOL_MAX: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_jvm_mem_pool_max_bytes",
    "Maximum bytes of the memory pool, -1 when unbounded",
    POOL_LABELS,
);
const POOL_PEAK_MAX: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_jvm_mem_pool_peak_max_bytes",
    "Peak maximum bytes of the memory pool, -1 when unbounded",
    POOL_LABELS,
);

const GC_COLLECTION_COUNT: MetricDescriptor = MetricDescriptor::counter(
    "logstash_stats_jvm_gc_collection_count",
    "Number of garbage collections run by the collector",
    GC_LABELS,
);
const GC_COLLECTION_TIME: MetricDescriptor = MetricDescriptor::counter(
    "logstash_stats_jvm_gc_collection_time_millis",
    "Time spent in garbage collection by the collector in milliseconds",
    GC_LABELS,
);

const UPTIME: MetricDescriptor =
    MetricDescriptor::gauge("logstash_stats_jvm_uptime_millis", "JVM uptime in milliseconds", NODE_LABELS);

pub(crate) const DESCRIPTORS: &[MetricDescriptor] = &[
    THREADS_COUNT,
    THREADS_PEAK_COUNT,
    HEAP_USED_PERCENT,
    HEAP_COMMITTED,
    HEAP_MAX,
    HEAP_USED,
    NON_HEAP_USED,
    NON_HEAP_COMMITTED,
    POOL_USED,
    POOL_PEAK_USED,
    POOL_COMMITTED,
    POOL_MAX,
    POOL_PEAK_MAX,
    GC_COLLECTION_COUNT,
    GC_COLLECTION_TIME,
    UPTIME,
];

pub(crate) fn collect(jvm: &JvmStats, host: &Cow<'static, str>, out: &mut Vec<PrometheusMetric>) {
    let labels = [host.clone()];
    let mem = &jvm.mem;

    out.push(THREADS_COUNT.sample(jvm.threads.count as f64, &labels));
    out.push(THREADS_PEAK_COUNT.sample(jvm.threads.peak_count as f64, &labels));
    out.push(HEAP_USED_PERCENT.sample(mem.heap_used_percent, &labels));
    out.push(HEAP_COMMITTED.sample(mem.heap_committed_in_bytes as f64, &labels));
    out.push(HEAP_MAX.sample(mem.heap_max_in_bytes as f64, &labels));
    out.push(HEAP_USED.sample(mem.heap_used_in_bytes as f64, &labels));
    out.push(NON_HEAP_USED.sample(mem.non_heap_used_in_bytes as f64, &labels));
    out.push(NON_HEAP_COMMITTED.sample(mem.non_heap_committed_in_bytes as f64, &labels));

    for (pool_name, pool) in mem.pools.iter() {
        let labels = [host.clone(), Cow::Borrowed(pool_name)];
        out.push(POOL_USED.sample(pool.used_in_bytes as f64, &labels));
        out.push(POOL_PEAK_USED.sample(pool.peak_used_in_bytes as f64, &labels));
        out.push(POOL_COMMITTED.sample(pool.committed_in_bytes as f64, &labels));
        out.push(POOL_MAX.sample(pool.max_in_bytes as f64, &labels));
        out.push(POOL_PEAK_MAX.sample(pool.peak_max_in_bytes as f64, &labels));
    }

    for (collector_name, gc) in jvm.gc.collectors.iter() {
        let labels = [host.clone(), Cow::Borrowed(collector_name)];
        out.push(GC_COLLECTION_COUNT.sample(gc.collection_count as f64, &labels));
        out.push(GC_COLLECTION_TIME.sample(gc.collection_time_in_millis as f64, &labels));
    }

    out.push(UPTIME.sample(jvm.uptime_in_millis as f64, &labels));
}

#[cfg(test)]
mod tests {
    use super::*;
    use logstash_responses::{GcCollector, GcCollectors, JvmGc};

    #[test]
    fn test_gc_collectors_are_labeled() {
        let jvm = JvmStats {
            gc: JvmGc {
                collectors: GcCollectors {
                    young: GcCollector {
                        collection_count: 3,
                        collection_time_in_millis: 5,
                    },
                    old: GcCollector::default(),
                },
            },
            ..Default::default()
        };
        let mut out = Vec::new();
        collect(&jvm, &Cow::Borrowed("h"), &mut out);

        let young = out
            .iter()
            .find(|m| m.name == "logstash_stats_jvm_gc_collection_count" && m.label("collector") == Some("young"))
            .expect("young gc count");
        assert_eq!(young.value, 3.0);

        let old_time = out
            .iter()
            .find(|m| m.name == "logstash_stats_jvm_gc_collection_time_millis" && m.label("collector") == Some("old"))
            .expect("old gc time");
        assert_eq!(old_time.value, 0.0);
    }

    #[test]
    fn test_every_pool_is_emitted() {
        let mut out = Vec::new();
        collect(&JvmStats::default(), &Cow::Borrowed("h"), &mut out);

        let pools: Vec<_> = out
            .iter()
            .filter(|m| m.name == "logstash_stats_jvm_mem_pool_used_bytes")
            .filter_map(|m| m.label("pool"))
            .collect();
        assert_eq!(pools, vec!["young", "old", "survivor"]);
    }
}
