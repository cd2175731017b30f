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

//! Process descriptors, memory, CPU and the OS cgroup section.

use super::NODE_LABELS;
use logstash_metrics::{MetricDescriptor, PrometheusMetric};
use logstash_responses::NodeStatsResponse;
use std::borrow::Cow;

const OPEN_FDS: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_process_open_file_descriptors",
    "Number of open file descriptors",
    NODE_LABELS,
);
const PEAK_OPEN_FDS: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_process_peak_open_file_descriptors",
    "Peak number of open file descriptors",
    NODE_LABELS,
);
const MAX_FDS: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_process_max_file_descriptors",
    "Limit of open file descriptors",
    NODE_LABELS,
);
const MEM_TOTAL_VIRTUAL: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_process_mem_total_virtual_bytes",
    "Total virtual memory of the process in bytes",
    NODE_LABELS,
);
const CPU_PERCENT: MetricDescriptor =
    MetricDescriptor::gauge("logstash_stats_process_cpu_percent", "CPU usage of the process in percent", NODE_LABELS);
const CPU_TOTAL: MetricDescriptor = MetricDescriptor::counter(
    "logstash_stats_process_cpu_total_millis",
    "Total CPU time of the process in milliseconds",
    NODE_LABELS,
);
const LOAD_AVERAGE_1M: MetricDescriptor =
    MetricDescriptor::gauge("logstash_stats_process_cpu_load_average_1m", "System load average over 1 minute", NODE_LABELS);
const LOAD_AVERAGE_5M: MetricDescriptor =
    MetricDescriptor::gauge("logstash_stats_process_cpu_load_average_5m", "System load average over 5 minutes", NODE_LABELS);
const LOAD_AVERAGE_15M: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_process_cpu_load_average_15m",
    "System load average over 15 minutes",
    NODE_LABELS,
);

const CGROUP_CPUACCT_USAGE: MetricDescriptor = MetricDescriptor::counter(
    "logstash_stats_os_cgroup_cpuacct_usage_nanos",
    "Total CPU time consumed by the cgroup in nanoseconds",
    NODE_LABELS,
);
const CGROUP_CFS_PERIOD: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_os_cgroup_cpu_cfs_period_micros",
    "CFS scheduling period of the cgroup in microseconds",
    NODE_LABELS,
);
const CGROUP_CFS_QUOTA: MetricDescriptor = MetricDescriptor::gauge(
    "logstash_stats_os_cgroup_cpu_cfs_quota_micros",
    "CFS quota of the cgroup in microseconds, -1 when unlimited",
    NODE_LABELS,
);
const CGROUP_ELAPSED_PERIODS: MetricDescriptor = MetricDescriptor::counter(
    "logstash_stats_os_cgroup_cpu_stat_elapsed_periods",
    "Number of elapsed CFS periods",
    NODE_LABELS,
);
const CGROUP_THROTTLED: MetricDescriptor = MetricDescriptor::counter(
    "logstash_stats_os_cgroup_cpu_stat_throttled_count",
    "Number of times the cgroup was throttled",
    NODE_LABELS,
);
const CGROUP_TIME_THROTTLED: MetricDescriptor = MetricDescriptor::counter(
    "logstash_stats_os_cgroup_cpu_stat_time_throttled_nanos",
    "Total time the cgroup was throttled in nanoseconds",
    NODE_LABELS,
);

pub(crate) const DESCRIPTORS: &[MetricDescriptor] = &[
    OPEN_FDS,
    PEAK_OPEN_FDS,
    MAX_FDS,
    MEM_TOTAL_VIRTUAL,
    CPU_PERCENT,
    CPU_TOTAL,
    LOAD_AVERAGE_1M,
    LOAD_AVERAGE_5M,
    LOAD_AVERAGE_15M,
    CGROUP_CPUACCT_USAGE,
    CGROUP_CFS_PERIOD,
    CGROUP_CFS_QUOTA,
    CGROUP_ELAPSED_PERIODS,
    CGROUP_THROTTLED,
    CGROUP_TIME_THROTTLED,
];

pub(crate) fn collect(stats: &NodeStatsResponse, host: &Cow<'static, str>, out: &mut Vec<PrometheusMetric>) {
    let labels = [host.clone()];
    let process = &stats.process;
    let load = &process.cpu.load_average;

    out.push(OPEN_FDS.sample(process.open_file_descriptors as f64, &labels));
    out.push(PEAK_OPEN_FDS.sample(process.peak_open_file_descriptors as f64, &labels));
    out.push(MAX_FDS.sample(process.max_file_descriptors as f64, &labels));
    out.push(MEM_TOTAL_VIRTUAL.sample(process.mem.total_virtual_in_bytes as f64, &labels));
    out.push(CPU_PERCENT.sample(process.cpu.percent, &labels));
    out.push(CPU_TOTAL.sample(process.cpu.total_in_millis as f64, &labels));
    out.push(LOAD_AVERAGE_1M.sample(load.one_minute, &labels));
    out.push(LOAD_AVERAGE_5M.sample(load.five_minutes, &labels));
    out.push(LOAD_AVERAGE_15M.sample(load.fifteen_minutes, &labels));

    let cgroup = &stats.os.cgroup;
    out.push(CGROUP_CPUACCT_USAGE.sample(cgroup.cpuacct.usage_nanos as f64, &labels));
    out.push(CGROUP_CFS_PERIOD.sample(cgroup.cpu.cfs_period_micros as f64, &labels));
    out.push(CGROUP_CFS_QUOTA.sample(cgroup.cpu.cfs_quota_micros as f64, &labels));
    out.push(CGROUP_ELAPSED_PERIODS.sample(cgroup.cpu.stat.number_of_elapsed_periods as f64, &labels));
    out.push(CGROUP_THROTTLED.sample(cgroup.cpu.stat.number_of_times_throttled as f64, &labels));
    out.push(CGROUP_TIME_THROTTLED.sample(cgroup.cpu.stat.time_throttled_nanos as f64, &labels));
}
