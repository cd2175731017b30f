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

//! Node-level sections of the `/_node/stats` payload.

use crate::error::DecodeError;
use crate::lenient;
use crate::pipeline::PipelineStats;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Decoded `GET /_node/stats` response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NodeStatsResponse {
    #[serde(deserialize_with = "lenient::string")]
    pub host: String,
    #[serde(deserialize_with = "lenient::string")]
    pub version: String,
    #[serde(deserialize_with = "lenient::string")]
    pub http_address: String,
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(deserialize_with = "lenient::string")]
    pub ephemeral_id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub status: String,
    #[serde(deserialize_with = "lenient::boolean")]
    pub snapshot: bool,
    #[serde(deserialize_with = "lenient::object")]
    pub pipeline: PipelineSettings,
    #[serde(deserialize_with = "lenient::object")]
    pub jvm: JvmStats,
    #[serde(deserialize_with = "lenient::object")]
    pub process: ProcessStats,
    #[serde(deserialize_with = "lenient::object")]
    pub os: OsStats,
    #[serde(deserialize_with = "lenient::object")]
    pub events: EventStats,
    #[serde(deserialize_with = "lenient::object")]
    pub flow: FlowStats,
    #[serde(deserialize_with = "lenient::object")]
    pub reloads: ReloadStats,
    #[serde(deserialize_with = "lenient::object")]
    pub queue: QueueSummary,
    #[serde(deserialize_with = "lenient::object_map")]
    pub pipelines: BTreeMap<String, PipelineStats>,
}

impl NodeStatsResponse {
    /// Decode a node stats payload.
    ///
    /// Leaf type mismatches fall back to defaults. The payload must be a
    /// JSON object and every structural node must have the expected shape.
    pub fn from_slice(payload: &[u8]) -> Result<Self, DecodeError> {
        match payload.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'{') => serde_json::from_slice(payload).map_err(|err| DecodeError::from_serde(&err, payload)),
            _ => Err(DecodeError::not_an_object(payload)),
        }
    }
}

/// Node-wide pipeline defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    #[serde(deserialize_with = "lenient::number")]
    pub workers: u64,
    #[serde(deserialize_with = "lenient::number")]
    pub batch_size: u64,
    #[serde(deserialize_with = "lenient::number")]
    pub batch_delay: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct JvmStats {
    #[serde(deserialize_with = "lenient::object")]
    pub threads: JvmThreads,
    #[serde(deserialize_with = "lenient::object")]
    pub mem: JvmMemory,
    #[serde(deserialize_with = "lenient::object")]
    pub gc: JvmGc,
    #[serde(deserialize_with = "lenient::number")]
    pub uptime_in_millis: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct JvmThreads {
    #[serde(deserialize_with = "lenient::number")]
    pub count: u64,
    #[serde(deserialize_with = "lenient::number")]
    pub peak_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct JvmMemory {
    #[serde(deserialize_with = "lenient::number")]
    pub heap_used_percent: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub heap_committed_in_bytes: u64,
    #[serde(deserialize_with = "lenient::number")]
    pub heap_max_in_bytes: u64,
    #[serde(deserialize_with = "lenient::number")]
    pub heap_used_in_bytes: u64,
    #[serde(deserialize_with = "lenient::number")]
    pub non_heap_used_in_bytes: u64,
    #[serde(deserialize_with = "lenient::number")]
    pub non_heap_committed_in_bytes: u64,
    #[serde(deserialize_with = "lenient::object")]
    pub pools: MemoryPools,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MemoryPools {
    #[serde(deserialize_with = "lenient::object")]
    pub young: MemoryPool,
    #[serde(deserialize_with = "lenient::object")]
    pub old: MemoryPool,
    #[serde(deserialize_with = "lenient::object")]
    pub survivor: MemoryPool,
}

impl MemoryPools {
    /// Pools paired with their label value.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &MemoryPool)> {
        [("young", &self.young), ("old", &self.old), ("survivor", &self.survivor)].into_iter()
    }
}

/// One JVM memory pool. Max figures are `-1` when the pool is unbounded.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MemoryPool {
    #[serde(deserialize_with = "lenient::number")]
    pub used_in_bytes: u64,
    #[serde(deserialize_with = "lenient::number")]
    pub peak_used_in_bytes: u64,
    #[serde(deserialize_with = "lenient::number")]
    pub committed_in_bytes: u64,
    #[serde(deserialize_with = "lenient::number")]
    pub max_in_bytes: i64,
    #[serde(deserialize_with = "lenient::number")]
    pub peak_max_in_bytes: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct JvmGc {
    #[serde(deserialize_with = "lenient::object")]
    pub collectors: GcCollectors,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GcCollectors {
    #[serde(deserialize_with = "lenient::object")]
    pub young: GcCollector,
    #[serde(deserialize_with = "lenient::object")]
    pub old: GcCollector,
}

impl GcCollectors {
    /// Collectors paired with their label value.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &GcCollector)> {
        [("young", &self.young), ("old", &self.old)].into_iter()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GcCollector {
    #[serde(deserialize_with = "lenient::number")]
    pub collection_count: u64,
    #[serde(deserialize_with = "lenient::number")]
    pub collection_time_in_millis: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProcessStats {
    #[serde(deserialize_with = "lenient::number")]
    pub open_file_descriptors: i64,
    #[serde(deserialize_with = "lenient::number")]
    pub peak_open_file_descriptors: i64,
    #[serde(deserialize_with = "lenient::number")]
    pub max_file_descriptors: i64,
    #[serde(deserialize_with = "lenient::object")]
    pub mem: ProcessMemory,
    #[serde(deserialize_with = "lenient::object")]
    pub cpu: ProcessCpu,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProcessMemory {
    #[serde(deserialize_with = "lenient::number")]
    pub total_virtual_in_bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProcessCpu {
    #[serde(deserialize_with = "lenient::number")]
    pub total_in_millis: u64,
    #[serde(deserialize_with = "lenient::number")]
    pub percent: f64,
    #[serde(deserialize_with = "lenient::object")]
    pub load_average: LoadAverage,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoadAverage {
    #[serde(rename = "1m", deserialize_with = "lenient::number")]
    pub one_minute: f64,
    #[serde(rename = "5m", deserialize_with = "lenient::number")]
    pub five_minutes: f64,
    #[serde(rename = "15m", deserialize_with = "lenient::number")]
    pub fifteen_minutes: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct OsStats {
    #[serde(deserialize_with = "lenient::object")]
    pub cgroup: Cgroup,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Cgroup {
    #[serde(deserialize_with = "lenient::object")]
    pub cpuacct: CgroupCpuacct,
    #[serde(deserialize_with = "lenient::object")]
    pub cpu: CgroupCpu,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CgroupCpuacct {
    #[serde(deserialize_with = "lenient::string")]
    pub control_group: String,
    #[serde(deserialize_with = "lenient::number")]
    pub usage_nanos: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CgroupCpu {
    #[serde(deserialize_with = "lenient::string")]
    pub control_group: String,
    #[serde(deserialize_with = "lenient::number")]
    pub cfs_period_micros: i64,
    #[serde(deserialize_with = "lenient::number")]
    pub cfs_quota_micros: i64,
    #[serde(deserialize_with = "lenient::object")]
    pub stat: CgroupCpuStat,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CgroupCpuStat {
    #[serde(deserialize_with = "lenient::number")]
    pub number_of_elapsed_periods: u64,
    #[serde(deserialize_with = "lenient::number")]
    pub number_of_times_throttled: u64,
    #[serde(deserialize_with = "lenient::number")]
    pub time_throttled_nanos: u64,
}

/// Event counters, shared by the node and pipeline sections.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EventStats {
    #[serde(deserialize_with = "lenient::number")]
    pub r#in: u64,
    #[serde(deserialize_with = "lenient::number")]
    pub filtered: u64,
    #[serde(deserialize_with = "lenient::number")]
    pub out: u64,
    #[serde(deserialize_with = "lenient::number")]
    pub duration_in_millis: u64,
    #[serde(deserialize_with = "lenient::number")]
    pub queue_push_duration_in_millis: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FlowRate {
    #[serde(deserialize_with = "lenient::number")]
    pub current: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub lifetime: f64,
}

/// Flow rates. `worker_utilization` is only reported per pipeline.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FlowStats {
    #[serde(deserialize_with = "lenient::object")]
    pub input_throughput: FlowRate,
    #[serde(deserialize_with = "lenient::object")]
    pub filter_throughput: FlowRate,
    #[serde(deserialize_with = "lenient::object")]
    pub output_throughput: FlowRate,
    #[serde(deserialize_with = "lenient::object")]
    pub queue_backpressure: FlowRate,
    #[serde(deserialize_with = "lenient::object")]
    pub worker_concurrency: FlowRate,
    #[serde(deserialize_with = "lenient::object")]
    pub worker_utilization: FlowRate,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReloadStats {
    #[serde(deserialize_with = "lenient::number")]
    pub successes: u64,
    #[serde(deserialize_with = "lenient::number")]
    pub failures: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct QueueSummary {
    #[serde(deserialize_with = "lenient::number")]
    pub events_count: u64,
}
