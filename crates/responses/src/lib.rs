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

//! Typed model of the Logstash `GET /_node/stats` response.
//!
//! Every numeric field defaults to zero, every string to empty and every
//! nested section to its zero value, so payloads from older or newer
//! Logstash releases decode as far as their shape allows. Use
//! [`NodeStatsResponse::from_slice`] as the single entry point.

mod error;
mod lenient;
mod node_stats;
mod pipeline;

pub use error::{DecodeError, FRAGMENT_LIMIT};
pub use node_stats::{
    Cgroup, CgroupCpu, CgroupCpuStat, CgroupCpuacct, EventStats, FlowRate, FlowStats, GcCollector, GcCollectors, JvmGc,
    JvmMemory, JvmStats, JvmThreads, LoadAverage, MemoryPool, MemoryPools, NodeStatsResponse, OsStats, PipelineSettings,
    ProcessCpu, ProcessMemory, ProcessStats, QueueSummary, ReloadStats,
};
pub use pipeline::{
    BulkRequests, DeadLetterQueue, PipelinePlugins, PipelineQueue, PipelineReloads, PipelineStats, PluginDocuments,
    PluginEvents, PluginStats,
};
