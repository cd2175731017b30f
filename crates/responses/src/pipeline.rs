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

//! Per-pipeline and per-plugin sections of the `/_node/stats` payload.

use crate::lenient;
use crate::node_stats::{EventStats, FlowStats};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineStats {
    #[serde(deserialize_with = "lenient::string")]
    pub hash: String,
    #[serde(deserialize_with = "lenient::string")]
    pub ephemeral_id: String,
    #[serde(deserialize_with = "lenient::object")]
    pub events: EventStats,
    #[serde(deserialize_with = "lenient::object")]
    pub flow: FlowStats,
    #[serde(deserialize_with = "lenient::object")]
    pub plugins: PipelinePlugins,
    #[serde(deserialize_with = "lenient::object")]
    pub reloads: PipelineReloads,
    #[serde(deserialize_with = "lenient::object")]
    pub queue: PipelineQueue,
    #[serde(deserialize_with = "lenient::object")]
    pub dead_letter_queue: DeadLetterQueue,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelinePlugins {
    #[serde(deserialize_with = "lenient::list")]
    pub inputs: Vec<PluginStats>,
    #[serde(deserialize_with = "lenient::list")]
    pub codecs: Vec<PluginStats>,
    #[serde(deserialize_with = "lenient::list")]
    pub filters: Vec<PluginStats>,
    #[serde(deserialize_with = "lenient::list")]
    pub outputs: Vec<PluginStats>,
}

impl PipelinePlugins {
    /// Every plugin with its `plugin_type` label value, in payload order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &PluginStats)> {
        typed("input", &self.inputs)
            .chain(typed("codec", &self.codecs))
            .chain(typed("filter", &self.filters))
            .chain(typed("output", &self.outputs))
    }
}

fn typed<'a>(kind: &'static str, plugins: &'a [PluginStats]) -> impl Iterator<Item = (&'static str, &'a PluginStats)> {
    plugins.iter().map(move |plugin| (kind, plugin))
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PluginStats {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(deserialize_with = "lenient::object")]
    pub events: PluginEvents,
    #[serde(deserialize_with = "lenient::object")]
    pub documents: PluginDocuments,
    #[serde(deserialize_with = "lenient::object")]
    pub bulk_requests: BulkRequests,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PluginEvents {
    #[serde(deserialize_with = "lenient::number")]
    pub r#in: u64,
    #[serde(deserialize_with = "lenient::number")]
    pub out: u64,
    #[serde(deserialize_with = "lenient::number")]
    pub duration_in_millis: u64,
    #[serde(deserialize_with = "lenient::number")]
    pub queue_push_duration_in_millis: u64,
}

/// Document counters reported by the elasticsearch output.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PluginDocuments {
    #[serde(deserialize_with = "lenient::number")]
    pub successes: u64,
    #[serde(deserialize_with = "lenient::number")]
    pub non_retryable_failures: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BulkRequests {
    #[serde(deserialize_with = "lenient::number")]
    pub successes: u64,
    #[serde(deserialize_with = "lenient::number")]
    pub failures: u64,
    #[serde(deserialize_with = "lenient::number")]
    pub with_errors: u64,
    /// Response counts keyed by HTTP status code.
    #[serde(deserialize_with = "lenient::number_map")]
    pub responses: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineReloads {
    #[serde(deserialize_with = "lenient::number")]
    pub successes: u64,
    #[serde(deserialize_with = "lenient::number")]
    pub failures: u64,
    #[serde(deserialize_with = "lenient::optional_string")]
    pub last_success_timestamp: Option<String>,
    #[serde(deserialize_with = "lenient::optional_string")]
    pub last_failure_timestamp: Option<String>,
}

impl PipelineReloads {
    pub fn last_success(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.last_success_timestamp.as_deref())
    }

    pub fn last_failure(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.last_failure_timestamp.as_deref())
    }

    /// A pipeline is up unless its most recent reload attempt failed.
    ///
    /// A failure with no recorded success at all counts as down.
    pub fn is_up(&self) -> bool {
        match (self.last_success(), self.last_failure()) {
            (_, None) => true,
            (None, Some(_)) => false,
            (Some(success), Some(failure)) => success >= failure,
        }
    }
}

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
        .map(|ts| ts.with_timezone(&Utc))
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineQueue {
    #[serde(rename = "type", deserialize_with = "lenient::string")]
    pub queue_type: String,
    #[serde(deserialize_with = "lenient::number")]
    pub events_count: u64,
    #[serde(deserialize_with = "lenient::number")]
    pub queue_size_in_bytes: u64,
    #[serde(deserialize_with = "lenient::number")]
    pub max_queue_size_in_bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeadLetterQueue {
    #[serde(deserialize_with = "lenient::number")]
    pub queue_size_in_bytes: u64,
    #[serde(deserialize_with = "lenient::number")]
    pub max_queue_size_in_bytes: u64,
    #[serde(deserialize_with = "lenient::number")]
    pub dropped_events: u64,
    #[serde(deserialize_with = "lenient::number")]
    pub expired_events: u64,
    #[serde(deserialize_with = "lenient::string")]
    pub storage_policy: String,
}
