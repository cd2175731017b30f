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

//! Scrape orchestration for Logstash nodes.
//!
//! - [`NodeClient`]: one `GET /_node/stats` under a deadline
//! - [`NodeCollector`]: fetch, decode and flatten one node into samples
//! - [`CollectorManager`]: fan out to every node, merge, and report one
//!   `logstash_exporter_up` sample per node

mod client;
mod error;
pub mod flatten;
mod manager;
mod node;
mod outcome;

pub use client::{NODE_STATS_PATH, NodeClient, build_http_client};
pub use error::{CollectorError, ScrapeError};
pub use manager::{CollectorManager, CycleReport, CycleState};
pub use node::NodeCollector;
pub use outcome::{NodeOutcome, ScrapeOutcome};
