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

//! Prometheus exporter for Logstash node stats.
//!
//! [`StartupManager`] loads the YAML config, installs logging and builds a
//! [`logstash_collector::CollectorManager`] registered in a
//! [`logstash_metrics::Registry`], which the HTTP server renders on
//! `GET /metrics`.

pub mod config;
mod error;
mod logging;
pub mod server;
mod startup;
mod version;

pub use config::{ExporterConfig, Flags};
pub use error::{ConfigError, StartupError};
pub use logging::init_logging;
pub use startup::{Exporter, StartupManager, StartupState};
pub use version::VersionInfo;
