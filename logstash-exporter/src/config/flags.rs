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

use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_CONFIG_LOCATION: &str = "config.yml";

/// Command line flags of the exporter.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "logstash-exporter",
    about = "Prometheus exporter for Logstash node stats",
    version,
    long_about = r#"
Logstash Exporter - scrapes the node stats API of one or more Logstash
instances and serves the result in the Prometheus text format.

ENVIRONMENT VARIABLES:
  EXPORTER_CONFIG_LOCATION  Path of the YAML config file
  RUST_LOG                  Overrides the configured log level

A .env file in the working directory is loaded before flags are parsed.
"#
)]
pub struct Flags {
    /// Path of the YAML config file
    #[arg(short = 'c', long = "config", env = "EXPORTER_CONFIG_LOCATION", default_value = DEFAULT_CONFIG_LOCATION)]
    pub config: PathBuf,
}
