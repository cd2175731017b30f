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

use crate::config::{LogFormat, LoggingConfig};
use tracing::{Level, debug, info};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// The configured level is the default directive and `RUST_LOG` overrides
/// it. When a subscriber is already installed it is kept.
pub fn init_logging(config: &LoggingConfig) {
    let level = config.level.parse::<Level>().unwrap_or(Level::INFO);
    let filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let installed = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };

    match installed {
        Ok(()) => info!(level = %level, format = ?config.format, "logging initialized"),
        Err(err) => debug!(error = %err, "tracing subscriber already installed, keeping it"),
    }
}
