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

//! One-shot initialization of the exporter.

use crate::config::{ExporterConfig, Flags};
use crate::server::{AppServer, AppState};
use crate::{StartupError, VersionInfo, init_logging};
use clap::Parser;
use logstash_collector::CollectorManager;
use logstash_metrics::Registry;
use parking_lot::Mutex;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupState {
    Uninitialized,
    Initializing,
    Ready,
}

/// Guards initialization so it happens exactly once per process.
pub struct StartupManager {
    state: Mutex<StartupState>,
}

impl StartupManager {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StartupState::Uninitialized),
        }
    }

    pub fn state(&self) -> StartupState {
        *self.state.lock()
    }

    /// Load `.env`, parse the command line and bring the exporter up.
    pub async fn initialize(&self) -> Result<Exporter, StartupError> {
        self.claim()?;
        let dotenv = dotenvy::dotenv().err();
        let flags = Flags::parse();
        self.settle(build(&flags, dotenv).await)
    }

    /// Bring the exporter up from already parsed flags.
    pub async fn initialize_with(&self, flags: &Flags) -> Result<Exporter, StartupError> {
        self.claim()?;
        self.settle(build(flags, None).await)
    }

    fn claim(&self) -> Result<(), StartupError> {
        let mut state = self.state.lock();
        if *state != StartupState::Uninitialized {
            return Err(StartupError::AlreadyInitialized);
        }
        *state = StartupState::Initializing;
        Ok(())
    }

    // A failed attempt releases the claim so the caller may retry.
    fn settle(&self, result: Result<Exporter, StartupError>) -> Result<Exporter, StartupError> {
        *self.state.lock() = match result {
            Ok(_) => StartupState::Ready,
            Err(_) => StartupState::Uninitialized,
        };
        result
    }
}

impl Default for StartupManager {
    fn default() -> Self {
        Self::new()
    }
}

async fn build(flags: &Flags, dotenv: Option<dotenvy::Error>) -> Result<Exporter, StartupError> {
    let config = ExporterConfig::load(&flags.config)?;
    init_logging(&config.logging);

    if let Some(err) = dotenv {
        if err.not_found() {
            warn!("no .env file found, using process environment only");
        } else {
            warn!(error = %err, "failed to load .env file");
        }
    }

    let version = VersionInfo::current();
    info!(
        version = version.version,
        git_commit = version.git_commit,
        build_date = version.build_date,
        config = %flags.config.display(),
        "starting logstash exporter"
    );
    info!(
        nodes = ?config.node_urls(),
        http_timeout = %humantime::format_duration(config.logstash.http_timeout),
        "configured logstash nodes"
    );

    let manager = Arc::new(CollectorManager::new(config.node_urls(), config.logstash.http_timeout)?);
    let mut registry = Registry::new();
    registry.register(manager.clone())?;

    let state = AppState {
        registry: Arc::new(registry),
        manager,
    };
    let server = AppServer::bind(&config.server, state).await?;

    Ok(Exporter { config, server })
}

/// An initialized exporter, ready to serve.
pub struct Exporter {
    config: ExporterConfig,
    server: AppServer,
}

impl Exporter {
    pub fn config(&self) -> &ExporterConfig {
        &self.config
    }

    pub fn local_addr(&self) -> Result<SocketAddr, StartupError> {
        self.server.local_addr()
    }

    /// Serve until Ctrl-C or SIGTERM.
    pub async fn run(self) -> Result<(), StartupError> {
        self.server.run().await
    }

    pub async fn run_until<F>(self, shutdown: F) -> Result<(), StartupError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.server.run_until(shutdown).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_failed_initialization_releases_the_claim() {
        let manager = StartupManager::new();
        let flags = Flags {
            config: PathBuf::from("/nonexistent/logstash-exporter/config.yml"),
        };

        let err = manager.initialize_with(&flags).await.err();
        assert!(matches!(err, Some(StartupError::Config(_))));
        assert_eq!(manager.state(), StartupState::Uninitialized);
    }

    #[test]
    fn test_claim_is_exclusive() {
        let manager = StartupManager::new();
        assert!(manager.claim().is_ok());
        assert_eq!(manager.state(), StartupState::Initializing);
        assert!(matches!(manager.claim(), Err(StartupError::AlreadyInitialized)));
    }
}
