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

//! HTTP surface of the exporter.

mod handlers;

use crate::StartupError;
use crate::config::ServerConfig;
use axum::Router;
use axum::routing::get;
use logstash_collector::CollectorManager;
use logstash_metrics::Registry;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared state of the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub manager: Arc<CollectorManager>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(handlers::metrics))
        .route("/healthcheck", get(handlers::healthcheck))
        .route("/version", get(handlers::version))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// A bound listener plus the router it serves.
pub struct AppServer {
    listener: TcpListener,
    router: Router,
}

impl AppServer {
    pub async fn bind(config: &ServerConfig, state: AppState) -> Result<Self, StartupError> {
        let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
        Ok(Self {
            listener,
            router: router(state),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, StartupError> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until Ctrl-C or SIGTERM.
    pub async fn run(self) -> Result<(), StartupError> {
        self.run_until(async {
            let signal = wait_for_shutdown().await;
            info!(?signal, "shutting down");
        })
        .await
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), StartupError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.listener.local_addr()?;
        info!("Server listening on http://{}", addr);
        info!("Available endpoints:");
        info!("  GET /metrics     - Prometheus metrics of every configured node");
        info!("  GET /healthcheck - Reachability of every configured node");
        info!("  GET /version     - Build information");

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;
        info!("server stopped");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    CtrlC,
    #[cfg(unix)]
    Sigterm,
}

async fn ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
pub async fn wait_for_shutdown() -> ShutdownSignal {
    use tokio::signal::unix::{SignalKind, signal};

    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c() => {
            info!("received Ctrl-C signal");
            ShutdownSignal::CtrlC
        }
        _ = terminate => {
            info!("received SIGTERM signal");
            ShutdownSignal::Sigterm
        }
    }
}

#[cfg(not(unix))]
pub async fn wait_for_shutdown() -> ShutdownSignal {
    ctrl_c().await;
    info!("received Ctrl-C signal");
    ShutdownSignal::CtrlC
}
