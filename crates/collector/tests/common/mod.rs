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

//! Fake Logstash nodes served on ephemeral local ports.

#![allow(dead_code)]

use axum::Router;
use axum::http::{StatusCode, header};
use axum::routing::get;
use std::time::Duration;
use tokio::net::TcpListener;

pub const FIXTURE: &str = include_str!("../../../responses/tests/fixtures/node_stats.json");

pub const MINIMAL: &str = r#"{
    "id": "node-a-id",
    "name": "node-a",
    "status": "green",
    "pipelines": {"main": {"events": {"in": 5, "out": 5}}}
}"#;

/// A node with no pipelines loaded.
pub const NO_PIPELINES: &str = r#"{
    "id": "node-a-id",
    "name": "node-a",
    "status": "green",
    "jvm": {"threads": {"count": 12, "peak_count": 14}},
    "pipelines": {}
}"#;

pub const MALFORMED: &str = r#"{"jvm": {"threads": {"count": 3,"#;

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind fake node");
    let addr = listener.local_addr().expect("fake node address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("fake node server");
    });
    format!("http://{addr}")
}

/// A node answering `/_node/stats` with `body`.
pub async fn stats_node(body: &'static str) -> String {
    let router = Router::new()
        .route("/", get(|| async { ([(header::CONTENT_TYPE, "application/json")], "{}") }))
        .route(
            "/_node/stats",
            get(move || async move { ([(header::CONTENT_TYPE, "application/json")], body) }),
        );
    serve(router).await
}

/// A node that sleeps `delay` before answering.
pub async fn slow_node(delay: Duration) -> String {
    let handler = move || async move {
        tokio::time::sleep(delay).await;
        ([(header::CONTENT_TYPE, "application/json")], MINIMAL)
    };
    let router = Router::new().route("/", get(handler)).route("/_node/stats", get(handler));
    serve(router).await
}

/// A node answering every request with `status`.
pub async fn status_node(status: StatusCode) -> String {
    let router = Router::new().fallback(move || async move { (status, "unavailable") });
    serve(router).await
}

/// An address nothing listens on.
pub async fn unreachable_node() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind probe");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);
    format!("http://{addr}")
}
