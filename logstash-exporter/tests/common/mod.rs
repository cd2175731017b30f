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

#![allow(dead_code)]

use axum::Router;
use axum::http::header;
use axum::routing::get;
use tokio::net::TcpListener;

pub const NODE_STATS: &str = include_str!("../../../crates/responses/tests/fixtures/node_stats.json");

/// Serve the node stats fixture on an ephemeral port and return its URL.
pub async fn fake_node() -> String {
    let router = Router::new()
        .route("/", get(|| async { ([(header::CONTENT_TYPE, "application/json")], "{}") }))
        .route(
            "/_node/stats",
            get(|| async { ([(header::CONTENT_TYPE, "application/json")], NODE_STATS) }),
        );
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind fake node");
    let addr = listener.local_addr().expect("fake node address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("fake node server");
    });
    format!("http://{addr}")
}

/// An address nothing listens on.
pub async fn dead_node() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind probe");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);
    format!("http://{addr}")
}
