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

use super::AppState;
use crate::VersionInfo;
use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use logstash_metrics::EXPOSITION_CONTENT_TYPE;
use serde_json::json;
use tokio::time::Instant;
use tracing::warn;

/// Run one collection cycle and render it.
pub(super) async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = state.registry.render().await;
    ([(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)], body)
}

/// 200 when every node answers on its base URL, 500 listing the failing nodes otherwise.
pub(super) async fn healthcheck(State(state): State<AppState>) -> Response {
    let deadline = Instant::now() + state.manager.timeout();

    match state.manager.healthcheck(deadline).await {
        Ok(()) => (StatusCode::OK, "ok").into_response(),
        Err(failures) => {
            let failures: Vec<_> = failures
                .iter()
                .map(|(hostname, err)| {
                    warn!(hostname = %hostname, error_kind = err.kind(), error = %err, "logstash node failed healthcheck");
                    json!({
                        "hostname": hostname,
                        "errorKind": err.kind(),
                        "error": err.to_string(),
                    })
                })
                .collect();

            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "status": "unhealthy", "failures": failures }))).into_response()
        }
    }
}

pub(super) async fn version() -> Json<VersionInfo> {
    Json(VersionInfo::current())
}
