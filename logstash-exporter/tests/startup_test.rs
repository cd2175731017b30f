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
mod common;

use common::fake_node;
use logstash_exporter::{Flags, StartupError, StartupManager, StartupState};
use std::io::Write;
use tempfile::NamedTempFile;
use tokio::sync::oneshot;

fn config_file(node: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp config");
    write!(
        file,
        "logstash:\n  servers:\n    - url: \"{node}\"\n  httpTimeout: 2s\nserver:\n  host: \"127.0.0.1\"\n  port: 0\nlogging:\n  level: debug\n"
    )
    .expect("write config");
    file
}

#[tokio::test]
async fn test_second_initialize_is_rejected() {
    let node = fake_node().await;
    let file = config_file(&node);
    let flags = Flags {
        config: file.path().to_path_buf(),
    };
    let startup = StartupManager::new();

    let exporter = startup.initialize_with(&flags).await.expect("first initialize");
    assert_eq!(startup.state(), StartupState::Ready);
    assert_eq!(exporter.config().node_urls(), vec![node]);

    let err = startup.initialize_with(&flags).await.err();
    assert!(matches!(err, Some(StartupError::AlreadyInitialized)));
}

#[tokio::test]
async fn test_invalid_config_fails_startup() {
    let mut file = NamedTempFile::new().expect("temp config");
    write!(file, "logstash:\n  servers: []\n").expect("write config");
    let flags = Flags {
        config: file.path().to_path_buf(),
    };

    let err = StartupManager::new().initialize_with(&flags).await.err();
    assert!(matches!(err, Some(StartupError::Config(_))));
}

#[tokio::test]
async fn test_exporter_serves_metrics_until_shutdown() {
    let node = fake_node().await;
    let file = config_file(&node);
    let flags = Flags {
        config: file.path().to_path_buf(),
    };

    let exporter = StartupManager::new().initialize_with(&flags).await.expect("initialize");
    let addr = exporter.local_addr().expect("bound address");
    let (stop, stopped) = oneshot::channel::<()>();
    let serving = tokio::spawn(exporter.run_until(async {
        let _ = stopped.await;
    }));

    let body = reqwest::get(format!("http://{addr}/metrics"))
        .await
        .expect("metrics request")
        .text()
        .await
        .expect("metrics body");
    assert!(body.contains(&format!("logstash_exporter_up{{hostname=\"{node}\"}} 1")));

    stop.send(()).expect("server still running");
    serving.await.expect("server task").expect("clean shutdown");
}
