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

use logstash_responses::DecodeError;
use thiserror::Error;

/// Failure to scrape a single node. Always node-scoped and never fatal to a
/// collection cycle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScrapeError {
    #[error("node unreachable: {reason}")]
    Unreachable { reason: String },

    #[error("node did not answer before the scrape deadline")]
    Timeout,

    #[error("node answered with HTTP status {status}")]
    Protocol { status: u16 },

    #[error("failed to decode node stats: {0}")]
    Decode(#[from] DecodeError),
}

impl ScrapeError {
    /// Stable identifier used as the `error_kind` log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unreachable { .. } => "unreachable",
            Self::Timeout => "timeout",
            Self::Protocol { .. } => "protocol",
            Self::Decode(_) => "decode",
        }
    }

    pub(crate) fn unreachable(reason: impl Into<String>) -> Self {
        Self::Unreachable { reason: reason.into() }
    }
}

impl From<reqwest::Error> for ScrapeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout;
        }
        if let Some(status) = err.status() {
            return Self::Protocol { status: status.as_u16() };
        }
        Self::unreachable(err.without_url().to_string())
    }
}

/// Construction-time failure of the collector stack.
#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("no logstash nodes configured")]
    NoNodesConfigured,

    #[error("invalid logstash node url {url:?}: {reason}")]
    InvalidNodeUrl { url: String, reason: String },

    #[error("logstash node {url:?} is configured more than once")]
    DuplicateNode { url: String },

    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
