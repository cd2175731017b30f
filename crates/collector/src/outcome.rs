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

use crate::ScrapeError;
use std::time::Duration;

/// Result of scraping one node during one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeOutcome {
    pub success: bool,
    pub duration: Duration,
    pub error: Option<ScrapeError>,
}

impl ScrapeOutcome {
    pub fn success(duration: Duration) -> Self {
        Self {
            success: true,
            duration,
            error: None,
        }
    }

    pub fn failure(duration: Duration, error: ScrapeError) -> Self {
        Self {
            success: false,
            duration,
            error: Some(error),
        }
    }

    /// `error_kind` of the failure, or `None` on success.
    pub fn error_kind(&self) -> Option<&'static str> {
        self.error.as_ref().map(ScrapeError::kind)
    }
}

/// Outcome of one configured node, in configuration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeOutcome {
    pub hostname: String,
    pub outcome: ScrapeOutcome,
}
