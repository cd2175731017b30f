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

//! Collector registry.

use crate::{MetricDescriptor, PrometheusMetric, render_metrics};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// A source of metric samples, consulted once per scrape.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Every metric family this collector may emit.
    ///
    /// Must not depend on runtime state: the same descriptors are returned
    /// before, during and after any collection.
    fn describe(&self) -> Vec<MetricDescriptor>;

    /// Produce the current samples.
    async fn collect(&self) -> Vec<PrometheusMetric>;
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("metric family {name} is already registered")]
    DuplicateDescriptor { name: &'static str },
}

/// Registered collectors and the union of their descriptors.
#[derive(Default)]
pub struct Registry {
    collectors: Vec<Arc<dyn Collector>>,
    descriptors: HashMap<&'static str, MetricDescriptor>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collector. Fails without side effects if any of its
    /// families is already declared by another collector, or twice by itself.
    pub fn register(&mut self, collector: Arc<dyn Collector>) -> Result<(), RegistryError> {
        let described = collector.describe();
        let mut incoming: HashMap<&'static str, MetricDescriptor> = HashMap::with_capacity(described.len());
        for descriptor in described {
            if self.descriptors.contains_key(descriptor.name) || incoming.insert(descriptor.name, descriptor).is_some() {
                return Err(RegistryError::DuplicateDescriptor { name: descriptor.name });
            }
        }

        self.descriptors.extend(incoming);
        self.collectors.push(collector);
        Ok(())
    }

    pub fn descriptor(&self, name: &str) -> Option<&MetricDescriptor> {
        self.descriptors.get(name)
    }

    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }

    /// Collect from every registered collector.
    ///
    /// Samples that do not match a registered descriptor are dropped and
    /// logged, so the exposition only ever contains declared families.
    pub async fn gather(&self) -> Vec<PrometheusMetric> {
        let mut samples = Vec::new();
        for collector in &self.collectors {
            for sample in collector.collect().await {
                match self.descriptors.get(sample.name) {
                    Some(descriptor) if descriptor.matches(&sample) => samples.push(sample),
                    _ => warn!(metric = sample.name, "dropping sample of an undeclared metric family"),
                }
            }
        }
        samples
    }

    /// Collect and render in the text exposition format.
    pub async fn render(&self) -> String {
        render_metrics(&self.gather().await)
    }
}
