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

//! Metric primitives shared by the Logstash exporter.
//!
//! Collectors declare the metric families they can produce as
//! [`MetricDescriptor`]s and emit [`PrometheusMetric`] samples on demand.
//! A [`Registry`] owns the registered collectors and renders everything they
//! return in the Prometheus text exposition format.

mod descriptor;
mod format;
mod metric_type;
mod registry;

pub use descriptor::MetricDescriptor;
pub use format::{EXPOSITION_CONTENT_TYPE, PrometheusMetric, render_metrics};
pub use metric_type::MetricType;
pub use registry::{Collector, Registry, RegistryError};
