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

use crate::{MetricType, PrometheusMetric};
use std::borrow::Cow;

/// MetricDescriptor - static declaration of a metric family
///
/// Descriptors are `const` items so the full set a collector can produce is
/// known before the first scrape. Samples should only be built through
/// [`MetricDescriptor::sample`], which keeps the label keys of every emitted
/// sample identical to the declared ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDescriptor {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub help: &'static str,
    pub variable_labels: &'static [&'static str],
}

impl MetricDescriptor {
    /// Declare a counter family.
    pub const fn counter(name: &'static str, help: &'static str, variable_labels: &'static [&'static str]) -> Self {
        Self {
            name,
            metric_type: MetricType::Counter,
            help,
            variable_labels,
        }
    }

    /// Declare a gauge family.
    pub const fn gauge(name: &'static str, help: &'static str, variable_labels: &'static [&'static str]) -> Self {
        Self {
            name,
            metric_type: MetricType::Gauge,
            help,
            variable_labels,
        }
    }

    /// Build one sample of this family.
    ///
    /// `label_values` is positional and pairs with `variable_labels`. A
    /// length mismatch is a programming error and trips a debug assertion;
    /// release builds pair up to the shorter of the two.
    pub fn sample(&self, value: f64, label_values: &[Cow<'static, str>]) -> PrometheusMetric {
        debug_assert_eq!(
            self.variable_labels.len(),
            label_values.len(),
            "label values do not match the declared labels of {}",
            self.name
        );
        self.variable_labels
            .iter()
            .zip(label_values)
            .fold(PrometheusMetric::new(self.name, self.metric_type, self.help, value), |metric, (key, value)| {
                metric.with_label(*key, value.clone())
            })
    }

    /// check whether a sample belongs to this family with the declared label keys
    pub fn matches(&self, metric: &PrometheusMetric) -> bool {
        metric.name == self.name
            && metric.metric_type == self.metric_type
            && metric.label_keys().eq(self.variable_labels.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UP: MetricDescriptor = MetricDescriptor::gauge("up_metric", "up help", &["hostname", "pipeline"]);

    #[test]
    fn test_sample_carries_declared_labels() {
        let sample = UP.sample(1.0, &[Cow::Borrowed("http://a:9600"), Cow::Owned("main".to_string())]);

        assert_eq!(sample.name, "up_metric");
        assert_eq!(sample.metric_type, MetricType::Gauge);
        assert_eq!(sample.label("hostname"), Some("http://a:9600"));
        assert_eq!(sample.label("pipeline"), Some("main"));
        assert!(UP.matches(&sample));
    }

    #[test]
    fn test_matches_rejects_foreign_label_keys() {
        let sample = PrometheusMetric::new("up_metric", MetricType::Gauge, "up help", 1.0).with_label("hostname", "a");
        assert!(!UP.matches(&sample));

        let counter = MetricDescriptor::counter("up_metric", "up help", &["hostname"]);
        assert!(!counter.matches(&sample));
    }
}
