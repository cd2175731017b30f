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

//! Prometheus text exposition format renderer.
//!
//! Samples are grouped by family so every `# HELP`/`# TYPE` pair is written
//! exactly once and directly followed by all samples of that family, in the
//! order the families were first seen.

use crate::MetricType;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::Write;

/// Content type of the text exposition format, version 0.0.4.
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// A single Prometheus metric with labels and value.
///
/// The name and help text are compile-time constants taken from the
/// family's descriptor. Label keys are static, label values are usually
/// owned node URLs or pipeline names.
#[derive(Debug, Clone, PartialEq)]
pub struct PrometheusMetric {
    /// The metric name (e.g., "logstash_stats_jvm_threads_count").
    pub name: &'static str,
    /// The type of this metric (counter or gauge).
    pub metric_type: MetricType,
    /// Human-readable description shown in Prometheus UI.
    pub help: &'static str,
    /// Key-value label pairs for this metric instance.
    pub labels: Vec<(&'static str, Cow<'static, str>)>,
    /// The numeric value of this metric.
    pub value: f64,
}

impl PrometheusMetric {
    /// Creates a new metric with the given name, type, help text, and value.
    #[inline]
    pub const fn new(name: &'static str, metric_type: MetricType, help: &'static str, value: f64) -> Self {
        Self {
            name,
            metric_type,
            help,
            labels: Vec::new(),
            value,
        }
    }

    /// Adds a single label to this metric.
    #[inline]
    pub fn with_label(mut self, key: &'static str, value: impl Into<Cow<'static, str>>) -> Self {
        self.labels.push((key, value.into()));
        self
    }

    /// Returns the value of the label named `key`, if present.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_ref())
    }

    /// Label keys of this sample in declaration order.
    pub fn label_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.labels.iter().map(|(k, _)| *k)
    }
}

/// Render metrics in Prometheus text exposition format.
pub fn render_metrics(metrics: &[PrometheusMetric]) -> String {
    let mut families: Vec<Vec<&PrometheusMetric>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for metric in metrics {
        match index.get(metric.name) {
            Some(&slot) => families[slot].push(metric),
            None => {
                index.insert(metric.name, families.len());
                families.push(vec![metric]);
            }
        }
    }

    let mut output = String::new();
    for family in families {
        let head = family[0];
        let _ = writeln!(output, "# HELP {} {}", head.name, escape_help(head.help));
        let _ = writeln!(output, "# TYPE {} {}", head.name, head.metric_type.as_str());

        for metric in family {
            if metric.labels.is_empty() {
                let _ = writeln!(output, "{} {}", metric.name, format_value(metric.value));
            } else {
                let labels: Vec<String> = metric
                    .labels
                    .iter()
                    .map(|(k, v)| format!("{}=\"{}\"", k, escape_label_value(v)))
                    .collect();
                let _ = writeln!(output, "{}{{{}}} {}", metric.name, labels.join(","), format_value(metric.value));
            }
        }
    }

    output
}

// Label values escape backslash, double quote and newline. HELP text
// leaves double quotes alone.
fn escape(raw: &str, quotes: bool) -> Cow<'_, str> {
    if !raw.contains(['\\', '\n']) && !(quotes && raw.contains('"')) {
        return Cow::Borrowed(raw);
    }
    let mut escaped = String::with_capacity(raw.len() + 8);
    for c in raw.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '"' if quotes => escaped.push_str("\\\""),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

fn escape_label_value(raw: &str) -> Cow<'_, str> {
    escape(raw, true)
}

fn escape_help(raw: &str) -> Cow<'_, str> {
    escape(raw, false)
}

/// Integral values below 1e15 print without a fraction; non-finite values
/// use the exposition spellings `NaN`, `+Inf` and `-Inf`.
fn format_value(v: f64) -> String {
    match v {
        v if v.is_nan() => "NaN".to_string(),
        v if v == f64::INFINITY => "+Inf".to_string(),
        v if v == f64::NEG_INFINITY => "-Inf".to_string(),
        v if v.fract() == 0.0 && v.abs() < 1e15 => format!("{v:.0}"),
        v => v.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_simple_metric() {
        let metrics = vec![PrometheusMetric::new("test_counter", MetricType::Counter, "A test counter", 42.0)];
        let output = render_metrics(&metrics);

        assert!(output.contains("# HELP test_counter A test counter"));
        assert!(output.contains("# TYPE test_counter counter"));
        assert!(output.contains("test_counter 42"));
    }

    #[test]
    fn test_render_metric_with_labels() {
        let metrics = vec![
            PrometheusMetric::new("logstash_exporter_up", MetricType::Gauge, "Whether the node answered", 1.0)
                .with_label("hostname", "http://localhost:9600"),
        ];
        let output = render_metrics(&metrics);

        assert!(output.contains(r#"logstash_exporter_up{hostname="http://localhost:9600"} 1"#));
    }

    #[test]
    fn test_families_are_grouped_and_described_once() {
        let up = |host: &'static str, v: f64| {
            PrometheusMetric::new("up_metric", MetricType::Gauge, "up help", v).with_label("hostname", host)
        };
        let metrics = vec![
            up("a", 1.0),
            PrometheusMetric::new("other_metric", MetricType::Counter, "other help", 3.0),
            up("b", 0.0),
        ];
        let output = render_metrics(&metrics);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(output.matches("# HELP up_metric").count(), 1);
        assert_eq!(output.matches("# TYPE up_metric").count(), 1);
        assert_eq!(
            lines,
            vec![
                "# HELP up_metric up help",
                "# TYPE up_metric gauge",
                r#"up_metric{hostname="a"} 1"#,
                r#"up_metric{hostname="b"} 0"#,
                "# HELP other_metric other help",
                "# TYPE other_metric counter",
                "other_metric 3",
            ]
        );
    }

    #[test]
    fn test_escape_label_value() {
        assert_eq!(escape_label_value(r#"main "pipeline""#), r#"main \"pipeline\""#);
        assert_eq!(escape_label_value("a\\b"), "a\\\\b");
        assert_eq!(escape_label_value("line1\nline2"), "line1\\nline2");
    }

    #[test]
    fn test_escape_help_keeps_quotes() {
        assert_eq!(escape_help(r#"the "main" pipeline"#), r#"the "main" pipeline"#);
        assert_eq!(escape_help("a\\b\nc"), "a\\\\b\\nc");
        assert!(matches!(escape_label_value("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(f64::NAN), "NaN");
        assert_eq!(format_value(f64::INFINITY), "+Inf");
        assert_eq!(format_value(f64::NEG_INFINITY), "-Inf");
        assert_eq!(format_value(12.0), "12");
        assert_eq!(format_value(0.25), "0.25");
    }

    #[test]
    fn test_label_lookup() {
        let metric = PrometheusMetric::new("m", MetricType::Gauge, "h", 0.0)
            .with_label("hostname", "h1")
            .with_label("pipeline", "main");

        assert_eq!(metric.label("pipeline"), Some("main"));
        assert_eq!(metric.label("plugin"), None);
        assert_eq!(metric.label_keys().collect::<Vec<_>>(), vec!["hostname", "pipeline"]);
    }
}
