//! Prometheus text exposition format (version 0.0.4)

use crate::collector::Sample;
use crate::descriptors::MetricKind;
use std::collections::HashMap;
use std::fmt::Write;

/// Content type served on the metrics endpoint
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Prometheus metrics in text format
#[derive(Debug, Clone, Default)]
pub struct PrometheusMetrics {
    /// Metrics content in Prometheus text format
    pub content: String,
}

impl PrometheusMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render samples, grouped into families in order of first appearance
    pub fn render(samples: &[Sample]) -> Self {
        let mut families: Vec<Vec<&Sample>> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for sample in samples {
            let slot = *index.entry(sample.name).or_insert_with(|| {
                families.push(Vec::new());
                families.len() - 1
            });
            families[slot].push(sample);
        }

        let mut metrics = Self::new();
        for family in &families {
            let first = family[0];
            metrics.add_family_header(first.name, first.help, first.kind);
            for sample in family {
                metrics.add_sample(sample);
            }
        }
        metrics
    }

    fn add_family_header(&mut self, name: &str, help: &str, kind: MetricKind) {
        let _ = writeln!(self.content, "# HELP {} {}", name, escape_help(help));
        let _ = writeln!(self.content, "# TYPE {} {}", name, kind.as_str());
    }

    fn add_sample(&mut self, sample: &Sample) {
        self.content.push_str(sample.name);
        if !sample.labels.is_empty() {
            let label_str = sample
                .labels
                .iter()
                .map(|(k, v)| format!("{}=\"{}\"", k, escape_label_value(v)))
                .collect::<Vec<_>>()
                .join(",");
            let _ = write!(self.content, "{{{}}}", label_str);
        }
        let _ = writeln!(self.content, " {}", format_value(sample.value));
    }
}

fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}

fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "+Inf" } else { "-Inf" }.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(name: &'static str, kind: MetricKind, address: &str, value: f64) -> Sample {
        Sample {
            name,
            help: "A test metric",
            kind,
            labels: vec![("address", address.to_string())],
            value,
        }
    }

    #[test]
    fn test_prometheus_metrics_creation() {
        let metrics = PrometheusMetrics::new();
        assert_eq!(metrics.content, "");
        assert_eq!(PrometheusMetrics::render(&[]).content, "");
    }

    #[test]
    fn test_render_groups_families() {
        let samples = vec![
            sample("freeradius_up", MetricKind::Gauge, "a", 1.0),
            sample("freeradius_total_access_requests", MetricKind::Counter, "a", 42.0),
            sample("freeradius_up", MetricKind::Gauge, "b", 0.0),
        ];
        let content = PrometheusMetrics::render(&samples).content;

        assert_eq!(
            content,
            "# HELP freeradius_up A test metric\n\
             # TYPE freeradius_up gauge\n\
             freeradius_up{address=\"a\"} 1\n\
             freeradius_up{address=\"b\"} 0\n\
             # HELP freeradius_total_access_requests A test metric\n\
             # TYPE freeradius_total_access_requests counter\n\
             freeradius_total_access_requests{address=\"a\"} 42\n"
        );
        assert_eq!(content.matches("# TYPE freeradius_up").count(), 1);
    }

    #[test]
    fn test_label_escaping() {
        let mut s = sample("freeradius_stats_error", MetricKind::Gauge, "a", 1.0);
        s.labels.insert(0, ("error", "bad \"value\"\\\nline".to_string()));
        let content = PrometheusMetrics::render(&[s]).content;

        assert!(content.contains(
            "freeradius_stats_error{error=\"bad \\\"value\\\"\\\\\\nline\",address=\"a\"} 1\n"
        ));
    }

    #[test]
    fn test_value_formatting() {
        assert_eq!(format_value(1_700_000_000.0), "1700000000");
        assert_eq!(format_value(0.5), "0.5");
        assert_eq!(format_value(f64::NAN), "NaN");
        assert_eq!(format_value(f64::INFINITY), "+Inf");
    }

    #[test]
    fn test_help_escaping() {
        assert_eq!(escape_help("a\\b\nc"), "a\\\\b\\nc");
    }
}
