//! Scrape-time collection
//!
//! The [`Collector`] owns the status client. One collect cycle holds the lock
//! for its whole duration, so concurrent scrapes queue behind each other.

use crate::client::{StatusClient, TargetReport};
use crate::descriptors::{self, MetricDescriptor, MetricKind};
use tokio::sync::Mutex;

/// One exported time-series value
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
    pub labels: Vec<(&'static str, String)>,
    pub value: f64,
}

impl Sample {
    fn gauge(name: &'static str, help: &'static str, address: &str, value: f64) -> Self {
        Self {
            name,
            help,
            kind: MetricKind::Gauge,
            labels: vec![("address", address.to_string())],
            value,
        }
    }
}

/// Name, help text and type of one metric family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricFamily {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
}

impl From<&MetricDescriptor> for MetricFamily {
    fn from(descriptor: &MetricDescriptor) -> Self {
        Self {
            name: descriptor.name,
            help: descriptor.help,
            kind: descriptor.kind,
        }
    }
}

pub struct Collector {
    client: Mutex<StatusClient>,
    descriptors: &'static [MetricDescriptor],
}

impl Collector {
    pub fn new(client: StatusClient) -> Self {
        Self::with_descriptors(client, descriptors::describe())
    }

    pub fn with_descriptors(
        client: StatusClient,
        descriptors: &'static [MetricDescriptor],
    ) -> Self {
        Self {
            client: Mutex::new(client),
            descriptors,
        }
    }

    /// Every family `collect` can emit, liveness and Stats-Error first
    pub fn describe(&self) -> Vec<MetricFamily> {
        let mut families = Vec::with_capacity(self.descriptors.len() + 2);
        families.push(MetricFamily {
            name: descriptors::UP_NAME,
            help: descriptors::UP_HELP,
            kind: MetricKind::Gauge,
        });
        families.push(MetricFamily {
            name: descriptors::STATS_ERROR_NAME,
            help: descriptors::STATS_ERROR_HELP,
            kind: MetricKind::Gauge,
        });
        families.extend(self.descriptors.iter().map(MetricFamily::from));
        families
    }

    /// Run one scrape against every target
    pub async fn collect(&self) -> Vec<Sample> {
        let client = self.client.lock().await;
        let reports = client.stats().await;
        samples(&reports, self.descriptors)
    }
}

/// Turn target reports into samples
///
/// Every target gets a `freeradius_up` gauge. A target that answered also
/// gets its Stats-Error (when reported) and one sample per statistic present
/// in the response.
pub fn samples(reports: &[TargetReport], descriptors: &[MetricDescriptor]) -> Vec<Sample> {
    let mut samples = Vec::new();

    for report in reports {
        let up = if report.is_up() { 1.0 } else { 0.0 };
        samples.push(Sample::gauge(
            descriptors::UP_NAME,
            descriptors::UP_HELP,
            &report.address,
            up,
        ));

        let Ok(stats) = &report.result else {
            continue;
        };

        if let Some(ref error) = stats.error {
            samples.push(Sample {
                name: descriptors::STATS_ERROR_NAME,
                help: descriptors::STATS_ERROR_HELP,
                kind: MetricKind::Gauge,
                labels: vec![
                    ("error", error.clone()),
                    ("address", report.address.clone()),
                ],
                value: 1.0,
            });
        }

        for descriptor in descriptors {
            if let Some(value) = (descriptor.value)(stats) {
                samples.push(Sample {
                    name: descriptor.name,
                    help: descriptor.help,
                    kind: descriptor.kind,
                    labels: vec![("address", report.address.clone())],
                    value,
                });
            }
        }
    }

    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientConfig, ExchangeError};
    use crate::stats::Statistics;

    fn value_of(samples: &[Sample], name: &str, address: &str) -> Option<f64> {
        samples
            .iter()
            .find(|s| s.name == name && s.labels.iter().any(|(k, v)| *k == "address" && v == address))
            .map(|s| s.value)
    }

    #[test]
    fn test_down_target_only_reports_up() {
        let reports = vec![TargetReport {
            address: "10.0.0.1:1812".to_string(),
            result: Err(ExchangeError::Timeout),
        }];
        let samples = samples(&reports, descriptors::describe());

        assert_eq!(samples.len(), 1);
        assert_eq!(value_of(&samples, "freeradius_up", "10.0.0.1:1812"), Some(0.0));
    }

    #[test]
    fn test_present_fields_only() {
        let mut stats = Statistics::default();
        stats.access.requests = Some(42);
        stats.access.accepts = Some(40);
        let reports = vec![TargetReport {
            address: "127.0.0.1:18121".to_string(),
            result: Ok(stats),
        }];
        let samples = samples(&reports, descriptors::describe());

        assert_eq!(samples.len(), 3);
        assert_eq!(value_of(&samples, "freeradius_up", "127.0.0.1:18121"), Some(1.0));
        assert_eq!(
            value_of(&samples, "freeradius_total_access_requests", "127.0.0.1:18121"),
            Some(42.0)
        );
        assert_eq!(samples[1].kind, MetricKind::Counter);
        assert_eq!(value_of(&samples, "freeradius_total_access_rejects", "127.0.0.1:18121"), None);
    }

    #[test]
    fn test_stats_error_sample() {
        let stats = Statistics {
            error: Some("Home server is not auth".to_string()),
            ..Default::default()
        };
        let reports = vec![TargetReport {
            address: "172.28.1.3:1813:acct".to_string(),
            result: Ok(stats),
        }];
        let samples = samples(&reports, descriptors::describe());

        let error = samples.iter().find(|s| s.name == "freeradius_stats_error").unwrap();
        assert_eq!(
            error.labels,
            vec![
                ("error", "Home server is not auth".to_string()),
                ("address", "172.28.1.3:1813:acct".to_string())
            ]
        );
        assert_eq!(error.value, 1.0);
    }

    #[test]
    fn test_describe_covers_emitted_families() {
        let config = ClientConfig::new("127.0.0.1:18121".parse().unwrap(), "adminsecret");
        let collector = Collector::new(StatusClient::new(config).unwrap());
        let families = collector.describe();

        assert_eq!(families.len(), descriptors::describe().len() + 2);
        assert_eq!(families[0].name, "freeradius_up");
        assert_eq!(families[1].name, "freeradius_stats_error");

        let mut stats = Statistics {
            error: Some("Home server is not acct".to_string()),
            ..Default::default()
        };
        stats.access.requests = Some(1);
        stats.server.queue_use_percentage = Some(12);
        let reports = vec![
            TargetReport {
                address: "127.0.0.1:18121".to_string(),
                result: Ok(stats),
            },
            TargetReport {
                address: "172.28.1.2:1812".to_string(),
                result: Err(ExchangeError::Timeout),
            },
        ];
        for sample in samples(&reports, descriptors::describe()) {
            let family = families.iter().find(|f| f.name == sample.name).unwrap();
            assert_eq!(family.kind, sample.kind);
            assert_eq!(family.help, sample.help);
        }
    }
}
