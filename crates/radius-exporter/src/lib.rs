//! FreeRADIUS Status Exporter
//!
//! Queries a FreeRADIUS `status` virtual server with RFC 5997 Status-Server
//! requests and exposes the returned statistics as Prometheus metrics.
//!
//! # Features
//!
//! - Server statistics plus per-home-server statistics
//! - Concurrent scrapes bounded by one shared timeout
//! - Token and IP/CIDR access control on the metrics endpoint
//! - CLI, environment and JSON file configuration
//!
//! # Example
//!
//! ```rust,no_run
//! use radius_exporter::{AccessPolicy, AppState, ClientConfig, Collector, StatusClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new("127.0.0.1:18121".parse()?, "adminsecret");
//!     let collector = Collector::new(StatusClient::new(config)?);
//!
//!     let state = AppState::new(collector, AccessPolicy::default(), "/metrics");
//!     radius_exporter::http::serve("0.0.0.0:9812".parse()?, state).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod collector;
pub mod config;
pub mod descriptors;
pub mod http;
pub mod metrics;
pub mod request;
pub mod stats;

pub use client::{ClientConfig, ExchangeError, StatusClient, TargetReport};
pub use collector::{Collector, MetricFamily, Sample};
pub use config::{Cli, Config, ConfigError};
pub use descriptors::{MetricDescriptor, MetricKind};
pub use http::{AccessPolicy, AppState};
pub use metrics::PrometheusMetrics;
pub use request::{HomeServerTarget, RequestError, StatusRequest};
pub use stats::{ServerState, Statistics};
