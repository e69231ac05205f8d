// Core exporter logic

pub mod client;
pub mod collectors;
pub mod config;
pub mod metrics;
pub mod server;

// Re-export commonly used items
pub use client::DeviceClient;
pub use collectors::{DeviceCollector, DeviceKind, HeliosCollector, SmartPduCollector};
pub use config::{DeviceEndpoint, ExporterConfig, Protocol, ProxyConfig};
pub use metrics::{MetricFamily, MetricKind, MetricSample};
pub use server::MetricsServer;
