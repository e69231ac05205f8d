//! Device collectors.
//!
//! Each device family maps its vendor JSON onto a fixed set of metric
//! families. A scrape either yields every family or fails as a whole.

pub mod helios;
pub mod smartpdu;
pub mod swap_tracker;

pub use helios::HeliosCollector;
pub use smartpdu::SmartPduCollector;
pub use swap_tracker::LdmSwapTracker;

use std::fmt;
use std::sync::Arc;

use crate::core::config::ExporterConfig;
use crate::core::metrics::MetricFamily;
use crate::error::Result;

/// Version reported by the `*_exporter_version` families
pub const EXPORTER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A source of metric families, queried once per scrape
pub trait DeviceCollector: Send + Sync {
    /// Device family name, for logs
    fn name(&self) -> &'static str;

    /// Status URL polled on every scrape
    fn url(&self) -> &str;

    /// Map one JSON status document onto metric families
    ///
    /// Every named family is present in the returned list, even with no
    /// samples; `encode_text` leaves sample-less families out of the output.
    fn translate(&self, body: &[u8]) -> Result<Vec<MetricFamily>>;

    /// Poll the device and translate its answer
    fn fetch_and_translate(&self) -> Result<Vec<MetricFamily>>;
}

/// Device families this exporter knows how to poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Helios,
    SmartPdu,
}

impl DeviceKind {
    pub fn build(self, config: &ExporterConfig) -> Result<Arc<dyn DeviceCollector>> {
        let collector: Arc<dyn DeviceCollector> = match self {
            DeviceKind::Helios => Arc::new(HeliosCollector::new(config)?),
            DeviceKind::SmartPdu => Arc::new(SmartPduCollector::new(config)?),
        };
        Ok(collector)
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Helios => f.write_str("Helios"),
            DeviceKind::SmartPdu => f.write_str("SmartPDU"),
        }
    }
}

pub(crate) fn exporter_version_family(name: &str) -> MetricFamily {
    let mut family = MetricFamily::gauge(name, "Current Exporter Version", &["version"]);
    family.add_metric(&[EXPORTER_VERSION], 1.0);
    family
}
