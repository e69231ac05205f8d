use parking_lot::Mutex;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

use super::swap_tracker::LdmSwapTracker;
use super::{exporter_version_family, DeviceCollector};
use crate::core::client::DeviceClient;
use crate::core::config::ExporterConfig;
use crate::core::metrics::MetricFamily;
use crate::error::{ExporterError, Result};

const STATUS_PATH: &str = "/api/v1/data/";

#[derive(Debug, Deserialize)]
struct HeliosStatus {
    dev: Option<Dev>,
    #[serde(default)]
    sys: Option<Sys>,
}

#[derive(Debug, Deserialize)]
struct Dev {
    #[serde(default)]
    receivers: BTreeMap<String, Receiver>,
    ingest: Option<Ingest>,
}

#[derive(Debug, Deserialize)]
struct Receiver {
    #[serde(default)]
    temps: BTreeMap<String, Option<f64>>,
    /// Absent when the receiver did not report modules this poll
    #[serde(default)]
    ldms: Option<BTreeMap<String, Ldm>>,
}

#[derive(Debug, Deserialize)]
struct Ldm {
    #[serde(default)]
    info: Option<LdmInfo>,
}

#[derive(Debug, Deserialize)]
struct LdmInfo {
    #[serde(default)]
    serial: Option<Serial>,
}

/// Serials come back as strings on current firmware, numbers on some older units
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Serial {
    Text(String),
    Number(serde_json::Number),
}

impl Serial {
    fn into_string(self) -> String {
        match self {
            Serial::Text(s) => s,
            Serial::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Ingest {
    #[serde(default)]
    temps: BTreeMap<String, Option<f64>>,
    #[serde(default)]
    volts: BTreeMap<String, Option<f64>>,
    #[serde(default)]
    counters: Option<Counters>,
    #[serde(default, rename = "testPattern")]
    test_pattern: Option<TestPattern>,
}

#[derive(Debug, Deserialize)]
struct Counters {
    #[serde(default)]
    reboots: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TestPattern {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    enabled: Option<Flag>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Number(f64),
}

impl Flag {
    fn as_f64(&self) -> f64 {
        match self {
            Flag::Bool(b) => f64::from(u8::from(*b)),
            Flag::Number(n) => *n,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Sys {
    #[serde(default)]
    info: Option<SysInfo>,
}

#[derive(Debug, Deserialize)]
struct SysInfo {
    #[serde(default)]
    version: Option<AppVersion>,
}

#[derive(Debug, Deserialize)]
struct AppVersion {
    #[serde(default)]
    app: Option<String>,
}

/// Exports receiver temperatures, ingest sensors and LDM churn from a
/// Megapixel Helios processor
pub struct HeliosCollector {
    host: String,
    url: String,
    client: DeviceClient,
    swaps: Mutex<LdmSwapTracker>,
}

impl HeliosCollector {
    pub fn new(config: &ExporterConfig) -> Result<Self> {
        Ok(Self {
            host: config.endpoint.host.clone(),
            url: format!("{}{}", config.endpoint.base_url(), STATUS_PATH),
            client: DeviceClient::new(&config.endpoint, config.timeout)?,
            swaps: Mutex::new(LdmSwapTracker::new()),
        })
    }

    /// LDM swaps counted so far
    pub fn ldm_swaps(&self) -> u64 {
        self.swaps.lock().total()
    }
}

impl DeviceCollector for HeliosCollector {
    fn name(&self) -> &'static str {
        "helios"
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn translate(&self, body: &[u8]) -> Result<Vec<MetricFamily>> {
        let status: HeliosStatus = serde_json::from_slice(body)?;
        let dev = status
            .dev
            .ok_or_else(|| ExporterError::missing_field("dev"))?;
        let ingest = dev
            .ingest
            .ok_or_else(|| ExporterError::missing_field("dev.ingest"))?;
        let host = self.host.as_str();

        let mut receiver_temp = MetricFamily::gauge(
            "ruby_temp",
            "Temperature from receivers",
            &["processor", "receiver", "part"],
        );
        let mut temp = MetricFamily::gauge(
            "helios_temp",
            "Temperature from helios processor",
            &["processor", "part"],
        );
        let mut volts = MetricFamily::gauge(
            "helios_volts",
            "Volts reported by helios processor",
            &["processor", "part"],
        );
        let mut version = MetricFamily::gauge(
            "helios_version",
            "Current app version as label",
            &["processor", "version"],
        );
        let mut test_pattern =
            MetricFamily::gauge("helios_test_pattern", "Test Pattern", &["processor", "type"]);
        let mut reboots =
            MetricFamily::counter("helios_reboots_total", "Reboots", &["processor"]);
        let mut swaps =
            MetricFamily::counter("helios_ldm_swaps_total", "Changes in LDMs", &["processor"]);

        let mut observed = Vec::with_capacity(dev.receivers.len());
        for (mac, receiver) in dev.receivers {
            for (part, value) in &receiver.temps {
                if let Some(value) = value {
                    receiver_temp.add_metric(&[host, mac.as_str(), part.as_str()], *value);
                }
            }

            // No `ldms` key keeps the receiver's last baseline untouched
            if let Some(ldms) = receiver.ldms {
                let serials: BTreeSet<String> = ldms
                    .into_values()
                    .filter_map(|ldm| ldm.info.and_then(|info| info.serial))
                    .map(Serial::into_string)
                    .collect();
                observed.push((mac, serials));
            }
        }

        for (part, value) in &ingest.temps {
            if let Some(value) = value {
                temp.add_metric(&[host, part.as_str()], *value);
            }
        }

        for (part, value) in &ingest.volts {
            if let Some(value) = value {
                volts.add_metric(&[host, part.as_str()], *value);
            }
        }

        if let Some(count) = ingest.counters.and_then(|c| c.reboots) {
            if count < 0.0 {
                return Err(ExporterError::invalid_field(
                    "dev.ingest.counters.reboots",
                    format!("negative counter {}", count),
                ));
            }
            reboots.add_metric(&[host], count);
        }

        if let Some(app) = status
            .sys
            .and_then(|s| s.info)
            .and_then(|i| i.version)
            .and_then(|v| v.app)
        {
            version.add_metric(&[host, app.as_str()], 1.0);
        }

        if let Some(TestPattern {
            kind: Some(kind),
            enabled: Some(enabled),
        }) = ingest.test_pattern
        {
            test_pattern.add_metric(&[host, kind.as_str()], enabled.as_f64());
        }

        // Only touch swap state once the whole document has translated
        let total = {
            let mut tracker = self.swaps.lock();
            for (mac, serials) in observed {
                tracker.observe(&mac, serials);
            }
            tracker.total()
        };
        swaps.add_metric(&[host], total as f64);

        Ok(vec![
            receiver_temp,
            temp,
            volts,
            version,
            test_pattern,
            reboots,
            swaps,
            exporter_version_family("helios_exporter_version"),
        ])
    }

    fn fetch_and_translate(&self) -> Result<Vec<MetricFamily>> {
        let body = self.client.fetch(&self.url)?;
        self.translate(&body)
    }
}
