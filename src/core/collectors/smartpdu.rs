use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::{exporter_version_family, DeviceCollector};
use crate::core::client::DeviceClient;
use crate::core::config::ExporterConfig;
use crate::core::metrics::MetricFamily;
use crate::error::{ExporterError, Result};

/// The PDU API listens on its own port regardless of the web UI's
const DEFAULT_API_PORT: u16 = 8080;
const STATUS_PATH: &str = "/api/getcurrentpduvalues";

#[derive(Debug, Deserialize)]
struct PduDocument {
    #[serde(rename = "smartPDU")]
    smart_pdu: Option<SmartPdu>,
}

#[derive(Debug, Deserialize)]
struct SmartPdu {
    #[serde(default)]
    config: Option<PduConfig>,
    #[serde(default, rename = "mainInputValues")]
    main_input_values: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct PduConfig {
    #[serde(default)]
    name: Option<String>,
}

/// Exports input voltage, current and frequency from a smartPDU
pub struct SmartPduCollector {
    url: String,
    client: DeviceClient,
}

impl SmartPduCollector {
    /// An explicit `host:port` overrides the default API port
    pub fn new(config: &ExporterConfig) -> Result<Self> {
        let endpoint = &config.endpoint;
        let url = if has_port(&endpoint.host) {
            format!("{}{}", endpoint.base_url(), STATUS_PATH)
        } else {
            format!("{}:{}{}", endpoint.base_url(), DEFAULT_API_PORT, STATUS_PATH)
        };

        Ok(Self {
            url,
            client: DeviceClient::new(endpoint, config.timeout)?,
        })
    }
}

fn has_port(host: &str) -> bool {
    let host = host.trim_end_matches('/');
    match host.rsplit_once(':') {
        Some((name, port)) => {
            !port.is_empty()
                && port.chars().all(|c| c.is_ascii_digit())
                && (!name.contains(':') || name.ends_with(']'))
        }
        None => false,
    }
}

/// First element of a `[value, ...]` reading; `None` when there is no reading
fn first_reading(path: &str, value: &Value) -> Result<Option<f64>> {
    match value {
        Value::Null => Ok(None),
        Value::Array(items) => match items.first() {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n
                .as_f64()
                .map(Some)
                .ok_or_else(|| ExporterError::invalid_field(path, "number out of range")),
            Some(other) => Err(ExporterError::invalid_field(
                path,
                format!("expected a number, found {}", other),
            )),
        },
        other => Err(ExporterError::invalid_field(
            path,
            format!("expected an array of readings, found {}", other),
        )),
    }
}

impl DeviceCollector for SmartPduCollector {
    fn name(&self) -> &'static str {
        "smartpdu"
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn translate(&self, body: &[u8]) -> Result<Vec<MetricFamily>> {
        let document: PduDocument = serde_json::from_slice(body)?;
        let pdu = document
            .smart_pdu
            .ok_or_else(|| ExporterError::missing_field("smartPDU"))?;
        let name = pdu
            .config
            .and_then(|c| c.name)
            .ok_or_else(|| ExporterError::missing_field("smartPDU.config.name"))?;
        let inputs: BTreeMap<String, Value> = match pdu.main_input_values {
            Some(values) => match values.into_iter().next() {
                Some(Value::Object(map)) => map.into_iter().collect(),
                Some(other) => {
                    return Err(ExporterError::invalid_field(
                        "smartPDU.mainInputValues[0]",
                        format!("expected an object, found {}", other),
                    ))
                }
                None => return Err(ExporterError::missing_field("smartPDU.mainInputValues[0]")),
            },
            None => return Err(ExporterError::missing_field("smartPDU.mainInputValues")),
        };

        let mut voltage = MetricFamily::gauge(
            "smart_pdu_voltage",
            "Voltage from smartPDU",
            &["name", "phase"],
        );
        let mut current = MetricFamily::gauge(
            "smart_pdu_current",
            "Amperage from smartPDU",
            &["name", "phase"],
        );
        let mut frequency =
            MetricFamily::gauge("smart_pdu_frequency", "Frequency from smartPDU", &["name"]);

        for (key, value) in &inputs {
            let family = if key.ends_with('V') {
                &mut voltage
            } else if key.ends_with('I') {
                &mut current
            } else {
                continue;
            };

            let path = format!("smartPDU.mainInputValues[0].{}", key);
            if let Some(reading) = first_reading(&path, value)? {
                family.add_metric(&[name.as_str(), key.as_str()], reading);
            }
        }

        if let Some(value) = inputs.get("freq") {
            if let Some(reading) = first_reading("smartPDU.mainInputValues[0].freq", value)? {
                frequency.add_metric(&[name.as_str()], reading);
            }
        }

        Ok(vec![
            voltage,
            current,
            frequency,
            exporter_version_family("smart_pdu_exporter_version"),
        ])
    }

    fn fetch_and_translate(&self) -> Result<Vec<MetricFamily>> {
        let body = self.client.fetch(&self.url)?;
        self.translate(&body)
    }
}
