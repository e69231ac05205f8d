//! Device-neutral metric families and their Prometheus text rendering.
//!
//! Collectors build a fresh `Vec<MetricFamily>` per scrape; [`encode_text`]
//! turns it into the exposition format through a throwaway registry.

use prometheus::{CounterVec, Encoder, GaugeVec, Opts, Registry, TextEncoder};

use crate::error::{ExporterError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
}

/// One observation; `labels` line up with the family's label names
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub labels: Vec<String>,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricFamily {
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
    pub label_names: Vec<String>,
    pub samples: Vec<MetricSample>,
}

impl MetricFamily {
    fn new(name: &str, help: &str, kind: MetricKind, label_names: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            help: help.to_string(),
            kind,
            label_names: label_names.iter().map(|l| l.to_string()).collect(),
            samples: Vec::new(),
        }
    }

    pub fn gauge(name: &str, help: &str, label_names: &[&str]) -> Self {
        Self::new(name, help, MetricKind::Gauge, label_names)
    }

    pub fn counter(name: &str, help: &str, label_names: &[&str]) -> Self {
        Self::new(name, help, MetricKind::Counter, label_names)
    }

    /// Record a sample. Label values must match the family's label names in order.
    pub fn add_metric<S: AsRef<str>>(&mut self, labels: &[S], value: f64) {
        debug_assert_eq!(labels.len(), self.label_names.len());
        self.samples.push(MetricSample {
            labels: labels.iter().map(|l| l.as_ref().to_string()).collect(),
            value,
        });
    }

    /// Value of the sample with exactly these label values
    pub fn value_for(&self, labels: &[&str]) -> Option<f64> {
        self.samples
            .iter()
            .find(|s| s.labels.iter().map(String::as_str).eq(labels.iter().copied()))
            .map(|s| s.value)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Look a family up by name in a scrape result
pub fn find_family<'a>(families: &'a [MetricFamily], name: &str) -> Option<&'a MetricFamily> {
    families.iter().find(|f| f.name == name)
}

/// Render families in the Prometheus text exposition format.
///
/// Families without samples are left out of the output, as the prometheus
/// registry prunes them on gather.
pub fn encode_text(families: &[MetricFamily]) -> Result<String> {
    let registry = Registry::new();

    for family in families {
        let label_names: Vec<&str> = family.label_names.iter().map(String::as_str).collect();
        let opts = Opts::new(family.name.as_str(), family.help.as_str());

        match family.kind {
            MetricKind::Gauge => {
                let vec = GaugeVec::new(opts, &label_names)?;
                for sample in &family.samples {
                    let values: Vec<&str> = sample.labels.iter().map(String::as_str).collect();
                    vec.get_metric_with_label_values(&values)?.set(sample.value);
                }
                registry.register(Box::new(vec))?;
            }
            MetricKind::Counter => {
                let vec = CounterVec::new(opts, &label_names)?;
                for sample in &family.samples {
                    if sample.value < 0.0 || sample.value.is_nan() {
                        return Err(ExporterError::invalid_field(
                            family.name.as_str(),
                            format!("counter value {} is not a non-negative number", sample.value),
                        ));
                    }
                    let values: Vec<&str> = sample.labels.iter().map(String::as_str).collect();
                    vec.get_metric_with_label_values(&values)?.inc_by(sample.value);
                }
                registry.register(Box::new(vec))?;
            }
        }
    }

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| ExporterError::invalid_field("exposition", e.to_string()))
}
