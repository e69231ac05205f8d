use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ExporterError, Result};

/// Environment variable holding a JSON object of proxy settings
pub const PROXIES_ENV: &str = "PROXIES";
pub const DEFAULT_PORT: u16 = 9091;
pub const DEFAULT_PROTOCOL: Protocol = Protocol::Http;
/// Matches the reqwest blocking client's own default
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Scheme used to reach the device API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Http,
    Https,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = ExporterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Protocol::Http),
            "https" => Ok(Protocol::Https),
            other => Err(ExporterError::config(format!(
                "unsupported protocol '{}' (expected http or https)",
                other
            ))),
        }
    }
}

/// Proxy settings in the `{"http": "...", "https": "..."}` shape
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProxyConfig {
    #[serde(default)]
    pub http: Option<String>,
    #[serde(default)]
    pub https: Option<String>,
    #[serde(default)]
    pub all: Option<String>,
    /// Keys we do not know how to apply; reported and skipped
    #[serde(flatten)]
    pub unsupported: BTreeMap<String, serde_json::Value>,
}

impl ProxyConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| {
            ExporterError::config(format!("{} is not a valid JSON object: {}", PROXIES_ENV, e))
        })
    }

    /// Read proxy settings from the `PROXIES` environment variable, if set
    pub fn from_env() -> Result<Option<Self>> {
        match std::env::var(PROXIES_ENV) {
            Ok(raw) if !raw.trim().is_empty() => Self::from_json(&raw).map(Some),
            _ => Ok(None),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.http.is_none() && self.https.is_none() && self.all.is_none()
    }

    /// Convert into reqwest proxies, skipping keys that have no reqwest equivalent
    pub fn to_proxies(&self) -> Result<Vec<reqwest::Proxy>> {
        for key in self.unsupported.keys() {
            log::warn!("Ignoring unsupported proxy key '{}'", key);
        }

        let mut proxies = Vec::new();
        if let Some(url) = &self.all {
            proxies.push(reqwest::Proxy::all(url.as_str()).map_err(|e| invalid_proxy("all", e))?);
        }
        if let Some(url) = &self.http {
            proxies.push(reqwest::Proxy::http(url.as_str()).map_err(|e| invalid_proxy("http", e))?);
        }
        if let Some(url) = &self.https {
            proxies.push(reqwest::Proxy::https(url.as_str()).map_err(|e| invalid_proxy("https", e))?);
        }
        Ok(proxies)
    }
}

impl fmt::Display for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries = Vec::new();
        for (key, url) in [("http", &self.http), ("https", &self.https), ("all", &self.all)] {
            if let Some(url) = url {
                entries.push(format!("{}={}", key, url));
            }
        }
        write!(f, "{{{}}}", entries.join(", "))
    }
}

fn invalid_proxy(key: &str, err: reqwest::Error) -> ExporterError {
    ExporterError::config(format!("invalid {} proxy: {}", key, err))
}

/// Where the device lives; fixed for the life of the process
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceEndpoint {
    pub host: String,
    pub protocol: Protocol,
    pub proxies: Option<ProxyConfig>,
}

impl DeviceEndpoint {
    pub fn new<S: Into<String>>(host: S, protocol: Protocol) -> Self {
        Self {
            host: host.into(),
            protocol,
            proxies: None,
        }
    }

    pub fn with_proxies(mut self, proxies: Option<ProxyConfig>) -> Self {
        self.proxies = proxies;
        self
    }

    /// `{protocol}://{host}` with no trailing slash
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.protocol, self.host.trim_end_matches('/'))
    }
}

/// Runtime configuration for one exporter process
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    pub endpoint: DeviceEndpoint,
    pub port: u16,
    pub debug: bool,
    pub timeout: Duration,
}

impl ExporterConfig {
    pub fn new(endpoint: DeviceEndpoint) -> Self {
        Self {
            endpoint,
            port: DEFAULT_PORT,
            debug: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}
