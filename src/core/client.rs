use std::time::Duration;

use crate::core::config::DeviceEndpoint;
use crate::error::{ExporterError, Result};

/// Blocking HTTP client shared by every scrape of one device
pub struct DeviceClient {
    client: reqwest::blocking::Client,
}

impl DeviceClient {
    /// Build a client for the endpoint, applying its proxy settings
    pub fn new(endpoint: &DeviceEndpoint, timeout: Duration) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder()
            .user_agent(concat!("darkbay-exporter/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout);

        if let Some(proxies) = &endpoint.proxies {
            for proxy in proxies.to_proxies()? {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder.build()?;
        Ok(Self { client })
    }

    /// GET the url and return the raw body of a successful response
    pub fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        log::debug!("GET {}", url);

        let response = self.client.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExporterError::Status {
                url: url.to_string(),
                status,
            });
        }

        Ok(response.bytes()?.to_vec())
    }
}
