//! HTTP client for the cluster API state endpoint

use crate::error::{CapiError, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default cluster API host
pub const DEFAULT_CAPI_HOST: &str = "capi-sas.yandex-team.ru";

/// Port the cluster API REST interface listens on
pub const CAPI_PORT: u16 = 29100;

/// Path of the full state document, relative to the base URL
pub const STATE_PATH: &str = "rest/v0/state/0";

/// Base URL for a cluster API host
pub fn base_url_for_host(host: &str) -> String {
    format!("http://{}:{}", host, CAPI_PORT)
}

/// Client for the cluster API
#[derive(Debug, Clone)]
pub struct CapiClient {
    client: Client,
    base_url: Url,
}

impl CapiClient {
    /// Create a client; `timeout` bounds each whole request.
    ///
    /// A path on `base_url` is kept as a prefix of the state path.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { client, base_url })
    }

    /// Full URL of the state document
    pub fn state_url(&self) -> Result<Url> {
        Ok(self.base_url.join(STATE_PATH)?)
    }

    /// GET the state document body; non-2xx responses are errors
    pub async fn fetch_state_text(&self) -> Result<String> {
        let url = self.state_url()?;
        debug!(url = %url, "Fetching cluster state");

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CapiError::Status { status, body });
        }

        let bytes = response.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
