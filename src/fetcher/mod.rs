use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::traits::Fetcher;

/// `reqwest` backed fetcher sending a browser-like user agent on every request
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> anyhow::Result<Self> {
        let client = Client::builder().user_agent(user_agent).build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Option<Duration>) -> Result<Vec<u8>, FetchError> {
        debug!("GET {}", url);

        let mut request = self.client.get(url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| FetchError::new(url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("{} answered {}, parsing the body anyway", url, status);
        }

        let body = response.bytes().await.map_err(|e| FetchError::new(url, e))?;

        debug!("Downloaded {} bytes from {}", body.len(), url);
        Ok(body.to_vec())
    }
}

impl Clone for HttpFetcher {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
        }
    }
}
