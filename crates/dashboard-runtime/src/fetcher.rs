//! Byte fetching for source locations.

use std::future::Future;
use std::time::Duration;

use dashboard_core::error::{DashboardError, Result};
use tracing::debug;

use crate::source::SourceLocation;

/// User-Agent sent with every HTTP request.
pub const USER_AGENT: &str = concat!("billing-dashboard/", env!("CARGO_PKG_VERSION"));

const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Retrieves the raw bytes of a source.
pub trait SourceFetcher {
    fn fetch(&self, location: &SourceLocation) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// `reqwest` for URLs, the filesystem for paths.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| DashboardError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Share an existing client (e.g. with the commit lookup).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    async fn fetch_url(&self, url: &str) -> Result<Vec<u8>> {
        let fetch_err = |e: reqwest::Error| DashboardError::Fetch {
            source_id: url.to_string(),
            message: e.to_string(),
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(fetch_err)?
            .error_for_status()
            .map_err(fetch_err)?;
        let bytes = response.bytes().await.map_err(fetch_err)?;
        debug!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}

impl SourceFetcher for HttpFetcher {
    async fn fetch(&self, location: &SourceLocation) -> Result<Vec<u8>> {
        match location {
            SourceLocation::Url(url) => self.fetch_url(url).await,
            SourceLocation::Path(path) => {
                tokio::fs::read(path)
                    .await
                    .map_err(|source| DashboardError::FileRead {
                        path: path.clone(),
                        source,
                    })
            }
        }
    }
}
