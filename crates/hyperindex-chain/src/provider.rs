use alloy::network::Ethereum;
use alloy::providers::{Provider, ProviderBuilder};
use hyperindex_core::{DiagError, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Boxed provider trait for HTTP connections
pub type BoxedProvider = Arc<dyn Provider<Ethereum> + Send + Sync>;

/// Holds the HTTP provider and the per-read timeout
pub struct ProviderManager {
    http: BoxedProvider,
    timeout: Duration,
}

impl ProviderManager {
    /// Create a new provider manager with HTTP connection
    pub fn new(http_url: &str, timeout: Duration) -> Result<Self> {
        let http_url: reqwest::Url = http_url
            .parse()
            .map_err(|e| DiagError::InvalidConfig(format!("Invalid HTTP URL: {}", e)))?;

        let http = ProviderBuilder::new().connect_http(http_url);

        Ok(Self {
            http: Arc::new(http),
            timeout,
        })
    }

    /// Wrap an already built provider
    #[cfg(test)]
    pub(crate) fn from_provider(http: BoxedProvider, timeout: Duration) -> Self {
        Self { http, timeout }
    }

    /// Get HTTP provider reference
    pub fn http(&self) -> &BoxedProvider {
        &self.http
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Await an RPC read with an explicit deadline.
///
/// Both transport errors and an elapsed deadline become `Unavailable`, tagged
/// with `what` so the operator can tell which read failed.
pub async fn with_timeout<T, E, F>(timeout: Duration, what: &str, fut: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, E>>,
    E: std::fmt::Display,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(DiagError::Unavailable(format!("{}: {}", what, e))),
        Err(_) => Err(DiagError::Unavailable(format!(
            "{}: timed out after {}s",
            what,
            timeout.as_secs_f64()
        ))),
    }
}
