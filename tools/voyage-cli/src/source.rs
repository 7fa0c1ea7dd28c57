//! Loading catalog data from disk or the catalog API.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::{StatusCode, Url};
use thiserror::Error;

use crate::config::ApiConfig;

/// Errors from fetching catalog data.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid base_url: {0}")]
    InvalidUrl(String),

    #[error("catalog not found at {0}")]
    NotFound(String),

    #[error("server returned {status} for {url}")]
    Status { status: StatusCode, url: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SourceError {
    fn is_retryable(&self) -> bool {
        match self {
            SourceError::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            SourceError::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

/// Backoff strategy between retry attempts.
#[derive(Debug, Clone)]
pub enum Backoff {
    /// No delay between retries.
    None,
    /// Exponential backoff with base and max.
    Exponential {
        /// Initial delay.
        base: Duration,
        /// Maximum delay.
        max: Duration,
    },
}

impl Backoff {
    /// Calculate delay for a given attempt number (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        match self {
            Self::None => Duration::ZERO,
            Self::Exponential { base, max } => {
                let multiplier = 2u32.saturating_pow(attempt);
                base.saturating_mul(multiplier).min(*max)
            }
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_millis(200),
            max: Duration::from_secs(2),
        }
    }
}

/// Fetches `{base_url}/{catalog}` as a JSON array.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    base_url: Url,
    http: reqwest::Client,
    retries: u32,
    backoff: Backoff,
}

impl CatalogClient {
    pub fn new(config: &ApiConfig, base_url: &str) -> Result<Self, SourceError> {
        // A trailing slash keeps `join` from replacing the last path segment.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized).map_err(|e| SourceError::InvalidUrl(e.to_string()))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        Ok(Self {
            base_url,
            http,
            retries: config.retries,
            backoff: if config.retries == 0 {
                Backoff::None
            } else {
                Backoff::default()
            },
        })
    }

    pub fn endpoint(&self, catalog: &str) -> Result<Url, SourceError> {
        self.base_url
            .join(catalog)
            .map_err(|e| SourceError::InvalidUrl(e.to_string()))
    }

    /// Raw JSON body for a catalog, retrying transient failures.
    pub async fn fetch(&self, catalog: &str) -> Result<String, SourceError> {
        let url = self.endpoint(catalog)?;
        let mut attempt = 0;
        loop {
            match self.fetch_once(&url).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempt < self.retries => {
                    let delay = self.backoff.delay_for_attempt(attempt);
                    tracing::warn!(url = %url, attempt, error = %e, ?delay, "retrying catalog fetch");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self, url: &Url) -> Result<String, SourceError> {
        let res = self.http.get(url.clone()).send().await?;
        let status = res.status();
        if status.is_success() {
            let body = res.text().await?;
            tracing::debug!(url = %url, bytes = body.len(), "fetched catalog");
            return Ok(body);
        }
        match status {
            StatusCode::NOT_FOUND => Err(SourceError::NotFound(url.to_string())),
            _ => Err(SourceError::Status {
                status,
                url: url.to_string(),
            }),
        }
    }
}

/// Read a catalog file from disk.
pub async fn read_file(path: &Path) -> Result<String, SourceError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_backoff_is_capped() {
        let backoff = Backoff::default();
        assert_eq!(backoff.delay_for_attempt(0), Duration::from_millis(200));
        assert_eq!(backoff.delay_for_attempt(2), Duration::from_millis(800));
        assert_eq!(backoff.delay_for_attempt(10), Duration::from_secs(2));
        assert_eq!(Backoff::None.delay_for_attempt(3), Duration::ZERO);
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = CatalogClient::new(&ApiConfig::default(), "https://api.example.com/v1").unwrap();
        assert_eq!(
            client.endpoint("tours").unwrap().as_str(),
            "https://api.example.com/v1/tours"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            CatalogClient::new(&ApiConfig::default(), "::nope"),
            Err(SourceError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_retryable_statuses() {
        let err = |status| SourceError::Status {
            status,
            url: String::new(),
        };
        assert!(err(StatusCode::BAD_GATEWAY).is_retryable());
        assert!(err(StatusCode::TOO_MANY_REQUESTS).is_retryable());
        assert!(!err(StatusCode::FORBIDDEN).is_retryable());
        assert!(!SourceError::NotFound(String::new()).is_retryable());
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_file(&dir.path().join("cars.json")).await.unwrap_err();
        assert!(err.to_string().contains("cars.json"));
    }
}
