//! JSON fetch collaborator used by remote proxies.
//!
//! The proxy only depends on [`JsonFetcher`]; retries, caching and timeout
//! policy belong to the implementation. [`HttpJsonFetcher`] is the default
//! `reqwest`-backed implementation.

use async_trait::async_trait;
use latebind_types::FetchError;
use reqwest::{Client, StatusCode, Url, header};
use serde_json::Value;
use tracing::{debug, warn};

use crate::settings::RemoteSettings;

/// Fetches a URL and decodes the body as JSON.
#[async_trait]
pub trait JsonFetcher: Send + Sync {
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError>;
}

/// `reqwest`-backed [`JsonFetcher`].
///
/// Relative targets (for example `/api/hello.json?first=Brad`) are joined
/// onto the configured base URL; absolute targets are used as-is.
#[derive(Debug, Clone)]
pub struct HttpJsonFetcher {
    http: Client,
    base_url: Option<Url>,
}

impl HttpJsonFetcher {
    pub fn new(settings: &RemoteSettings) -> Result<Self, FetchError> {
        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(settings.timeout)
            .user_agent(format!("latebind/{}; {}", env!("CARGO_PKG_VERSION"), std::env::consts::OS))
            .build()
            .map_err(|error| FetchError::Transport {
                url: settings.base_url.as_ref().map(Url::to_string).unwrap_or_default(),
                message: format!("build http client: {error}"),
            })?;

        Ok(Self {
            http,
            base_url: settings.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Resolves `target` against the base URL.
    pub fn resolve_url(&self, target: &str) -> Result<Url, FetchError> {
        let invalid = |message: String| FetchError::InvalidUrl {
            url: target.to_string(),
            message,
        };
        match Url::parse(target) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = self
                    .base_url
                    .as_ref()
                    .ok_or_else(|| invalid("relative URL requires a configured base URL".to_string()))?;
                base.join(target).map_err(|error| invalid(error.to_string()))
            }
            Err(error) => Err(invalid(error.to_string())),
        }
    }
}

#[async_trait]
impl JsonFetcher for HttpJsonFetcher {
    async fn fetch_json(&self, target: &str) -> Result<Value, FetchError> {
        let url = self.resolve_url(target)?;
        debug!(%url, "fetching remote component");

        let response = self.http.get(url.clone()).send().await.map_err(|error| {
            warn!(%url, %error, "remote component request failed");
            FetchError::Transport {
                url: target.to_string(),
                message: error.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "remote component returned error status");
            return Err(status_error(target, status));
        }

        let body = response.text().await.map_err(|error| FetchError::Transport {
            url: target.to_string(),
            message: error.to_string(),
        })?;
        let payload = serde_json::from_str(&body).map_err(|error| FetchError::Decode {
            url: target.to_string(),
            message: error.to_string(),
        })?;
        debug!(%url, bytes = body.len(), "remote component fetched");
        Ok(payload)
    }
}

fn status_error(target: &str, status: StatusCode) -> FetchError {
    FetchError::Status {
        url: target.to_string(),
        status: status.as_u16(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn fetcher(base_url: Option<&str>) -> HttpJsonFetcher {
        let settings = RemoteSettings {
            base_url: base_url.map(|base| Url::parse(base).expect("base url")),
            timeout: Duration::from_secs(5),
        };
        HttpJsonFetcher::new(&settings).expect("client")
    }

    #[test]
    fn resolve_url_joins_relative_targets_onto_base() {
        let fetcher = fetcher(Some("http://localhost:3002"));
        let url = fetcher.resolve_url("/api/hello.json?first=Brad").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3002/api/hello.json?first=Brad");
    }

    #[test]
    fn resolve_url_keeps_absolute_targets() {
        let fetcher = fetcher(Some("http://localhost:3002"));
        let url = fetcher.resolve_url("https://example.com/v/trend.json").unwrap();
        assert_eq!(url.as_str(), "https://example.com/v/trend.json");
    }

    #[test]
    fn resolve_url_requires_base_for_relative_targets() {
        let fetcher = fetcher(None);
        let error = fetcher.resolve_url("/api/hello.json").unwrap_err();
        assert!(matches!(error, FetchError::InvalidUrl { .. }));
        assert_eq!(error.url(), "/api/hello.json");
    }

    #[test]
    fn non_success_status_maps_to_status_error() {
        let error = status_error("/api", StatusCode::NOT_FOUND);
        assert_eq!(
            error,
            FetchError::Status {
                url: "/api".into(),
                status: 404
            }
        );
    }
}
