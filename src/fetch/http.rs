//! reqwest-backed client for the imagery backend.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use web_time::Instant;

use super::{ImageryFetcher, QueryError, decode_response};
use crate::config::{BackendConfig, ConfigError};
use crate::model::ImageryResult;
use crate::raster::{RasterError, RasterSource, append_path};

/// Request body of the imagery endpoint.
#[derive(Serialize)]
struct QueryRequest<'a> {
    location: &'a str,
}

/// HTTP client for the imagery backend.
///
/// Serves both the imagery query (POST) and the rendered layer downloads
/// (GET against the backend origin).
#[derive(Debug, Clone)]
pub struct HttpImageryClient {
    client: Client,
    origin: Url,
    query_url: Url,
}

impl HttpImageryClient {
    /// Build a client from the backend section of the configuration.
    pub fn new(config: &BackendConfig) -> Result<Self, ConfigError> {
        let origin = Url::parse(&config.origin).map_err(|e| ConfigError::InvalidUrl {
            field: "backend.origin",
            message: format!("'{}': {}", config.origin, e),
        })?;
        let query_url =
            append_path(&origin, &config.query_path).map_err(|e| ConfigError::InvalidUrl {
                field: "backend.query_path",
                message: format!("'{}': {}", config.query_path, e),
            })?;

        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(30));
        let client = builder
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            origin,
            query_url,
        })
    }

    /// Origin layer and download paths are resolved against.
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Full URL of the imagery endpoint.
    pub fn query_url(&self) -> &Url {
        &self.query_url
    }
}

#[async_trait(?Send)]
impl ImageryFetcher for HttpImageryClient {
    async fn fetch_imagery(&self, location: &str) -> Result<ImageryResult, QueryError> {
        log::info!("🛰️ Requesting imagery for '{}' from {}", location, self.query_url);
        let started = Instant::now();

        let response = self
            .client
            .post(self.query_url.clone())
            .json(&QueryRequest { location })
            .send()
            .await
            .map_err(|e| QueryError::transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| QueryError::transport(e.to_string()))?;

        log::debug!(
            "🛰️ Backend answered {} for '{}' in {:?} ({} bytes)",
            status,
            location,
            started.elapsed(),
            body.len()
        );

        decode_response(status, &body)
    }
}

#[async_trait(?Send)]
impl RasterSource for HttpImageryClient {
    async fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>, RasterError> {
        log::debug!("🖼️ Downloading layer image {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| RasterError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RasterError::Fetch(format!("{} returned {}", url, status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RasterError::Fetch(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(origin: &str, query_path: &str) -> BackendConfig {
        BackendConfig {
            origin: origin.to_string(),
            query_path: query_path.to_string(),
            ..BackendConfig::default()
        }
    }

    #[test]
    fn test_default_endpoint() {
        let client = HttpImageryClient::new(&BackendConfig::default()).unwrap();
        assert_eq!(client.query_url().as_str(), "http://127.0.0.1:8001/gee/run");
        assert_eq!(client.origin().as_str(), "http://127.0.0.1:8001/");
    }

    #[test]
    fn test_custom_endpoint() {
        let client = HttpImageryClient::new(&backend("https://imagery.example.org", "/api/gee"))
            .unwrap();
        assert_eq!(client.query_url().as_str(), "https://imagery.example.org/api/gee");
    }

    #[test]
    fn test_prefixed_origin_keeps_prefix() {
        let client =
            HttpImageryClient::new(&backend("https://host.example/backend", "/gee/run")).unwrap();
        assert_eq!(client.query_url().as_str(), "https://host.example/backend/gee/run");
    }

    #[test]
    fn test_invalid_origin_is_rejected() {
        let err = HttpImageryClient::new(&backend("not a url", "/gee/run")).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidUrl {
                field: "backend.origin",
                ..
            }
        ));
    }
}
