use crate::openmeteo::error::FetchError;
use crate::openmeteo::request::WeatherRequest;
use crate::openmeteo::response::WeatherResponse;
use crate::openmeteo::response_cache::{CachePolicy, ResponseCache};
use crate::openmeteo::retry::RetryPolicy;
use log::{debug, info, warn};
use reqwest::Client;
use serde::Deserialize;
use std::future::Future;
use std::path::Path;

/// Anything that can answer a [`WeatherRequest`].
///
/// The pipeline talks to the provider only through this trait, so stages can be
/// driven by canned responses in tests.
pub trait WeatherSource {
    fn fetch(
        &self,
        request: &WeatherRequest,
        cache_policy: CachePolicy,
    ) -> impl Future<Output = Result<WeatherResponse, FetchError>> + Send;
}

/// Error body returned by the provider for rejected requests.
#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    reason: String,
}

/// Open-Meteo HTTP client with a response cache and bounded retries.
pub struct OpenMeteoClient {
    download_client: Client,
    cache: ResponseCache,
    retry: RetryPolicy,
}

impl OpenMeteoClient {
    pub fn new(cache_dir: &Path, retry: RetryPolicy) -> Self {
        Self {
            download_client: Client::new(),
            cache: ResponseCache::new(cache_dir),
            retry,
        }
    }

    /// Fetches the raw body for `url`, retrying transient failures.
    async fn download_with_retry(&self, url: &str) -> Result<String, FetchError> {
        let max_attempts = self.retry.max_attempts();
        let mut attempt = 1;
        loop {
            match self.download(url).await {
                Ok(body) => return Ok(body),
                Err(e) if Self::is_transient(&e) && attempt < max_attempts => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        "Attempt {}/{} for {} failed: {}. Retrying in {:?}",
                        attempt, max_attempts, url, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) if Self::is_transient(&e) => {
                    return Err(FetchError::RetriesExhausted {
                        url: url.to_string(),
                        attempts: attempt,
                        last_error: Box::new(e),
                    })
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn is_transient(error: &FetchError) -> bool {
        match error {
            FetchError::NetworkRequest(_, _) => true,
            FetchError::HttpStatus { status, .. } => RetryPolicy::is_retryable_status(*status),
            _ => false,
        }
    }

    async fn download(&self, url: &str) -> Result<String, FetchError> {
        debug!("Downloading data from {}", url);
        let response = self
            .download_client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::NetworkRequest(url.to_string(), e))?;

        let status = response.status();
        if status.is_client_error() {
            // The provider explains 4xx rejections (bad variable name, date out of range) in the body.
            let body = response
                .text()
                .await
                .map_err(|e| FetchError::NetworkRequest(url.to_string(), e))?;
            let reason = serde_json::from_str::<ProviderErrorBody>(&body)
                .map(|b| b.reason)
                .unwrap_or(body);
            warn!("Provider rejected {}: {}", url, reason);
            return Err(FetchError::Provider {
                url: url.to_string(),
                status,
                reason,
            });
        }

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    FetchError::HttpStatus {
                        url: url.to_string(),
                        status,
                        source: e,
                    }
                } else {
                    FetchError::NetworkRequest(url.to_string(), e)
                });
            }
        };

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::NetworkRequest(url.to_string(), e))?;
        info!("Downloaded {} bytes from {}", body.len(), url);
        Ok(body)
    }
}

impl WeatherSource for OpenMeteoClient {
    async fn fetch(
        &self,
        request: &WeatherRequest,
        cache_policy: CachePolicy,
    ) -> Result<WeatherResponse, FetchError> {
        if request.window.is_empty() {
            return Err(FetchError::EmptyWindow);
        }
        let url = request.url()?.to_string();

        let body = match self.cache.get(&url, cache_policy).await? {
            Some(body) => body,
            None => {
                let body = self.download_with_retry(&url).await?;
                // Only store bodies that parse, so a garbled download is refetched next run.
                WeatherResponse::from_json(&body)?;
                self.cache.put(&url, &body).await?;
                body
            }
        };

        let response = WeatherResponse::from_json(&body)?;
        response.log_metadata();
        Ok(response)
    }
}
