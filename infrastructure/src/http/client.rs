//! Thin JSON client over `reqwest`
//!
//! Endpoints are built from path segments appended to the configured base
//! URL, so ids and share tokens are percent-encoded and a base path prefix
//! (e.g. `/api`) is kept.

use super::error::HttpError;
use reqwest::{Client, RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("quota-gate/", env!("CARGO_PKG_VERSION"));

/// Shared client for one survey backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, HttpError> {
        let base_url =
            Url::parse(base_url).map_err(|e| HttpError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(HttpError::InvalidUrl(base_url.to_string()));
        }
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL with `segments` appended
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, HttpError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| HttpError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, HttpError> {
        let body = self.send(self.http.get(url)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn post_json<B, T>(&self, url: Url, body: &B) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.send(self.http.post(url).json(body)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// POST, ignoring any response body
    pub async fn post<B: Serialize + ?Sized>(&self, url: Url, body: &B) -> Result<(), HttpError> {
        self.send(self.http.post(url).json(body)).await.map(|_| ())
    }

    /// PUT, ignoring any response body
    pub async fn put<B: Serialize + ?Sized>(&self, url: Url, body: &B) -> Result<(), HttpError> {
        self.send(self.http.put(url).json(body)).await.map(|_| ())
    }

    /// GET, ignoring any response body
    pub async fn get(&self, url: Url) -> Result<(), HttpError> {
        self.send(self.http.get(url)).await.map(|_| ())
    }

    async fn send(&self, request: RequestBuilder) -> Result<String, HttpError> {
        let response = request.send().await?;
        let status = response.status();
        debug!("{} {}", status.as_u16(), response.url());

        let body = response.text().await?;
        if !status.is_success() {
            return Err(HttpError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let url = client("https://surveys.example/api/")
            .endpoint(&["quotas", "s1", "check"])
            .unwrap();
        assert_eq!(url.as_str(), "https://surveys.example/api/quotas/s1/check");
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let url = client("https://surveys.example")
            .endpoint(&["surveys", "share", "a b/c"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://surveys.example/surveys/share/a%20b%2Fc"
        );
    }

    #[test]
    fn test_rejects_non_base_url() {
        assert!(matches!(
            ApiClient::new("mailto:ops@example.com", Duration::from_secs(1)),
            Err(HttpError::InvalidUrl(_))
        ));
    }
}
