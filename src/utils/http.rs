use crate::error::FetchError;
use crate::score::fetch::Fetch;
use log::debug;
use reqwest::redirect::Policy;
use std::time::Duration;

/// Get the browser-like user agent sent with every request
pub fn get_user_agent() -> &'static str {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
}

/// Build the shared client: fixed user agent, request timeout, redirects followed
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .user_agent(get_user_agent())
        .timeout(timeout)
        .redirect(Policy::limited(10))
        .build()
        .map_err(FetchError::Client)
}

/// Download a URL into memory, treating non-2xx statuses as failures
pub async fn download_bytes(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, FetchError> {
    let http_error = |source: reqwest::Error| FetchError::Http {
        url: url.to_string(),
        source,
    };

    let response = client
        .get(url)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(http_error)?;

    debug!("{} -> {}", url, response.status());

    let bytes = response.bytes().await.map_err(http_error)?;
    Ok(bytes.to_vec())
}

/// `Fetch` transport backed by a real `reqwest` client
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_client(timeout)?,
        })
    }
}

impl Fetch for HttpFetcher {
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        download_bytes(&self.client, url).await
    }
}
