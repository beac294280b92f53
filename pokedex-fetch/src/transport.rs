use std::future::Future;

use reqwest::header::{RETRY_AFTER, USER_AGENT};
use tokio::time::Duration;

use pokedex_core::FetchSettings;

use crate::error::{FetchError, TransportError};

/// What the fetcher needs from an HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// Raw `Retry-After` header, if the server sent one.
    pub retry_after: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            retry_after: None,
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            retry_after: None,
            body: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A single GET, with no retry logic of its own.
///
/// [`ReqwestTransport`] talks to the network; tests substitute scripted
/// implementations.
pub trait Transport {
    fn get(&self, url: &str) -> impl Future<Output = Result<HttpResponse, TransportError>>;
}

pub struct ReqwestTransport {
    http: reqwest::Client,
    user_agent: String,
}

impl ReqwestTransport {
    pub fn new(settings: &FetchSettings) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            user_agent: settings.user_agent.clone(),
        })
    }
}

impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let resp = self
            .http
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let retry_after = resp
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.bytes().await?.to_vec();

        Ok(HttpResponse {
            status,
            retry_after,
            body,
        })
    }
}
