//! Outbound HTTP client used to forward requests to the leader

use crate::common::{Error, Result, REQUEST_ID_HEADER};
use crate::rest::errors::ErrorMessage;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;

/// A parsed response from a peer worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse<T> {
    pub status: StatusCode,
    pub body: T,
}

/// Capability to issue a REST request to another worker.
///
/// A successful response body is parsed as JSON into `T`. An error response
/// from the peer becomes `Error::Peer` carrying the peer's status, and a
/// transport failure becomes `Error::Http`. `request_id` is sent as
/// `X-Request-ID` so the peer logs under the same ID.
pub trait RestClient: Send + Sync + 'static {
    fn http_request<T>(
        &self,
        url: &str,
        method: Method,
        body: Option<serde_json::Value>,
        request_id: Option<&str>,
    ) -> impl Future<Output = Result<HttpResponse<T>>> + Send
    where
        T: DeserializeOwned + Send + 'static;
}

/// [`RestClient`] over reqwest.
#[derive(Clone)]
pub struct HttpRestClient {
    client: reqwest::Client,
}

impl HttpRestClient {
    /// Every forwarded request is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

fn forward_io_error(e: reqwest::Error) -> Error {
    Error::Http(format!("IO Error trying to forward REST request: {}", e))
}

impl RestClient for HttpRestClient {
    async fn http_request<T>(
        &self,
        url: &str,
        method: Method,
        body: Option<serde_json::Value>,
        request_id: Option<&str>,
    ) -> Result<HttpResponse<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let mut request = self
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(id) = request_id {
            request = request.header(REQUEST_ID_HEADER, id);
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(forward_io_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(forward_io_error)?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorMessage>(&bytes)
                .map(|m| m.message)
                .unwrap_or_else(|_| {
                    format!(
                        "Unexpected status code when handling forwarded request: {}",
                        status.as_u16()
                    )
                });
            return Err(Error::Peer {
                status: status.as_u16(),
                message,
            });
        }

        let body = if bytes.is_empty() {
            serde_json::from_slice(b"null")?
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok(HttpResponse { status, body })
    }
}
