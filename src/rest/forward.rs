//! Bounded-hop request forwarding
//!
//! A worker that is not the leader answers a group query by forwarding it to
//! the leader named in the herder's redirect. The `forward` query parameter
//! bounds the chain to two hops in total:
//!
//! ```text
//! client ──(forward unset)──► worker A ──(forward=true)──► worker B ──(forward=false)──► worker C
//!                                                                                       │
//!                                                      not leader either: 409 Conflict ◄┘
//! ```
//!
//! Each worker enforces the bound on its own from the flag it received, so no
//! hop count is tracked centrally.

use crate::common::{join_url, Result};
use crate::coordinator::PendingOperation;
use crate::rest::client::{HttpResponse, RestClient};
use crate::rest::errors::{classify, Classified, RequestFailure};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Forwarding state of an inbound request, from its `forward` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardFlag {
    /// No parameter: first worker to see the request.
    Unset,
    /// `forward=true`: forwarded once, one more hop allowed.
    AllowedRecursive,
    /// `forward=false`: no hops left.
    Forbidden,
}

impl From<Option<bool>> for ForwardFlag {
    fn from(forward: Option<bool>) -> Self {
        match forward {
            None => ForwardFlag::Unset,
            Some(true) => ForwardFlag::AllowedRecursive,
            Some(false) => ForwardFlag::Forbidden,
        }
    }
}

impl ForwardFlag {
    /// The `forward` value to send with the next hop, or `None` if this
    /// request may not be forwarded again.
    pub fn next_hop(self) -> Option<bool> {
        match self {
            ForwardFlag::Unset => Some(true),
            ForwardFlag::AllowedRecursive => Some(false),
            ForwardFlag::Forbidden => None,
        }
    }
}

/// Query string of forwardable endpoints.
///
/// `forward` is read leniently: `true` in any case means true, and any other
/// value (including an empty one) means false. A malformed flag never turns
/// into a rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ForwardQuery {
    pub forward: Option<String>,
}

impl ForwardQuery {
    pub fn flag(&self) -> ForwardFlag {
        self.forward
            .as_deref()
            .map(|value| value.eq_ignore_ascii_case("true"))
            .into()
    }
}

/// How to reissue a request against another worker.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub path: String,
    pub method: Method,
    pub body: Option<serde_json::Value>,
    /// ID of the inbound request, sent along as `X-Request-ID`
    pub request_id: Option<String>,
}

impl ForwardRequest {
    pub fn new(path: impl Into<String>, method: Method, body: Option<serde_json::Value>) -> Self {
        Self {
            path: path.into(),
            method,
            body,
            request_id: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(path, Method::GET, None)
    }

    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }

    /// URL of this request on the worker at `base_url`.
    pub fn url(&self, base_url: &str, forward: bool) -> String {
        format!("{}?forward={}", join_url(base_url, &self.path), forward)
    }
}

/// Waits on herder operations and forwards to the leader when redirected.
pub struct Forwarder<C> {
    client: Arc<C>,
    request_timeout: Duration,
}

impl<C> Clone for Forwarder<C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            request_timeout: self.request_timeout,
        }
    }
}

impl<C: RestClient> Forwarder<C> {
    pub fn new(client: Arc<C>, request_timeout: Duration) -> Self {
        Self {
            client,
            request_timeout,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Wait for `pending`; if the herder redirects to the leader and the
    /// request still has a hop left, reissue it there and translate the
    /// peer's response with `translate`.
    ///
    /// At most one outbound call is made. Its own failures are returned as is.
    pub async fn complete_or_forward<T, U, F>(
        &self,
        pending: PendingOperation<T>,
        request: &ForwardRequest,
        translate: F,
        flag: ForwardFlag,
    ) -> Result<T>
    where
        T: Send + 'static,
        U: DeserializeOwned + Send + 'static,
        F: FnOnce(HttpResponse<U>) -> T + Send,
    {
        let error = match pending.wait(self.request_timeout).await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        match classify(error) {
            Classified::Redirect(leader_url) => match flag.next_hop() {
                Some(recursive_forward) => {
                    let url = request.url(&leader_url, recursive_forward);
                    tracing::debug!(
                        "Forwarding request {} {} {:?}",
                        url,
                        request.method,
                        request.body
                    );
                    let response = self
                        .client
                        .http_request::<U>(
                            &url,
                            request.method.clone(),
                            request.body.clone(),
                            request.request_id.as_deref(),
                        )
                        .await?;
                    Ok(translate(response))
                }
                None => {
                    tracing::info!(
                        path = %request.path,
                        leader = %leader_url,
                        "Not forwarding request again, hop limit reached"
                    );
                    Err(RequestFailure::RebalanceConflict.into())
                }
            },
            Classified::Failure(failure) => Err(failure.into()),
            Classified::Unclassified(e) => Err(e),
        }
    }
}
