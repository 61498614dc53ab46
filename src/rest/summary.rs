//! `/summary` endpoints
//!
//! Both endpoints read the group-wide view, so a worker that is not the leader
//! forwards them (see [`crate::rest::forward`]).

use crate::common::{request_id, Result};
use crate::coordinator::Herder;
use crate::rest::client::{HttpResponse, RestClient};
use crate::rest::entities::{ConnectorStatuses, ConnectorsSummary};
use crate::rest::forward::{ForwardQuery, ForwardRequest, Forwarder};
use crate::rest::translate;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use std::sync::Arc;

pub const CONNECTORS_PATH: &str = "/summary/connectors";
pub const STATUSES_PATH: &str = "/summary/statuses";

pub struct SummaryState<H, C> {
    pub herder: Arc<H>,
    pub forwarder: Forwarder<C>,
}

impl<H, C> Clone for SummaryState<H, C> {
    fn clone(&self) -> Self {
        Self {
            herder: self.herder.clone(),
            forwarder: self.forwarder.clone(),
        }
    }
}

impl<H: Herder, C: RestClient> SummaryState<H, C> {
    pub fn new(herder: Arc<H>, forwarder: Forwarder<C>) -> Self {
        Self { herder, forwarder }
    }
}

pub fn create_router<H: Herder, C: RestClient>(state: SummaryState<H, C>) -> Router {
    Router::new()
        .route(CONNECTORS_PATH, get(connectors_summary::<H, C>))
        .route(STATUSES_PATH, get(connector_statuses::<H, C>))
        .with_state(state)
}

/// `GET /summary/connectors`: summary fields of every connector.
async fn connectors_summary<H: Herder, C: RestClient>(
    State(state): State<SummaryState<H, C>>,
    Query(query): Query<ForwardQuery>,
    headers: HeaderMap,
) -> Result<Json<ConnectorsSummary>> {
    let summary = state
        .forwarder
        .complete_or_forward(
            state.herder.connectors_summary(),
            &ForwardRequest::get(CONNECTORS_PATH).with_request_id(request_id(&headers)),
            translate::identity,
            query.flag(),
        )
        .await?;
    Ok(Json(summary))
}

/// Connector names resolved here, or the statuses a leader already built.
enum Listing {
    Local(Vec<String>),
    Forwarded(ConnectorStatuses),
}

fn forwarded_statuses(response: HttpResponse<ConnectorStatuses>) -> Listing {
    Listing::Forwarded(response.body)
}

/// `GET /summary/statuses`: status of every connector.
///
/// Only the connector list needs the leader. Once it is known, each status
/// is read from this worker's herder.
async fn connector_statuses<H: Herder, C: RestClient>(
    State(state): State<SummaryState<H, C>>,
    Query(query): Query<ForwardQuery>,
    headers: HeaderMap,
) -> Result<Json<ConnectorStatuses>> {
    let listing = state
        .forwarder
        .complete_or_forward(
            state.herder.connectors().map(Listing::Local),
            &ForwardRequest::get(STATUSES_PATH).with_request_id(request_id(&headers)),
            forwarded_statuses,
            query.flag(),
        )
        .await?;

    let statuses = match listing {
        Listing::Forwarded(statuses) => statuses,
        Listing::Local(names) => names
            .into_iter()
            .map(|name| -> Result<_> {
                let status = state.herder.connector_status(&name)?;
                Ok((name, status))
            })
            .collect::<Result<ConnectorStatuses>>()?,
    };
    Ok(Json(statuses))
}
