//! Translators from a peer's response to the local result type
//!
//! The forwarding engine takes one of these as a plain function. Most
//! endpoints return exactly what the peer sent and use [`identity`].

use crate::rest::client::HttpResponse;
use crate::rest::entities::Created;
use axum::http::StatusCode;

pub fn identity<T>(response: HttpResponse<T>) -> T {
    response.body
}

/// The peer answers `201 Created` for a new resource and `200 OK` for one
/// that already existed.
///
/// For forwarded writes such as connector creation; the summary endpoints are
/// read-only and only need [`identity`].
pub fn created<T>(response: HttpResponse<T>) -> Created<T> {
    Created {
        created: response.status == StatusCode::CREATED,
        result: response.body,
    }
}
