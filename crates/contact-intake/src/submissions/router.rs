use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, ConnectInfo, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, warn};

use super::domain::{ContactForm, RequestMetadata};
use super::error::SubmissionError;
use super::query::SubmissionQuery;
use super::service::SubmissionService;
use super::status::StatusUpdate;
use super::store::{StoreError, SubmissionStore};
use crate::config::CorsConfig;

pub const SUBMIT_PATH: &str = "/api/v1/contact";
pub const ADMIN_LIST_PATH: &str = "/api/v1/admin/submissions";
pub const ADMIN_UPDATE_PATH: &str = "/api/v1/admin/submissions/:id";

/// `Access-Control-Allow-Origin` values per endpoint group.
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    /// Submit and status update.
    pub public: HeaderValue,
    /// Admin listing.
    pub admin_list: HeaderValue,
}

impl OriginPolicy {
    pub fn from_config(config: &CorsConfig) -> Self {
        let defaults = CorsConfig::default();
        Self {
            public: origin_header(&config.allowed_origin, &defaults.allowed_origin),
            admin_list: origin_header(&config.admin_list_origin, &defaults.admin_list_origin),
        }
    }
}

impl Default for OriginPolicy {
    fn default() -> Self {
        Self::from_config(&CorsConfig::default())
    }
}

fn origin_header(value: &str, fallback: &str) -> HeaderValue {
    HeaderValue::from_str(value).unwrap_or_else(|_| {
        warn!(origin = value, fallback, "origin is not a valid header value, using fallback");
        HeaderValue::from_str(fallback).unwrap_or(HeaderValue::from_static("*"))
    })
}

struct RouteState<S> {
    service: Arc<SubmissionService<S>>,
    origins: Arc<OriginPolicy>,
}

impl<S> Clone for RouteState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            origins: Arc::clone(&self.origins),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TimestampParam {
    timestamp: Option<String>,
}

/// Router builder exposing the public submit endpoint and the admin endpoints.
pub fn submission_router<S>(service: Arc<SubmissionService<S>>, origins: OriginPolicy) -> Router
where
    S: SubmissionStore + 'static,
{
    Router::new()
        .route(SUBMIT_PATH, post(submit_handler::<S>))
        .route(ADMIN_LIST_PATH, get(list_handler::<S>))
        .route(ADMIN_UPDATE_PATH, put(update_handler::<S>))
        .with_state(RouteState {
            service,
            origins: Arc::new(origins),
        })
}

async fn submit_handler<S>(
    State(state): State<RouteState<S>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    S: SubmissionStore + 'static,
{
    let origin = &state.origins.public;
    let form: ContactForm = match serde_json::from_slice(&body) {
        Ok(form) => form,
        Err(err) => return error_response(origin, SubmissionError::MalformedBody(err.to_string())),
    };

    let metadata = request_metadata(&headers, connect_info.map(|ConnectInfo(addr)| addr));
    match blocking(&state.service, move |service| service.submit(form, metadata)).await {
        Ok(receipt) => respond(
            origin,
            StatusCode::OK,
            json!({
                "message": "Form submission successful",
                "submissionId": receipt.submission.id,
            }),
        ),
        Err(err) => error_response(origin, err),
    }
}

async fn list_handler<S>(
    State(state): State<RouteState<S>>,
    query: Result<Query<SubmissionQuery>, QueryRejection>,
) -> Response
where
    S: SubmissionStore + 'static,
{
    let origin = &state.origins.admin_list;
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return error_response(origin, malformed_query(rejection)),
    };

    match blocking(&state.service, move |service| service.list(query)).await {
        Ok(page) => respond(origin, StatusCode::OK, page),
        Err(err) => error_response(origin, err),
    }
}

async fn update_handler<S>(
    State(state): State<RouteState<S>>,
    Path(id): Path<String>,
    params: Result<Query<TimestampParam>, QueryRejection>,
    body: Bytes,
) -> Response
where
    S: SubmissionStore + 'static,
{
    let origin = &state.origins.public;
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => return error_response(origin, malformed_query(rejection)),
    };
    let update = if body.iter().all(u8::is_ascii_whitespace) {
        StatusUpdate::default()
    } else {
        match serde_json::from_slice::<StatusUpdate>(&body) {
            Ok(update) => update,
            Err(err) => {
                return error_response(origin, SubmissionError::MalformedBody(err.to_string()))
            }
        }
    };

    let updated = blocking(&state.service, move |service| {
        service.update_status(&id, params.timestamp.as_deref(), &update)
    })
    .await;
    match updated {
        Ok(submission) => respond(
            origin,
            StatusCode::OK,
            json!({
                "message": "Submission updated successfully",
                "submission": submission,
            }),
        ),
        Err(err) => error_response(origin, err),
    }
}

/// Runs a store-backed operation on the blocking pool; file-backed writes sync to disk.
async fn blocking<S, T, F>(
    service: &Arc<SubmissionService<S>>,
    operation: F,
) -> Result<T, SubmissionError>
where
    S: SubmissionStore + 'static,
    T: Send + 'static,
    F: FnOnce(&SubmissionService<S>) -> Result<T, SubmissionError> + Send + 'static,
{
    let service = Arc::clone(service);
    tokio::task::spawn_blocking(move || operation(&service))
        .await
        .map_err(|err| {
            SubmissionError::Store(StoreError::Unavailable(format!("store task failed: {err}")))
        })?
}

/// Source IP from the first `X-Forwarded-For` hop, else the peer address.
pub(crate) fn request_metadata(headers: &HeaderMap, peer: Option<SocketAddr>) -> RequestMetadata {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string);

    RequestMetadata {
        ip_address: forwarded.or_else(|| peer.map(|addr| addr.ip().to_string())),
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
    }
}

fn malformed_query(rejection: QueryRejection) -> SubmissionError {
    SubmissionError::MalformedQuery(rejection.body_text())
}

fn respond<T: Serialize>(origin: &HeaderValue, status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone())],
        Json(body),
    )
        .into_response()
}

fn error_response(origin: &HeaderValue, err: SubmissionError) -> Response {
    let status = err.status_code();
    if status.is_server_error() {
        error!(error = %err, "submission request failed");
    } else {
        debug!(error = %err, %status, "submission request rejected");
    }

    let mut body = json!({ "message": err.public_message() });
    if let Some(errors) = err.field_errors() {
        body["errors"] = json!(errors);
    }
    respond(origin, status, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forwarded_for_wins_over_peer_address() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("198.51.100.7, 10.0.0.1"));
        headers.insert(header::USER_AGENT, HeaderValue::from_static("curl/8.0"));

        let metadata = request_metadata(&headers, Some(SocketAddr::from(([10, 0, 0, 2], 443))));
        assert_eq!(metadata.ip_address.as_deref(), Some("198.51.100.7"));
        assert_eq!(metadata.user_agent.as_deref(), Some("curl/8.0"));
    }

    #[test]
    fn falls_back_to_peer_address() {
        let metadata = request_metadata(
            &HeaderMap::new(),
            Some(SocketAddr::from(([203, 0, 113, 4], 50000))),
        );
        assert_eq!(metadata.ip_address.as_deref(), Some("203.0.113.4"));
        assert!(metadata.user_agent.is_none());
    }

    #[test]
    fn invalid_origin_falls_back_to_default() {
        let policy = OriginPolicy::from_config(&CorsConfig {
            allowed_origin: "bad\norigin".to_string(),
            admin_list_origin: "https://admin.example.com".to_string(),
        });
        assert_eq!(policy.public, "https://thunk-it.com");
        assert_eq!(policy.admin_list, "https://admin.example.com");
    }
}
