//! HTTP boundary for uploads and browsing.

use crate::response::{self, ServerMessage};
use crate::{AccessGate, IngestionPipeline};
use axum::{
    Router,
    body::Bytes,
    extract::{ConnectInfo, DefaultBodyLimit, Multipart, State, multipart::MultipartRejection},
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use galleria_error::{
    GalleriaError, GalleriaErrorKind, MethodError, NotFoundError, StagingError, StagingErrorKind,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Multipart field that carries the uploaded file.
pub const UPLOAD_FIELD: &str = "file";

/// Shared state for all handlers.
#[derive(Clone)]
pub struct ApiState {
    pipeline: Arc<IngestionPipeline>,
    gate: Arc<AccessGate>,
    cookie_name: Arc<str>,
    max_upload_bytes: usize,
}

impl ApiState {
    /// Creates new API state.
    pub fn new(
        pipeline: Arc<IngestionPipeline>,
        gate: AccessGate,
        cookie_name: impl Into<Arc<str>>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            pipeline,
            gate: Arc::new(gate),
            cookie_name: cookie_name.into(),
            max_upload_bytes,
        }
    }

    /// Pipeline behind the upload endpoint.
    pub fn pipeline(&self) -> &Arc<IngestionPipeline> {
        &self.pipeline
    }
}

/// Creates the application router.
///
/// The server must be run with
/// `into_make_service_with_connect_info::<SocketAddr>()` so handlers can log
/// the remote address.
pub fn create_router(state: ApiState) -> Router {
    let limit = state.max_upload_bytes;
    Router::new()
        .route("/api/upload", post(upload).fallback(api_fallback))
        .route("/gallery", get(gallery))
        .route("/health", get(health_check))
        .fallback(api_fallback)
        .layer(DefaultBodyLimit::max(limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Render an error, logging refusals and server-side failures.
fn failure(err: &GalleriaError, remote: SocketAddr, uri: &Uri, context: &str) -> Response {
    let reply = response::from_error(err);
    let status = reply.status();

    if status == StatusCode::FORBIDDEN {
        tracing::warn!(remote = %remote, path = %uri.path(), reason = %response::diagnostic(err), "Returned 403");
    } else if status.is_server_error() {
        tracing::error!(remote = %remote, path = %uri.path(), error = %err, context, "Returned {}", status.as_u16());
    } else {
        tracing::debug!(remote = %remote, path = %uri.path(), status = status.as_u16(), "Rejected request");
    }

    reply.into_response()
}

/// Value of the cookie called `name`, if the request sent one.
fn session_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
}

/// Pull the bytes of the `file` field out of a multipart body.
async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Bytes, StagingError> {
    let mut multipart = multipart
        .map_err(|e| StagingError::new(StagingErrorKind::Multipart(e.body_text())))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| StagingError::new(StagingErrorKind::Multipart(e.body_text())))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            return field
                .bytes()
                .await
                .map_err(|e| StagingError::new(StagingErrorKind::Multipart(e.body_text())));
        }
    }

    Err(StagingError::new(StagingErrorKind::MissingField(
        UPLOAD_FIELD.to_string(),
    )))
}

/// Accept a multipart upload and ingest it.
async fn upload(
    State(state): State<ApiState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    uri: Uri,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let cookie = session_cookie(&headers, &state.cookie_name);
    if let Err(e) = state.gate.admit_upload(cookie.as_deref()) {
        return failure(&GalleriaError::from(e), remote, &uri, "Refused upload");
    }

    let data = match read_upload(multipart).await {
        Ok(data) => data,
        Err(e) => return failure(&GalleriaError::from(e), remote, &uri, "Error saving file"),
    };

    match state.pipeline.ingest(&data).await {
        Ok(id) => ServerMessage::new(StatusCode::CREATED, "Created")
            .with_image_hash(id.as_str())
            .into_response(),
        Err(e) => {
            let context = match e.kind() {
                GalleriaErrorKind::Staging(_) => "Error saving file",
                _ => "Error converting file",
            };
            failure(&e, remote, &uri, context)
        }
    }
}

/// Unrouted requests. Anything but POST under `/api/` is a method error.
async fn api_fallback(
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    method: Method,
    uri: Uri,
) -> Response {
    let under_api = uri.path() == "/api" || uri.path().starts_with("/api/");
    let err: GalleriaError = if under_api && method != Method::POST {
        MethodError::new(method.as_str(), "/api/").into()
    } else {
        NotFoundError::new(uri.path().to_string()).into()
    };
    failure(&err, remote, &uri, "Unsupported API request")
}

/// Current gallery snapshot, served without touching storage.
async fn gallery(State(state): State<ApiState>) -> Response {
    let view = state.pipeline.gallery().current();
    Json(&*view).into_response()
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn finds_named_cookie() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark; session=abc"));
        headers.append(header::COOKIE, HeaderValue::from_static("other=1"));

        assert_eq!(session_cookie(&headers, "session").as_deref(), Some("abc"));
        assert_eq!(session_cookie(&headers, "other").as_deref(), Some("1"));
        assert_eq!(session_cookie(&headers, "missing"), None);
    }

    #[test]
    fn strips_quoted_cookie_values() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("session=\"abc\""));

        assert_eq!(session_cookie(&headers, "session").as_deref(), Some("abc"));
    }
}
