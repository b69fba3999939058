//! Plain-text responses carrying a diagnostic header.

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use galleria_error::{AuthErrorKind, GalleriaError, GalleriaErrorKind};

/// Header carrying the human-readable outcome of every API response.
pub const SERVER_MESSAGE_HEADER: HeaderName = HeaderName::from_static("x-server-message");
/// Header carrying the content identifier of an ingested image.
pub const IMAGE_HASH_HEADER: HeaderName = HeaderName::from_static("x-image-hash");

/// Header values must be visible ASCII.
fn header_value(message: &str) -> HeaderValue {
    let sanitized: String = message
        .chars()
        .map(|c| if c == ' ' || c.is_ascii_graphic() { c } else { '?' })
        .collect();
    HeaderValue::from_str(&sanitized).unwrap_or_else(|_| HeaderValue::from_static("?"))
}

/// Response with `status`, an `X-Server-Message` header and a
/// `"<code> <message>"` body.
#[derive(Debug, Clone)]
pub struct ServerMessage {
    status: StatusCode,
    header: String,
    body: String,
    image_hash: Option<String>,
}

impl ServerMessage {
    /// Message used verbatim in the header.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status,
            body: format!("{} {}\n", status.as_u16(), message),
            header: message,
            image_hash: None,
        }
    }

    /// Message whose header is prefixed with the status code, as used for
    /// 403 and 500 responses.
    pub fn coded(status: StatusCode, message: impl std::fmt::Display) -> Self {
        let coded = format!("{} {}", status.as_u16(), message);
        Self {
            status,
            body: format!("{coded}\n"),
            header: coded,
            image_hash: None,
        }
    }

    /// Attach the identifier of an ingested image.
    pub fn with_image_hash(mut self, hash: impl Into<String>) -> Self {
        self.image_hash = Some(hash.into());
        self
    }

    /// Status code of the response.
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ServerMessage {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.body).into_response();
        let headers = response.headers_mut();
        headers.insert(SERVER_MESSAGE_HEADER, header_value(&self.header));
        if let Some(hash) = self.image_hash {
            headers.insert(IMAGE_HASH_HEADER, header_value(&hash));
        }
        response
    }
}

/// Short, location-free description of an error for clients.
pub fn diagnostic(err: &GalleriaError) -> String {
    match err.kind() {
        GalleriaErrorKind::Staging(e) => e.kind.to_string(),
        GalleriaErrorKind::Conversion(e) => e.source.kind.to_string(),
        GalleriaErrorKind::Storage(e) => e.kind.to_string(),
        GalleriaErrorKind::Auth(e) => e.kind.to_string(),
        GalleriaErrorKind::Method(e) => format!("Cannot {} on {}", e.method, e.path),
        GalleriaErrorKind::NotFound(e) => e.message.clone(),
        GalleriaErrorKind::Config(e) => e.message.clone(),
    }
}

/// Map an error to its HTTP response.
///
/// Missing paths reported from below become 404, auth refusals 401/403,
/// method mismatches 405, and everything else 500.
pub fn from_error(err: &GalleriaError) -> ServerMessage {
    match err.kind() {
        GalleriaErrorKind::Auth(e) => match e.kind() {
            AuthErrorKind::Unauthenticated => {
                ServerMessage::new(StatusCode::UNAUTHORIZED, e.kind().to_string())
            }
            AuthErrorKind::UploadsDisabled | AuthErrorKind::Forbidden => {
                ServerMessage::coded(StatusCode::FORBIDDEN, "Forbidden")
            }
        },
        GalleriaErrorKind::Method(_) => {
            ServerMessage::new(StatusCode::METHOD_NOT_ALLOWED, diagnostic(err))
        }
        GalleriaErrorKind::NotFound(_) => ServerMessage::new(StatusCode::NOT_FOUND, "Not Found"),
        GalleriaErrorKind::Conversion(e) if e.is_not_found() => {
            ServerMessage::new(StatusCode::NOT_FOUND, "Not Found")
        }
        GalleriaErrorKind::Storage(e) if e.is_not_found() => {
            ServerMessage::new(StatusCode::NOT_FOUND, "Not Found")
        }
        _ => ServerMessage::coded(StatusCode::INTERNAL_SERVER_ERROR, diagnostic(err)),
    }
}
