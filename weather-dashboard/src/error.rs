//! Client-facing errors.
//!
//! Handlers convert every failure into an [`ApiError`] before it leaves the
//! handler, so clients only ever see a status code and a short message.

use serde::Serialize;
use warp::http::StatusCode;
use warp::reply::{Reply, Response};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    MethodNotAllowed,
    Conflict,
    Internal,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error payload, `{"error": "..."}`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

#[derive(Debug)]
enum Body {
    Json(ErrorBody),
    Text(String),
    Empty,
}

#[derive(Debug)]
pub struct ApiError {
    kind: ErrorKind,
    body: Body,
}

impl ApiError {
    /// Error answered with `{"error": message}`.
    pub fn json(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, body: Body::Json(ErrorBody::new(message)) }
    }

    /// Error answered with a plain-text message.
    pub fn text(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, body: Body::Text(message.into()) }
    }

    /// Error answered with the status code alone.
    pub fn empty(kind: ErrorKind) -> Self {
        Self { kind, body: Body::Empty }
    }
}

impl Reply for ApiError {
    fn into_response(self) -> Response {
        let status = self.kind.status();
        match self.body {
            Body::Json(body) => warp::reply::with_status(warp::reply::json(&body), status).into_response(),
            Body::Text(text) => warp::reply::with_status(text, status).into_response(),
            Body::Empty => warp::reply::with_status(warp::reply(), status).into_response(),
        }
    }
}

/// Collapse a handler result into a response.
pub fn respond(result: Result<Response, ApiError>) -> Response {
    result.unwrap_or_else(Reply::into_response)
}
