//! Uniform JSON envelope returned by every endpoint, success or failure.
//!
//! Success bodies carry `message` (and optionally `data`), failure bodies
//! carry `reason`. Field names are camelCase on the wire because the
//! browser client reads `timeStamp` / `statusCode` directly.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

/// Response envelope shared by every endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    /// ISO-8601 timestamp of when the response was produced
    pub time_stamp: String,
    /// Numeric HTTP status carried in the body
    pub status_code: u16,
    /// Upper-snake status name, e.g. `OK` or `BAD_REQUEST`
    pub status: String,
    /// Success text, absent on failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Failure text, absent on successes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Optional result object keyed by result name (`user`, `access_token`, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl HttpResponse {
    /// Success envelope with the given status and message.
    pub fn success(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            time_stamp: timestamp(),
            status_code: status.as_u16(),
            status: status_name(status),
            message: Some(message.into()),
            reason: None,
            data: None,
        }
    }

    /// `200 OK` success envelope.
    pub fn ok(message: impl Into<String>) -> Self {
        Self::success(StatusCode::OK, message)
    }

    /// `201 Created` success envelope.
    pub fn created(message: impl Into<String>) -> Self {
        Self::success(StatusCode::CREATED, message)
    }

    /// Failure envelope with the given status and reason.
    pub fn failure(status: StatusCode, reason: impl Into<String>) -> Self {
        Self {
            time_stamp: timestamp(),
            status_code: status.as_u16(),
            status: status_name(status),
            message: None,
            reason: Some(reason.into()),
            data: None,
        }
    }

    /// Attach a `data` object to the envelope.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Upper-snake rendering of the status line, e.g. `INTERNAL_SERVER_ERROR`.
fn status_name(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("UNKNOWN")
        .to_uppercase()
        .replace(' ', "_")
}
