//! Error codes and JSON error responses for request-level failures

use http_body_util::{combinators::BoxBody, BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

/// Header carrying the machine-readable error code
pub const ERROR_HEADER: &str = "X-Parkgate-Error";

/// Error codes for failures that are not ordinary resolution outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Missing or unusable Host header
    MissingHostHeader,
    /// Method other than GET/HEAD on a static file or listing
    MethodNotAllowed,
    /// The script handler failed
    ScriptFailed,
    /// Internal error (e.g. the resolution task panicked)
    InternalError,
}

impl ErrorCode {
    /// Get the default HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::MissingHostHeader => StatusCode::BAD_REQUEST,
            ErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ErrorCode::ScriptFailed => StatusCode::BAD_GATEWAY,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code as a string for the error header
    pub fn as_header_value(&self) -> &'static str {
        match self {
            ErrorCode::MissingHostHeader => "MISSING_HOST_HEADER",
            ErrorCode::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            ErrorCode::ScriptFailed => "SCRIPT_FAILED",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

/// JSON error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
    /// HTTP status code (for reference)
    pub status: u16,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status: code.status_code().as_u16(),
            code,
            message: message.into(),
        }
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                r#"{{"code":"{}","message":"{}","status":{}}}"#,
                self.code.as_header_value(),
                self.message.replace('\"', "\\\""),
                self.status
            )
        })
    }
}

/// Create a JSON error response with the error code header
pub fn json_error_response(
    code: ErrorCode,
    message: impl Into<String>,
) -> Response<BoxBody<Bytes, hyper::Error>> {
    let error = ErrorResponse::new(code, message);
    let status = code.status_code();
    let body = error.to_json();

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header(ERROR_HEADER, code.as_header_value())
        .body(Full::new(Bytes::from(body)).map_err(|e| match e {}).boxed())
        .expect("valid response with StatusCode enum and static headers")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_status_codes() {
        assert_eq!(ErrorCode::MissingHostHeader.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::MethodNotAllowed.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(ErrorCode::ScriptFailed.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(ErrorCode::InternalError.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_response_json() {
        let error = ErrorResponse::new(ErrorCode::MissingHostHeader, "Missing Host header");
        let json = error.to_json();
        assert!(json.contains("\"code\":\"MISSING_HOST_HEADER\""));
        assert!(json.contains("\"message\":\"Missing Host header\""));
        assert!(json.contains("\"status\":400"));
    }

    #[test]
    fn test_json_error_response_headers() {
        let response = json_error_response(ErrorCode::InternalError, "boom");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(ERROR_HEADER).unwrap(),
            "INTERNAL_ERROR"
        );
        assert_eq!(
            response.headers().get("Content-Type").unwrap(),
            "application/json"
        );
    }
}
