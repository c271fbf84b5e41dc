//! Mapping of raw transport failures into [`ApiError`]s

use folio_api::{ApiError, ErrorKind};

use crate::transport::RawFailure;

pub const CONNECTION_ERROR_MESSAGE: &str = "connection error";
pub const BAD_DATA_MESSAGE: &str = "unexpected response format";

/// Default message for a status code when the error body carries none.
pub fn default_message(status: u16) -> &'static str {
    match status {
        400 => "bad request",
        401 => "unauthorized",
        403 => "forbidden",
        404 => "not found",
        409 => "conflict",
        422 => "unprocessable",
        500 => "internal error",
        502 => "bad gateway",
        503 => "unavailable",
        _ => "unknown error",
    }
}

/// Normalize a raw failure.
///
/// Message precedence: body `message` string, then first entry of a non-empty
/// body `errors` array, then the status table. Empty strings count as absent so
/// the resulting message is never empty.
pub fn normalize(failure: &RawFailure) -> ApiError {
    match failure {
        RawFailure::NoResponse { reason } => {
            ApiError::new(ErrorKind::NetworkError, 0, CONNECTION_ERROR_MESSAGE).with_cause(reason)
        }
        RawFailure::Status { status, body } => {
            let message =
                message_from_body(body).unwrap_or_else(|| default_message(*status).to_string());
            ApiError::new(ErrorKind::for_status(*status), *status, message)
        }
    }
}

/// Error for a 2xx response whose body does not have the expected shape.
pub fn bad_data(status: u16, detail: impl Into<String>) -> ApiError {
    ApiError::new(ErrorKind::BadData, status, BAD_DATA_MESSAGE).with_cause(detail)
}

fn message_from_body(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;

    if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
        if !message.is_empty() {
            return Some(message.to_string());
        }
    }

    let first = value.get("errors")?.as_array()?.first()?;
    let text = match first {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn status_failure(status: u16, body: serde_json::Value) -> RawFailure {
        RawFailure::Status {
            status,
            body: serde_json::to_vec(&body).unwrap(),
        }
    }

    #[test]
    fn test_no_response_is_network_error() {
        let error = normalize(&RawFailure::NoResponse {
            reason: "timeout".to_string(),
        });
        assert_eq!(error.kind(), ErrorKind::NetworkError);
        assert_eq!(error.status(), 0);
        assert_eq!(error.message(), CONNECTION_ERROR_MESSAGE);
        assert_eq!(error.cause(), Some("timeout"));
    }

    #[test]
    fn test_message_field_used_verbatim() {
        let error = normalize(&status_failure(409, json!({ "message": "Record already exists" })));
        assert_eq!(error.kind(), ErrorKind::ClientError);
        assert_eq!(error.message(), "Record already exists");
    }

    #[test]
    fn test_first_error_used_when_no_message() {
        let error = normalize(&status_failure(
            422,
            json!({ "errors": ["title is required", "date is invalid"] }),
        ));
        assert_eq!(error.message(), "title is required");
    }

    #[test]
    fn test_message_wins_over_errors() {
        let error = normalize(&status_failure(
            400,
            json!({ "message": "nope", "errors": ["ignored"] }),
        ));
        assert_eq!(error.message(), "nope");
    }

    #[test]
    fn test_empty_errors_falls_back_to_table() {
        let error = normalize(&status_failure(503, json!({ "errors": [] })));
        assert_eq!(error.kind(), ErrorKind::ServerError);
        assert_eq!(error.message(), "unavailable");
    }

    #[test]
    fn test_non_json_body_falls_back_to_table() {
        let error = normalize(&RawFailure::Status {
            status: 502,
            body: b"<html>Bad Gateway</html>".to_vec(),
        });
        assert_eq!(error.message(), "bad gateway");
    }

    #[test]
    fn test_unknown_status() {
        let error = normalize(&status_failure(418, json!({})));
        assert_eq!(error.kind(), ErrorKind::ClientError);
        assert_eq!(error.message(), "unknown error");

        let error = normalize(&status_failure(507, json!({})));
        assert_eq!(error.kind(), ErrorKind::ServerError);
        assert_eq!(error.message(), "unknown error");
    }

    #[test]
    fn test_bad_data() {
        let error = bad_data(200, "missing field `data`");
        assert_eq!(error.kind(), ErrorKind::BadData);
        assert_eq!(error.status(), 200);
        assert!(!error.is_retryable());
    }

    proptest! {
        #[test]
        fn prop_message_never_empty(status in 400u16..600, body in proptest::collection::vec(any::<u8>(), 0..64)) {
            let error = normalize(&RawFailure::Status { status, body });
            prop_assert!(!error.message().is_empty());
            prop_assert_eq!(error.status(), status);
        }

        #[test]
        fn prop_kind_follows_status_range(status in 400u16..600) {
            let error = normalize(&RawFailure::Status { status, body: Vec::new() });
            let expected = if status >= 500 { ErrorKind::ServerError } else { ErrorKind::ClientError };
            prop_assert_eq!(error.kind(), expected);
        }
    }
}
