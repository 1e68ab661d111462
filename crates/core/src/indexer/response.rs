//! Unwrapping of the two response shapes returned by the site.
//!
//! The "latest" feed answers with a bare JSON array of items, term searches
//! answer with an object wrapping the items in `results`. Either endpoint may
//! instead answer with an object carrying `"ok": false`, which is a server-side
//! failure and takes precedence over any shape check.
//!
//! Items are returned undecoded so that a malformed item can be dropped on its
//! own by the release builder.

use serde_json::Value;

use super::error::{excerpt, IndexerError, ParseError, RemoteError};
use crate::transport::TransportResponse;

/// Unwrap a feed payload into its item candidates.
pub fn parse_feed(payload: &str) -> Result<Vec<Value>, IndexerError> {
    match decode(payload)? {
        Value::Array(items) => Ok(items),
        other => Err(ParseError::new(
            format!("expected an array of items, got {}", shape_name(&other)),
            payload,
        )
        .into()),
    }
}

/// Unwrap a search page payload into its item candidates.
pub fn parse_page(payload: &str) -> Result<Vec<Value>, IndexerError> {
    let mut map = match decode(payload)? {
        Value::Object(map) => map,
        other => {
            return Err(ParseError::new(
                format!("expected a results object, got {}", shape_name(&other)),
                payload,
            )
            .into())
        }
    };

    match map.remove("results") {
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(ParseError::new(
            format!("'results' is {}, not an array", shape_name(&other)),
            payload,
        )
        .into()),
        None => Err(ParseError::new("invalid JSON response: missing 'results'", payload).into()),
    }
}

/// Take the body of a response, failing on a non-success HTTP status.
///
/// A failing status whose body follows the `"ok": false` convention is a
/// [`RemoteError::ServerFailure`]; any other failing status is
/// [`RemoteError::HttpStatus`].
pub fn accept(response: TransportResponse) -> Result<String, RemoteError> {
    if response.is_success() {
        return Ok(response.body);
    }
    if let Ok(value) = serde_json::from_str::<Value>(&response.body) {
        check_ok(&value, &response.body)?;
    }
    Err(RemoteError::HttpStatus {
        status: response.status,
        body: excerpt(&response.body),
    })
}

/// Fail with [`RemoteError::ServerFailure`] when the payload reports `"ok": false`.
pub fn check_ok(value: &Value, payload: &str) -> Result<(), RemoteError> {
    if let Value::Object(map) = value {
        if let Some(Value::Bool(false)) = map.get("ok") {
            return Err(RemoteError::ServerFailure {
                payload: payload.to_string(),
            });
        }
    }
    Ok(())
}

fn decode(payload: &str) -> Result<Value, IndexerError> {
    let value: Value = serde_json::from_str(payload)
        .map_err(|e| ParseError::new(format!("invalid JSON: {}", e), payload))?;
    check_ok(&value, payload)?;
    Ok(value)
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feed_array() {
        let items = parse_feed(r#"[{"title": "a"}, {"title": "b"}]"#).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["title"], "b");
    }

    #[test]
    fn test_parse_feed_empty_array() {
        assert!(parse_feed("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_feed_rejects_object() {
        let err = parse_feed(r#"{"results": []}"#).unwrap_err();
        match err {
            IndexerError::Parse(e) => {
                assert!(e.reason.contains("expected an array"));
                assert_eq!(e.payload, r#"{"results": []}"#);
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_page_results() {
        let items = parse_page(r#"{"results": [{"title": "a"}], "total": 1}"#).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_parse_page_missing_results() {
        let err = parse_page(r#"{"items": []}"#).unwrap_err();
        assert!(err.is_parse());
        assert!(err.to_string().contains("missing 'results'"));
    }

    #[test]
    fn test_parse_page_results_not_array() {
        let err = parse_page(r#"{"results": {"title": "a"}}"#).unwrap_err();
        assert!(err.is_parse());
        assert!(err.to_string().contains("an object"));
    }

    #[test]
    fn test_parse_page_rejects_array() {
        assert!(parse_page("[]").unwrap_err().is_parse());
    }

    #[test]
    fn test_ok_false_is_remote_error_in_both_modes() {
        let payload = r#"{"ok": false, "error": "maintenance"}"#;
        let page_err = parse_page(payload).unwrap_err();
        assert!(matches!(
            page_err,
            IndexerError::Remote(RemoteError::ServerFailure { .. })
        ));

        let feed_err = parse_feed(payload).unwrap_err();
        assert!(feed_err.is_remote());
    }

    #[test]
    fn test_ok_true_is_not_an_error() {
        let items = parse_page(r#"{"ok": true, "results": []}"#).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_accept_success_returns_body() {
        let body = accept(TransportResponse::ok("[]")).unwrap();
        assert_eq!(body, "[]");
    }

    #[test]
    fn test_accept_error_status() {
        let err = accept(TransportResponse {
            status: 503,
            body: "<html>Service Unavailable</html>".to_string(),
        })
        .unwrap_err();
        assert!(matches!(err, RemoteError::HttpStatus { status: 503, .. }));
    }

    #[test]
    fn test_accept_error_status_with_ok_false() {
        let err = accept(TransportResponse {
            status: 500,
            body: r#"{"ok": false}"#.to_string(),
        })
        .unwrap_err();
        assert!(matches!(err, RemoteError::ServerFailure { .. }));
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = parse_feed("<html>Cloudflare</html>").unwrap_err();
        match err {
            IndexerError::Parse(e) => assert_eq!(e.payload, "<html>Cloudflare</html>"),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
