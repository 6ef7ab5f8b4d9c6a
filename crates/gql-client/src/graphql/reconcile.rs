//! Turning a raw GraphQL response into data or a classified error.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::response::{GraphQLErrorList, ResponseEnvelope};
use crate::error::{CompositeError, Error, NetworkError, Result};
use crate::logging::targets;

/// Reconcile a response body and status code into decoded data or an error.
///
/// Transport failures (status outside 2xx) and protocol failures (a non-empty
/// `errors` member) are collected into one [`CompositeError`]. The rules:
///
/// - A body that is not a JSON object fails with [`Error::EnvelopeDecode`],
///   whatever the status.
/// - When `errors` is present, `data` is never decoded, so partial data is
///   dropped in favour of the error list.
/// - Decode failures of `errors` or `data` are fatal under 2xx. Under any
///   other status they are suppressed and the network error stands in for them.
///
/// `data` missing from the body decodes as JSON `null`.
pub fn reconcile<T: DeserializeOwned>(body: &[u8], status: u16) -> Result<T> {
    let is_failure_status = !(200..=299).contains(&status);

    let mut composite = CompositeError::default();
    if is_failure_status {
        composite.network_error = Some(NetworkError::from_response(status, body));
    }

    let envelope: ResponseEnvelope =
        serde_json::from_slice(body).map_err(|source| Error::EnvelopeDecode {
            body: String::from_utf8_lossy(body).into_owned(),
            source,
        })?;

    let mut decoded = None;
    if envelope.has_errors() {
        let errors = envelope.errors.unwrap_or(Value::Null);
        match serde_json::from_value::<GraphQLErrorList>(errors) {
            Ok(list) => composite.graphql_errors = Some(list),
            Err(source) if !is_failure_status => {
                return Err(Error::ProtocolErrorDecode {
                    body: String::from_utf8_lossy(body).into_owned(),
                    source,
                });
            }
            Err(_) => {}
        }
    } else {
        match serde_json::from_value::<T>(envelope.data.unwrap_or(Value::Null)) {
            Ok(data) => decoded = Some(data),
            Err(source) if !is_failure_status => {
                return Err(Error::DataDecode {
                    body: String::from_utf8_lossy(body).into_owned(),
                    source,
                });
            }
            Err(_) => {}
        }
    }

    match decoded {
        Some(data) if !composite.has_errors() => Ok(data),
        _ => {
            tracing::warn!(
                target: targets::GRAPHQL,
                status,
                network = composite.network_error.is_some(),
                errors = ?composite.graphql_errors.as_ref().and_then(GraphQLErrorList::error_message),
                "graphql call failed"
            );
            Err(Error::Composite(composite))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Counter {
        x: i64,
    }

    fn composite(err: Error) -> CompositeError {
        match err {
            Error::Composite(composite) => composite,
            other => panic!("expected composite error, got {other:?}"),
        }
    }

    #[test]
    fn test_success() {
        let data: Counter = reconcile(br#"{"data":{"x":1}}"#, 200).unwrap();
        assert_eq!(data, Counter { x: 1 });

        let data: Counter = reconcile(br#"{"data":{"x":2}}"#, 204).unwrap();
        assert_eq!(data.x, 2);
    }

    #[test]
    fn test_server_error_with_protocol_errors() {
        let body = br#"{"errors":[{"message":"boom"}]}"#;
        let err = composite(reconcile::<Counter>(body, 500).unwrap_err());

        assert!(err.has_errors());
        let network = err.network_error.as_ref().unwrap();
        assert_eq!(network.code, 500);
        assert_eq!(
            network.message,
            format!("Response body {}", String::from_utf8_lossy(body))
        );
        assert_eq!(err.errors().len(), 1);
        assert_eq!(err.errors()[0].message, "boom");
    }

    #[test]
    fn test_errors_take_precedence_over_data() {
        let body = br#"{"data":{"x":1},"errors":[{"message":"partial","path":["x"]}]}"#;
        let err = composite(reconcile::<Counter>(body, 200).unwrap_err());

        assert!(err.network_error.is_none());
        assert_eq!(err.errors()[0].message, "partial");
    }

    #[test]
    fn test_error_order_is_preserved() {
        let body = br#"{"errors":[{"message":"a"},{"message":"b"},{"message":"c"}]}"#;
        let err = composite(reconcile::<Value>(body, 200).unwrap_err());
        let messages: Vec<_> = err.errors().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, ["a", "b", "c"]);
    }

    #[test]
    fn test_non_json_body_is_envelope_error() {
        for status in [200, 502] {
            let err = reconcile::<Counter>(b"<html>oops</html>", status).unwrap_err();
            match err {
                Error::EnvelopeDecode { body, .. } => assert_eq!(body, "<html>oops</html>"),
                other => panic!("expected envelope error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_non_object_body_is_envelope_error() {
        assert!(matches!(
            reconcile::<Value>(b"[1,2]", 200),
            Err(Error::EnvelopeDecode { .. })
        ));
        assert!(matches!(
            reconcile::<Value>(b"null", 200),
            Err(Error::EnvelopeDecode { .. })
        ));
    }

    #[test]
    fn test_empty_or_null_errors_are_absent() {
        let data: Counter = reconcile(br#"{"data":{"x":3},"errors":[]}"#, 200).unwrap();
        assert_eq!(data.x, 3);

        let data: Counter = reconcile(br#"{"data":{"x":4},"errors":null}"#, 200).unwrap();
        assert_eq!(data.x, 4);
    }

    #[test]
    fn test_missing_data_decodes_as_null() {
        let data: Option<Counter> = reconcile(b"{}", 200).unwrap();
        assert_eq!(data, None);

        let err = reconcile::<Counter>(b"{}", 200).unwrap_err();
        assert!(matches!(err, Error::DataDecode { .. }));
    }

    #[test]
    fn test_data_mismatch_under_success_is_fatal() {
        let err = reconcile::<Counter>(br#"{"data":{"x":"one"}}"#, 200).unwrap_err();
        match err {
            Error::DataDecode { body, .. } => assert_eq!(body, r#"{"data":{"x":"one"}}"#),
            other => panic!("expected data decode error, got {other:?}"),
        }
    }

    #[test]
    fn test_data_mismatch_under_failure_is_suppressed() {
        let err = composite(reconcile::<Counter>(br#"{"data":{"x":"one"}}"#, 503).unwrap_err());
        assert_eq!(err.network_error.unwrap().code, 503);
        assert!(err.graphql_errors.is_none());
    }

    #[test]
    fn test_malformed_errors_under_success_is_fatal() {
        let err = reconcile::<Counter>(br#"{"errors":"nope"}"#, 200).unwrap_err();
        assert!(matches!(err, Error::ProtocolErrorDecode { .. }));

        let err = reconcile::<Counter>(br#"{"errors":[{"code":1}]}"#, 200).unwrap_err();
        assert!(matches!(err, Error::ProtocolErrorDecode { .. }));
    }

    #[test]
    fn test_malformed_errors_under_failure_is_suppressed() {
        let err = composite(reconcile::<Counter>(br#"{"errors":"nope"}"#, 400).unwrap_err());
        assert_eq!(err.network_error.unwrap().code, 400);
        assert!(err.graphql_errors.is_none());
    }

    #[test]
    fn test_failure_status_with_valid_data_still_fails() {
        let err = composite(reconcile::<Counter>(br#"{"data":{"x":1}}"#, 401).unwrap_err());
        assert_eq!(err.network_error.unwrap().code, 401);
    }

    #[test]
    fn test_status_boundaries() {
        for status in [199, 300] {
            let err = composite(reconcile::<Counter>(br#"{"data":{"x":1}}"#, status).unwrap_err());
            assert_eq!(err.network_error.unwrap().code, status);
        }
        assert!(reconcile::<Counter>(br#"{"data":{"x":1}}"#, 299).is_ok());
    }

    #[test]
    fn test_composite_display_is_json() {
        let err = reconcile::<Counter>(br#"{"errors":[{"message":"boom"}]}"#, 500).unwrap_err();
        let rendered: Value = serde_json::from_str(&err.to_string()).unwrap();
        assert_eq!(rendered["networkErrors"]["code"], json!(500));
        assert_eq!(rendered["graphqlErrors"][0]["message"], json!("boom"));
    }
}
