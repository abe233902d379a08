//! Access to the imagery generation backend.
//!
//! The session store talks to the backend only through the [`ImageryFetcher`]
//! trait. [`HttpImageryClient`] is the production implementation; tests plug
//! in fakes.
//!
//! Response classification is kept in [`decode_response`] so it can be
//! exercised without a network.

mod error;
mod http;

pub use error::QueryError;
pub use http::HttpImageryClient;

use async_trait::async_trait;

use crate::model::{ErrorPayload, ImageryResult};

/// Source of imagery results for a location.
///
/// Futures are not required to be `Send`: all queries run on the single
/// event-handling thread of the host.
#[async_trait(?Send)]
pub trait ImageryFetcher {
    /// Request imagery for the given location text.
    async fn fetch_imagery(&self, location: &str) -> Result<ImageryResult, QueryError>;
}

/// Classify a backend response into a result or a typed failure.
pub fn decode_response(status: u16, body: &str) -> Result<ImageryResult, QueryError> {
    if !(200..300).contains(&status) {
        let (message, detail) = match serde_json::from_str::<ErrorPayload>(body) {
            Ok(payload) => (payload.error, payload.detail),
            Err(_) => (String::new(), (!body.is_empty()).then(|| body.to_string())),
        };
        return Err(QueryError::BackendFailure {
            status: Some(status),
            message,
            detail,
        });
    }

    serde_json::from_str(body).map_err(|e| QueryError::malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const OK_BODY: &str = r#"{"location":"Lahore, Pakistan","date":"2024-05-01","png":{"rgb":"/img/a.png","ndvi":"/img/b.png","ndbi":"/img/c.png"},"tif_url":"/tif/a.tif"}"#;

    #[test]
    fn test_success_body_decodes() {
        let result = decode_response(200, OK_BODY).unwrap();
        assert_eq!(result.location, "Lahore, Pakistan");
        assert_eq!(result.download_url, "/tif/a.tif");
    }

    #[test]
    fn test_error_status_with_payload() {
        let err = decode_response(500, r#"{"error":"GEE timeout"}"#).unwrap_err();
        assert_eq!(
            err,
            QueryError::BackendFailure {
                status: Some(500),
                message: "GEE timeout".to_string(),
                detail: None,
            }
        );
        assert_eq!(err.user_message(), "GEE timeout");
    }

    #[test]
    fn test_error_status_with_detail() {
        let body = r#"{"error":"Flask service failed","detail":"Traceback ..."}"#;
        match decode_response(502, body).unwrap_err() {
            QueryError::BackendFailure { status, detail, .. } => {
                assert_eq!(status, Some(502));
                assert_eq!(detail.as_deref(), Some("Traceback ..."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_status_with_unparsable_body() {
        let err = decode_response(503, "<html>Service Unavailable</html>").unwrap_err();
        assert!(matches!(err, QueryError::BackendFailure { status: Some(503), .. }));
        assert_eq!(err.user_message(), "Request failed");
    }

    #[test]
    fn test_success_status_with_bad_body_is_malformed() {
        let err = decode_response(200, "not json").unwrap_err();
        assert!(matches!(err, QueryError::MalformedResponse(_)));

        let err = decode_response(200, r#"{"location":"x","date":"y"}"#).unwrap_err();
        assert!(matches!(err, QueryError::MalformedResponse(_)));
    }
}
