//! Conversion of pipeline errors into HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::Error;

/// Error response wrapper for converting [`Error`] to HTTP responses.
///
/// Remote read clients expect plain text error bodies: 400 for requests that
/// could not be decoded or are unsupported, 500 for everything else.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.0.to_string()).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_map_client_errors_to_bad_request() {
        // given
        let err = ApiError::from(Error::UnsupportedRequest("two queries".into()));

        // when
        let response = err.into_response();

        // then
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn should_map_store_errors_to_internal_server_error() {
        // given
        let err = ApiError::from(Error::Storage("timeout".into()));

        // when
        let response = err.into_response();

        // then
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn should_write_error_text_as_body() {
        // given
        let err = ApiError::from(Error::Decompression("corrupt input".into()));

        // when
        let response = err.into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        // then
        assert_eq!(body, "failed to decompress request body: corrupt input");
    }
}
