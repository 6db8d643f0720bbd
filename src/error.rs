//! Error types for the remote read endpoint.

use thiserror::Error;

/// Errors produced while serving a remote read request.
///
/// Variants split into two families. Malformed or unsupported requests are
/// client errors and map to HTTP 400; everything that fails after the request
/// was accepted (store, row conversion, response encoding) maps to HTTP 500.
/// See [`Error::is_client_error`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The request body is not valid snappy.
    #[error("failed to decompress request body: {0}")]
    Decompression(String),

    /// The decompressed body is not a valid `ReadRequest` message.
    #[error("failed to decode read request: {0}")]
    Deserialization(String),

    /// The request is well formed but asks for something this endpoint does not serve.
    #[error("unsupported read request: {0}")]
    UnsupportedRequest(String),

    /// The backing store failed to execute the query.
    #[error("storage error: {0}")]
    Storage(String),

    /// The store produced a record that does not satisfy the row contract.
    #[error("invalid row: {0}")]
    InvalidRow(String),

    /// A row carried a timestamp that is not RFC 3339.
    #[error("invalid timestamp {timestamp:?}: {reason}")]
    InvalidTimestamp { timestamp: String, reason: String },

    /// The response could not be serialized or compressed.
    #[error("failed to encode read response: {0}")]
    Encoding(String),

    /// Invalid configuration or startup input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Unexpected failure outside the request path (e.g., the listener).
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns true when the failure is attributable to the caller's request.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Decompression(_) | Error::Deserialization(_) | Error::UnsupportedRequest(_)
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

/// Result type alias for remote read operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_classify_format_errors_as_client_errors() {
        assert!(Error::Decompression("bad".into()).is_client_error());
        assert!(Error::Deserialization("bad".into()).is_client_error());
        assert!(Error::UnsupportedRequest("bad".into()).is_client_error());
    }

    #[test]
    fn should_classify_upstream_and_encoding_errors_as_server_errors() {
        assert!(!Error::Storage("down".into()).is_client_error());
        assert!(!Error::InvalidRow("value".into()).is_client_error());
        assert!(!Error::Encoding("oops".into()).is_client_error());
        assert!(
            !Error::InvalidTimestamp {
                timestamp: "x".into(),
                reason: "y".into()
            }
            .is_client_error()
        );
    }

    #[test]
    fn should_format_timestamp_error_with_offending_value() {
        // given
        let err = Error::InvalidTimestamp {
            timestamp: "yesterday".to_string(),
            reason: "input contains invalid characters".to_string(),
        };

        // when
        let message = err.to_string();

        // then
        assert_eq!(
            message,
            "invalid timestamp \"yesterday\": input contains invalid characters"
        );
    }
}
