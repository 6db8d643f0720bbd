//! HTTP response types for the remote read server.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::codec::{CONTENT_ENCODING_SNAPPY, CONTENT_TYPE_PROTOBUF};

/// A snappy-compressed protobuf body.
#[derive(Debug, Clone)]
pub struct SnappyProtobuf(pub Bytes);

impl From<Vec<u8>> for SnappyProtobuf {
    fn from(body: Vec<u8>) -> Self {
        SnappyProtobuf(Bytes::from(body))
    }
}

impl IntoResponse for SnappyProtobuf {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, CONTENT_TYPE_PROTOBUF),
                (header::CONTENT_ENCODING, CONTENT_ENCODING_SNAPPY),
            ],
            self.0,
        )
            .into_response()
    }
}
