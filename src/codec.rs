//! Wire codec for remote read bodies: snappy block compression around protobuf.

use prost::Message;

use crate::error::{Error, Result};
use crate::proto::{Query, QueryResult, ReadRequest, ReadResponse, TimeSeries};

/// Content type of remote read request and response bodies.
pub const CONTENT_TYPE_PROTOBUF: &str = "application/x-protobuf";

/// Content encoding of remote read request and response bodies.
pub const CONTENT_ENCODING_SNAPPY: &str = "snappy";

/// Decompress and decode a remote read request body.
pub fn decode_read_request(body: &[u8]) -> Result<ReadRequest> {
    let raw = snap::raw::Decoder::new()
        .decompress_vec(body)
        .map_err(|e| Error::Decompression(e.to_string()))?;

    ReadRequest::decode(raw.as_slice()).map_err(|e| Error::Deserialization(e.to_string()))
}

/// Extract the single query of a request.
///
/// Batched requests are valid protocol but are not served: anything other
/// than exactly one query is rejected.
pub fn single_query(request: ReadRequest) -> Result<Query> {
    let count = request.queries.len();
    let mut queries = request.queries.into_iter();
    match (queries.next(), count) {
        (Some(query), 1) => Ok(query),
        _ => Err(Error::UnsupportedRequest(format!(
            "can only handle one query per request, got {}",
            count
        ))),
    }
}

/// Wrap series into a single-result response, then encode and compress it.
pub fn encode_read_response(timeseries: Vec<TimeSeries>) -> Result<Vec<u8>> {
    let response = ReadResponse {
        results: vec![QueryResult { timeseries }],
    };

    snap::raw::Encoder::new()
        .compress_vec(&response.encode_to_vec())
        .map_err(|e| Error::Encoding(e.to_string()))
}

/// Encode and compress a request. Used by clients and tests.
pub fn encode_read_request(request: &ReadRequest) -> Result<Vec<u8>> {
    snap::raw::Encoder::new()
        .compress_vec(&request.encode_to_vec())
        .map_err(|e| Error::Encoding(e.to_string()))
}

/// Decompress and decode a response. Used by clients and tests.
pub fn decode_read_response(body: &[u8]) -> Result<ReadResponse> {
    let raw = snap::raw::Decoder::new()
        .decompress_vec(body)
        .map_err(|e| Error::Decompression(e.to_string()))?;

    ReadResponse::decode(raw.as_slice()).map_err(|e| Error::Deserialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::proto::{Label, LabelMatcher, MatchType, Sample};

    fn query(matcher_value: &str) -> Query {
        Query {
            start_timestamp_ms: 0,
            end_timestamp_ms: 60_000,
            matchers: vec![LabelMatcher::new(MatchType::Eq, "host", matcher_value)],
            hints: None,
        }
    }

    #[test]
    fn should_round_trip_request_through_codec() {
        // given
        let request = ReadRequest {
            queries: vec![query("a")],
            accepted_response_types: vec![0],
        };

        // when
        let body = encode_read_request(&request).unwrap();
        let decoded = decode_read_request(&body).unwrap();

        // then
        assert_eq!(decoded, request);
    }

    #[test]
    fn should_fail_decompression_for_non_snappy_body() {
        // given
        let body = b"\xff\xff\xff\xff not snappy";

        // when
        let result = decode_read_request(body);

        // then
        assert!(matches!(result, Err(Error::Decompression(_))));
    }

    #[test]
    fn should_fail_deserialization_for_snappy_wrapped_garbage() {
        // given - valid snappy around an invalid protobuf
        let body = snap::raw::Encoder::new()
            .compress_vec(&[0xFF, 0xFF, 0xFF])
            .unwrap();

        // when
        let result = decode_read_request(&body);

        // then
        assert!(matches!(result, Err(Error::Deserialization(_))));
    }

    #[test]
    fn should_accept_exactly_one_query() {
        // given
        let request = ReadRequest {
            queries: vec![query("a")],
            accepted_response_types: vec![],
        };

        // when
        let result = single_query(request);

        // then
        assert_eq!(result.unwrap(), query("a"));
    }

    #[rstest]
    #[case(0)]
    #[case(2)]
    #[case(5)]
    fn should_reject_query_count_other_than_one(#[case] count: usize) {
        // given
        let request = ReadRequest {
            queries: (0..count).map(|i| query(&i.to_string())).collect(),
            accepted_response_types: vec![],
        };

        // when
        let result = single_query(request);

        // then
        match result {
            Err(Error::UnsupportedRequest(msg)) => {
                assert!(msg.contains("one query"));
                assert!(msg.contains(&count.to_string()));
            }
            other => panic!("expected UnsupportedRequest, got {:?}", other),
        }
    }

    #[test]
    fn should_wrap_series_in_single_result() {
        // given
        let series = vec![TimeSeries {
            labels: vec![Label::new("host", "a")],
            samples: vec![Sample {
                value: 1.0,
                timestamp: 1_704_067_200_000,
            }],
        }];

        // when
        let body = encode_read_response(series.clone()).unwrap();
        let response = decode_read_response(&body).unwrap();

        // then
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].timeseries, series);
    }

    #[test]
    fn should_encode_single_empty_result_for_no_series() {
        // when
        let body = encode_read_response(Vec::new()).unwrap();
        let response = decode_read_response(&body).unwrap();

        // then
        assert_eq!(response.results.len(), 1);
        assert!(response.results[0].timeseries.is_empty());
    }
}
