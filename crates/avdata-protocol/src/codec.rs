//! Line codec for the management channel.
//!
//! Each message is a single JSON object on its own line. This module provides
//! encoding and decoding utilities for both directions.

use crate::messages::{ManagementRequest, ManagementResponse};
use thiserror::Error;

/// Errors that can occur during message encoding/decoding.
#[derive(Debug, Error)]
pub enum CodecError {
    /// JSON (de)serialization failed.
    #[error("Failed to process message: {0}")]
    Json(#[from] serde_json::Error),

    /// The line was empty or only whitespace.
    #[error("Empty message")]
    EmptyMessage,
}

/// Decode a management request from one line of text.
pub fn decode_request(line: &str) -> Result<ManagementRequest, CodecError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(CodecError::EmptyMessage);
    }
    serde_json::from_str(line).map_err(CodecError::from)
}

/// Encode a response for transmission.
///
/// The returned string carries no trailing newline.
pub fn encode_response(msg: &ManagementResponse) -> Result<String, CodecError> {
    serde_json::to_string(msg).map_err(CodecError::from)
}

/// Encode a request (management side).
pub fn encode_request(msg: &ManagementRequest) -> Result<String, CodecError> {
    serde_json::to_string(msg).map_err(CodecError::from)
}

/// Decode a response (management side).
pub fn decode_response(line: &str) -> Result<ManagementResponse, CodecError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(CodecError::EmptyMessage);
    }
    serde_json::from_str(line).map_err(CodecError::from)
}

/// Best-effort extraction of a request id from a line that failed to decode.
///
/// Lets the server answer malformed requests with the caller's id when the
/// JSON itself is well formed.
pub fn peek_request_id(line: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(line.trim()).ok()?;
    value.get("requestId")?.as_str().map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{Operation, RequestState};
    use avdata_core::ResourceValue;

    #[test]
    fn test_decode_read() {
        let json = r#"{"requestId":"1","read":{"path":"/nsAssetDataTest/test/resourceA"}}"#;
        let msg = decode_request(json).unwrap();

        assert_eq!(msg.request_id, "1");
        match msg.operation {
            Operation::Read(target) => assert_eq!(target.path, "/nsAssetDataTest/test/resourceA"),
            _ => panic!("Expected Read"),
        }
    }

    #[test]
    fn test_decode_write_values() {
        let json = r#"{"requestId":"2","write":{"path":"/app/limit","value":42}}"#;
        match decode_request(json).unwrap().operation {
            Operation::Write(target) => assert_eq!(target.value, ResourceValue::Int(42)),
            _ => panic!("Expected Write"),
        }

        let json = r#"{"requestId":"3","write":{"path":"/app/ratio","value":0.25}}"#;
        match decode_request(json).unwrap().operation {
            Operation::Write(target) => assert_eq!(target.value, ResourceValue::Float(0.25)),
            _ => panic!("Expected Write"),
        }

        let json = r#"{"requestId":"4","write":{"path":"/app/name","value":"pump"}}"#;
        match decode_request(json).unwrap().operation {
            Operation::Write(target) => assert_eq!(target.value, ResourceValue::from("pump")),
            _ => panic!("Expected Write"),
        }
    }

    #[test]
    fn test_decode_list() {
        let json = r#"{"requestId":"5","list":{"path":"/app"}}"#;
        let msg = decode_request(json).unwrap();
        assert!(matches!(msg.operation, Operation::List(_)));
    }

    #[test]
    fn test_decode_pull() {
        let msg = decode_request(r#"{"requestId":"6","pull":{}}"#).unwrap();
        assert_eq!(msg, ManagementRequest::pull("6"));
    }

    #[test]
    fn test_encode_request_shape() {
        let msg = ManagementRequest::write("7", "/app/enabled", true);
        let json = encode_request(&msg).unwrap();
        assert!(json.contains("\"requestId\":\"7\""));
        assert!(json.contains("\"write\":{\"path\":\"/app/enabled\",\"value\":true}"));
    }

    #[test]
    fn test_encode_response() {
        let response = ManagementResponse::completed("8", Some(serde_json::json!(1234)));
        let json = encode_response(&response).unwrap();
        assert!(json.contains("\"state\":\"COMPLETED\""));
        assert!(json.contains("\"statusCode\":200"));
        assert!(json.contains("\"value\":1234"));
        assert!(!json.contains("message"));

        let decoded = decode_response(&json).unwrap();
        assert_eq!(decoded.state, RequestState::Completed);
    }

    #[test]
    fn test_empty_and_malformed() {
        assert!(matches!(decode_request("   "), Err(CodecError::EmptyMessage)));
        assert!(matches!(decode_request("{not json"), Err(CodecError::Json(_))));
        assert!(matches!(
            decode_request(r#"{"requestId":"1","delete":{"path":"/a"}}"#),
            Err(CodecError::Json(_))
        ));
    }

    #[test]
    fn test_peek_request_id() {
        assert_eq!(
            peek_request_id(r#"{"requestId":"42","bogus":{}}"#),
            Some("42".to_string())
        );
        assert_eq!(peek_request_id("garbage"), None);
    }
}
