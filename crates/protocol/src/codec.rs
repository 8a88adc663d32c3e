//! JSON encoding of frame bodies.
//!
//! Framing is handled separately in [`crate::frame`]; the functions here only
//! turn one body into a message and back.

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{CodecError, MAX_FRAME_LEN, Request, Response};

/// Sent when even the replacement error response cannot be serialized.
const LAST_RESORT_RESPONSE: &[u8] = br#"{"status":"error","message":"internal error"}"#;

/// Serializes a message into a frame body.
pub fn encode<T: Serialize>(message: &T) -> Result<Bytes, CodecError> {
    serde_json::to_vec(message)
        .map(Bytes::from)
        .map_err(|e| CodecError::Serialization(e.to_string()))
}

/// Deserializes a frame body into a message.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, CodecError> {
    serde_json::from_slice(body).map_err(|e| CodecError::MalformedPayload(e.to_string()))
}

/// Decodes a request body. Fails with `MalformedPayload` when the bytes are
/// not a JSON object shaped like a request envelope.
pub fn decode_request(body: &[u8]) -> Result<Request, CodecError> {
    decode(body)
}

/// Serializes a response into a frame body that is guaranteed to fit a frame.
///
/// A response that cannot be serialized, or whose body exceeds
/// [`MAX_FRAME_LEN`], is logged and replaced with an error response, so the
/// client always gets an answer.
pub fn encode_response(response: &Response) -> Bytes {
    match encode(response) {
        Ok(body) if body.len() <= MAX_FRAME_LEN => body,
        Ok(body) => {
            tracing::warn!(
                bytes = body.len(),
                limit = MAX_FRAME_LEN,
                "Response exceeds the frame limit, replaced with an error."
            );
            error_body(format!(
                "response too large: {} bytes exceeds the {} byte limit, narrow the lookup",
                body.len(),
                MAX_FRAME_LEN
            ))
        }
        Err(e) => {
            tracing::error!(error = %e, "Response could not be encoded, replaced with an error.");
            error_body("internal error: response could not be encoded".to_string())
        }
    }
}

fn error_body(message: String) -> Bytes {
    encode(&Response::error(message)).unwrap_or_else(|_| Bytes::from_static(LAST_RESORT_RESPONSE))
}
