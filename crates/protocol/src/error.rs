use thiserror::Error;

use crate::frame::FrameError;

#[derive(Error, Debug)]
pub enum CodecError {
    /// The bytes of a frame are not a valid JSON envelope.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Failed to serialize message: {0}")]
    Serialization(String),

    #[error("Framing error: {0}")]
    Frame(#[from] FrameError),
}
