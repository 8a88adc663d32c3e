use std::io;

use protocol::{CodecError, FrameError, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    /// The frame body is not a JSON request envelope.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("invalid operation")]
    InvalidOperation(String),

    /// The envelope was fine but `data` does not fit the operation.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("{0}")]
    Database(#[from] database::DbError),

    #[error("internal error while handling the operation")]
    Panicked,

    #[error("failed to encode message: {0}")]
    Encode(String),

    #[error("connection error: {0}")]
    Connection(#[from] io::Error),

    /// The peer went away in the middle of a frame.
    #[error("connection reset by peer")]
    ConnectionReset,

    #[error("{0}")]
    Frame(#[from] FrameError),

    #[error("failed to listen on {addr}: {source}")]
    Listener { addr: String, source: io::Error },
}

impl From<CodecError> for ServerError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::MalformedPayload(message) => ServerError::MalformedPayload(message),
            CodecError::Serialization(message) => ServerError::Encode(message),
            CodecError::Frame(frame) => ServerError::Frame(frame),
        }
    }
}

/// The error response a client sees. The message is the error's display text,
/// so database faults surface the driver's own description.
impl From<&ServerError> for Response {
    fn from(err: &ServerError) -> Self {
        Response::error(err.to_string())
    }
}
