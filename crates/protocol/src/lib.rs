//! # Personnel Protocol
//!
//! This crate defines what travels over a client connection: the request and
//! response envelopes, their JSON encoding, and the length-prefixed framing
//! that delimits one message from the next on the byte stream.
//!
//! As a Layer 0 crate, it depends only on `core-types` and knows nothing about
//! sockets or the database.
//!
//! ## Frame layout
//!
//! `[u32 big-endian body length][body: UTF-8 JSON]`
//!
//! Dates inside the JSON body are ISO-8601 text; see `core_types::temporal`.

// Declare the modules that make up this crate.
pub mod codec;
pub mod error;
pub mod frame;
pub mod messages;

// Re-export the core types to provide a clean public API.
pub use codec::{decode, decode_request, encode, encode_response};
pub use error::CodecError;
pub use frame::{FrameError, MAX_FRAME_LEN};
pub use messages::{Operation, Request, Response, Status};
