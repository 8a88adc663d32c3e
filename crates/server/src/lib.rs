//! # Personnel Records Server
//!
//! The network side of the system: accepts TCP connections, reads
//! length-prefixed JSON requests, dispatches them to an [`EmployeeStore`] and
//! writes back one response per request.
//!
//! - `listener`: binds the socket and spawns one task per connection.
//! - `connection`: frame-level reads and writes on one socket.
//! - `dispatcher`: maps an operation tag to a store call; never fails.
//! - `client`: the async counterpart used by the CLI and the tests.
//!
//! [`EmployeeStore`]: database::EmployeeStore

pub mod client;
pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod listener;

pub use client::Client;
pub use dispatcher::dispatch;
pub use error::ServerError;
pub use listener::{bind, run};
