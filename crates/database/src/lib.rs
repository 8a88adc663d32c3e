//! # Personnel Database Crate
//!
//! This crate is the application-specific interface to the PostgreSQL
//! database holding the employee records: `empleados`, `salarios`,
//! `departamentos`, `cargo` and the termination history in `historicos`.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** All SQL lives here. The rest of the system talks to the
//!   [`EmployeeStore`] trait and never sees a query.
//! - **One transaction per operation:** Every store call checks a connection
//!   out of the pool and commits or rolls back on its own, so concurrent
//!   clients never share a session.
//! - **Bound parameters only:** Statements that depend on the payload are
//!   assembled with `sqlx::QueryBuilder`; values are always bound.
//!
//! ## Public API
//!
//! - `connect`: Establishes the connection pool from the configured settings.
//! - `EmployeeStore`: The operations the server dispatches to.
//! - `EmployeeRepository`: The pool-backed implementation of `EmployeeStore`.
//! - `DbError`: The errors returned from this crate.

pub mod connection;
pub mod error;
mod query;
pub mod repository;
pub mod store;

pub use connection::{connect, connect_from_env};
pub use error::DbError;
pub use repository::EmployeeRepository;
pub use store::EmployeeStore;
