//! # Personnel Core Types
//!
//! The shared vocabulary of the personnel records service: the employee record
//! as it is read back from storage, the payloads clients send for each
//! operation, and the salary derivation rule.
//!
//! Field names on the wire are the established column names of the records
//! database (`primer_nombre`, `fecha_contratacion`, `salario`, ...). The Rust
//! side uses English names and maps them with `serde` renames.

pub mod employee;
pub mod error;
pub mod field;
pub mod salary;
pub mod temporal;

// Re-export the core types to provide a clean public API.
pub use employee::{
    EmployeeFilter, EmployeeRecord, EmployeeUpdate, Lookup, NewEmployee, Termination,
    TerminationRecord, DEFAULT_TERMINATION_REASON,
};
pub use error::CoreError;
pub use salary::SalaryInput;
