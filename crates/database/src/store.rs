use async_trait::async_trait;
use core_types::{EmployeeFilter, EmployeeRecord, EmployeeUpdate, NewEmployee, Termination};

use crate::DbError;

/// The four record operations the server dispatches to.
///
/// Every call is a unit of work of its own: it either commits completely or
/// leaves the store unchanged. Implementations must be shareable across
/// connection tasks. Payloads arrive already validated by the caller.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Creates an active employee (and its salary, if given) and returns the new id.
    async fn insert_employee(&self, employee: &NewEmployee) -> Result<i64, DbError>;

    /// Applies a sparse change set and returns the number of rows written.
    async fn update_employee(&self, update: &EmployeeUpdate) -> Result<u64, DbError>;

    /// Returns the employees matching the filter, joined with their salary,
    /// department and position.
    async fn select_employees(&self, filter: &EmployeeFilter) -> Result<Vec<EmployeeRecord>, DbError>;

    /// Marks an active employee inactive and records the termination.
    async fn deactivate_employee(&self, termination: &Termination) -> Result<u64, DbError>;
}
