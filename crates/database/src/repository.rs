use crate::query;
use crate::store::EmployeeStore;
use crate::DbError;
use async_trait::async_trait;
use chrono::Local;
use core_types::{
    EmployeeFilter, EmployeeRecord, EmployeeUpdate, NewEmployee, SalaryInput, Termination,
    TerminationRecord,
};
use sqlx::postgres::{PgPool, Postgres};
use sqlx::Transaction;

/// The `EmployeeRepository` is the PostgreSQL-backed [`EmployeeStore`].
///
/// It owns only the pool. Each operation checks out its own connection and
/// runs inside its own transaction, which is rolled back if the operation
/// returns early with an error.
#[derive(Debug, Clone)]
pub struct EmployeeRepository {
    pool: PgPool,
}

impl EmployeeRepository {
    /// Creates a new `EmployeeRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Fetches the termination history of one employee, oldest first.
    pub async fn terminations_for(&self, employee_id: i64) -> Result<Vec<TerminationRecord>, DbError> {
        let records = sqlx::query_as::<_, TerminationRecord>(query::SELECT_TERMINATIONS)
            .bind(employee_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }
}

/// Writes the salary row inside an ongoing transaction. `replace` selects the
/// upsert used by updates over the plain insert used for new employees.
async fn write_salary(
    tx: &mut Transaction<'_, Postgres>,
    employee_id: i64,
    salary: &SalaryInput,
    replace: bool,
) -> Result<u64, DbError> {
    let total = salary.total()?;
    let statement = if replace { query::REPLACE_SALARY } else { query::INSERT_SALARY };

    let result = sqlx::query(statement)
        .bind(employee_id)
        .bind(salary.base)
        .bind(salary.bonus)
        .bind(salary.deductions)
        .bind(total)
        .execute(&mut **tx)
        .await?;

    Ok(result.rows_affected())
}

#[async_trait]
impl EmployeeStore for EmployeeRepository {
    async fn insert_employee(&self, employee: &NewEmployee) -> Result<i64, DbError> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(query::INSERT_EMPLOYEE)
            .bind(&employee.first_name)
            .bind(employee.middle_name.as_deref())
            .bind(&employee.last_name)
            .bind(employee.second_last_name.as_deref())
            .bind(&employee.email)
            .bind(&employee.phone)
            .bind(employee.hire_date)
            .bind(employee.department_id)
            .bind(employee.position_id)
            .fetch_one(&mut *tx)
            .await?;

        if let Some(salary) = &employee.salary {
            write_salary(&mut tx, id, salary, false).await?;
        }

        tx.commit().await?;

        tracing::info!(employee_id = id, with_salary = employee.salary.is_some(), "Employee inserted.");
        Ok(id)
    }

    async fn update_employee(&self, update: &EmployeeUpdate) -> Result<u64, DbError> {
        let mut tx = self.pool.begin().await?;

        // Holds the row for the rest of the transaction and tells us whether it exists.
        let exists: Option<i64> = sqlx::query_scalar(query::LOCK_EMPLOYEE)
            .bind(update.id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(DbError::NotFound(update.id));
        }

        let mut rows_affected = 0;

        if let Some(mut statement) = query::update_employee(update) {
            let result = statement.build().execute(&mut *tx).await?;
            rows_affected += result.rows_affected();
        }

        if let Some(salary) = &update.salary {
            rows_affected += write_salary(&mut tx, update.id, salary, true).await?;
        }

        tx.commit().await?;

        tracing::info!(employee_id = update.id, rows_affected, "Employee updated.");
        Ok(rows_affected)
    }

    async fn select_employees(&self, filter: &EmployeeFilter) -> Result<Vec<EmployeeRecord>, DbError> {
        let mut statement = query::select_employees(filter);

        let records = statement
            .build_query_as::<EmployeeRecord>()
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(lookup = ?filter.lookup(), count = records.len(), "Employees selected.");
        Ok(records)
    }

    async fn deactivate_employee(&self, termination: &Termination) -> Result<u64, DbError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(query::DEACTIVATE_EMPLOYEE)
            .bind(termination.id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotActive(termination.id));
        }

        let reason = termination.reason_or_default();
        sqlx::query(query::INSERT_TERMINATION)
            .bind(termination.id)
            .bind(Local::now().date_naive())
            .bind(reason)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(employee_id = termination.id, reason, "Employee deactivated.");
        Ok(result.rows_affected())
    }
}
