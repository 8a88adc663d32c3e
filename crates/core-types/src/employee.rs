use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{CoreError, SalaryInput};

/// Reason recorded on a termination when the client does not give one.
pub const DEFAULT_TERMINATION_REASON: &str = "unspecified";

/// An employee as returned by a lookup: the employee row joined with its
/// salary, department name and position title.
///
/// The joined columns are optional because the join is an outer one; an
/// employee without a salary row still shows up with those fields `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct EmployeeRecord {
    pub id: i64,
    #[serde(rename = "primer_nombre")]
    pub first_name: String,
    #[serde(rename = "segundo_nombre")]
    pub middle_name: Option<String>,
    #[serde(rename = "primer_apellido")]
    pub last_name: String,
    #[serde(rename = "segundo_apellido")]
    pub second_last_name: Option<String>,
    pub email: String,
    #[serde(rename = "celular")]
    pub phone: String,
    #[serde(rename = "fecha_contratacion", with = "crate::temporal::date")]
    pub hire_date: NaiveDate,
    #[serde(rename = "departamento_id")]
    pub department_id: Option<i64>,
    #[serde(rename = "cargo_id")]
    pub position_id: Option<i64>,
    /// `true` while the employee is active; flipped once, on deactivation.
    #[serde(rename = "estado")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    // Outer-joined columns.
    #[serde(rename = "salario_base", default, with = "rust_decimal::serde::float_option")]
    pub salary_base: Option<Decimal>,
    #[serde(rename = "bonificaciones", default, with = "rust_decimal::serde::float_option")]
    pub salary_bonus: Option<Decimal>,
    #[serde(rename = "deducciones", default, with = "rust_decimal::serde::float_option")]
    pub salary_deductions: Option<Decimal>,
    #[serde(rename = "salario_total", default, with = "rust_decimal::serde::float_option")]
    pub salary_total: Option<Decimal>,
    #[serde(rename = "departamento")]
    pub department: Option<String>,
    #[serde(rename = "cargo")]
    pub position: Option<String>,
}

/// Payload of an `INSERT`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEmployee {
    #[serde(rename = "primer_nombre")]
    pub first_name: String,
    #[serde(rename = "segundo_nombre", default)]
    pub middle_name: Option<String>,
    #[serde(rename = "primer_apellido")]
    pub last_name: String,
    #[serde(rename = "segundo_apellido", default)]
    pub second_last_name: Option<String>,
    pub email: String,
    #[serde(rename = "celular")]
    pub phone: String,
    #[serde(rename = "fecha_contratacion", with = "crate::temporal::date")]
    pub hire_date: NaiveDate,
    #[serde(rename = "departamento_id")]
    pub department_id: i64,
    #[serde(rename = "cargo_id")]
    pub position_id: i64,
    #[serde(rename = "salario", default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<SalaryInput>,
}

impl NewEmployee {
    /// Rejects blank required text. Everything else is left to the database constraints.
    pub fn validate(&self) -> Result<(), CoreError> {
        require_text("primer_nombre", &self.first_name)?;
        require_text("primer_apellido", &self.last_name)?;
        require_text("email", &self.email)?;
        require_text("celular", &self.phone)?;
        Ok(())
    }
}

/// Payload of an `UPDATE`: the target id plus a sparse set of changes.
///
/// `None` means "leave untouched". The two optional name fields are doubly
/// optional so that an explicit `null` clears them. There is no status field:
/// an inactive employee can never be turned back into an active one.
/// A salary, when present, replaces the stored salary as a whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmployeeUpdate {
    pub id: i64,
    #[serde(rename = "primer_nombre", default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(
        rename = "segundo_nombre",
        default,
        deserialize_with = "crate::field::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub middle_name: Option<Option<String>>,
    #[serde(rename = "primer_apellido", default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(
        rename = "segundo_apellido",
        default,
        deserialize_with = "crate::field::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub second_last_name: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "celular", default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(
        rename = "fecha_contratacion",
        default,
        with = "crate::temporal::date_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub hire_date: Option<NaiveDate>,
    #[serde(rename = "departamento_id", default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<i64>,
    #[serde(rename = "cargo_id", default, skip_serializing_if = "Option::is_none")]
    pub position_id: Option<i64>,
    #[serde(rename = "salario", default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<SalaryInput>,
}

impl EmployeeUpdate {
    /// Whether any employee column (as opposed to the salary) is being changed.
    pub fn has_field_changes(&self) -> bool {
        self.first_name.is_some()
            || self.middle_name.is_some()
            || self.last_name.is_some()
            || self.second_last_name.is_some()
            || self.email.is_some()
            || self.phone.is_some()
            || self.hire_date.is_some()
            || self.department_id.is_some()
            || self.position_id.is_some()
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(first_name) = &self.first_name {
            require_text("primer_nombre", first_name)?;
        }
        if let Some(last_name) = &self.last_name {
            require_text("primer_apellido", last_name)?;
        }
        if let Some(email) = &self.email {
            require_text("email", email)?;
        }
        if let Some(phone) = &self.phone {
            require_text("celular", phone)?;
        }
        Ok(())
    }
}

/// Payload of a `SELECT`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// The single criterion a lookup ends up using.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    ById(i64),
    ByEmail(&'a str),
    All,
}

impl EmployeeFilter {
    pub fn by_id(id: i64) -> Self {
        Self { id: Some(id), email: None }
    }

    pub fn by_email(email: impl Into<String>) -> Self {
        Self { id: None, email: Some(email.into()) }
    }

    /// The id wins when both an id and an email are given.
    pub fn lookup(&self) -> Lookup<'_> {
        match (self.id, self.email.as_deref()) {
            (Some(id), _) => Lookup::ById(id),
            (None, Some(email)) => Lookup::ByEmail(email),
            (None, None) => Lookup::All,
        }
    }
}

/// Payload of a `DELETE`, which deactivates rather than removes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Termination {
    pub id: i64,
    #[serde(rename = "motivo", default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Termination {
    pub fn new(id: i64, reason: Option<String>) -> Self {
        Self { id, reason }
    }

    /// The reason to record, falling back to [`DEFAULT_TERMINATION_REASON`] when blank.
    pub fn reason_or_default(&self) -> &str {
        self.reason
            .as_deref()
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
            .unwrap_or(DEFAULT_TERMINATION_REASON)
    }
}

/// A row of the termination history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TerminationRecord {
    pub id: i64,
    #[serde(rename = "empleado_id")]
    pub employee_id: i64,
    #[serde(rename = "fecha_retiro", with = "crate::temporal::date")]
    pub retired_on: NaiveDate,
    #[serde(rename = "motivo")]
    pub reason: String,
}

fn require_text(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::InvalidInput(
            field.to_string(),
            "must not be empty".to_string(),
        ));
    }
    Ok(())
}
