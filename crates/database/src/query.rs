//! SQL text for the employee operations.
//!
//! Statements whose shape depends on the payload are assembled with
//! `QueryBuilder`; every value is bound, never spliced into the text.

use core_types::{EmployeeFilter, EmployeeUpdate, Lookup};
use sqlx::{Postgres, QueryBuilder};

pub(crate) const INSERT_EMPLOYEE: &str = r#"
    INSERT INTO empleados (
        primer_nombre, segundo_nombre, primer_apellido, segundo_apellido,
        email, celular, fecha_contratacion, departamento_id, cargo_id
    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
    RETURNING id
"#;

pub(crate) const INSERT_SALARY: &str = r#"
    INSERT INTO salarios (empleado_id, salario_base, bonificaciones, deducciones, salario_total)
    VALUES ($1, $2, $3, $4, $5)
"#;

/// Replaces all three components and the total; creates the row if the
/// employee had no salary yet.
pub(crate) const REPLACE_SALARY: &str = r#"
    INSERT INTO salarios (empleado_id, salario_base, bonificaciones, deducciones, salario_total)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT (empleado_id) DO UPDATE SET
        salario_base = EXCLUDED.salario_base,
        bonificaciones = EXCLUDED.bonificaciones,
        deducciones = EXCLUDED.deducciones,
        salario_total = EXCLUDED.salario_total
"#;

pub(crate) const LOCK_EMPLOYEE: &str = "SELECT id FROM empleados WHERE id = $1 FOR UPDATE";

/// Only an active employee can be deactivated; there is no way back.
pub(crate) const DEACTIVATE_EMPLOYEE: &str =
    "UPDATE empleados SET estado = FALSE, updated_at = NOW() WHERE id = $1 AND estado = TRUE";

pub(crate) const INSERT_TERMINATION: &str =
    "INSERT INTO historicos (empleado_id, fecha_retiro, motivo) VALUES ($1, $2, $3)";

pub(crate) const SELECT_TERMINATIONS: &str = r#"
    SELECT id, empleado_id AS employee_id, fecha_retiro AS retired_on, motivo AS reason
    FROM historicos
    WHERE empleado_id = $1
    ORDER BY id
"#;

/// Column aliases match the field names of `EmployeeRecord`.
const SELECT_EMPLOYEES: &str = "SELECT \
    e.id, \
    e.primer_nombre AS first_name, \
    e.segundo_nombre AS middle_name, \
    e.primer_apellido AS last_name, \
    e.segundo_apellido AS second_last_name, \
    e.email, \
    e.celular AS phone, \
    e.fecha_contratacion AS hire_date, \
    e.departamento_id AS department_id, \
    e.cargo_id AS position_id, \
    e.estado AS active, \
    e.created_at, \
    e.updated_at, \
    s.salario_base AS salary_base, \
    s.bonificaciones AS salary_bonus, \
    s.deducciones AS salary_deductions, \
    s.salario_total AS salary_total, \
    d.nombre AS department, \
    c.titulo AS position \
    FROM empleados e \
    LEFT JOIN salarios s ON s.empleado_id = e.id \
    LEFT JOIN departamentos d ON d.id = e.departamento_id \
    LEFT JOIN cargo c ON c.id = e.cargo_id";

/// Builds the joined lookup for a filter. The id wins over the email.
pub(crate) fn select_employees(filter: &EmployeeFilter) -> QueryBuilder<'_, Postgres> {
    let mut query = QueryBuilder::new(SELECT_EMPLOYEES);

    match filter.lookup() {
        Lookup::ById(id) => {
            query.push(" WHERE e.id = ").push_bind(id);
        }
        Lookup::ByEmail(email) => {
            query.push(" WHERE e.email = ").push_bind(email);
        }
        Lookup::All => {}
    }

    query.push(" ORDER BY e.id");
    query
}

/// Builds an UPDATE covering exactly the employee columns present in the
/// payload, or `None` when only the salary (or nothing) is being changed.
pub(crate) fn update_employee(update: &EmployeeUpdate) -> Option<QueryBuilder<'_, Postgres>> {
    if !update.has_field_changes() {
        return None;
    }

    let mut query = QueryBuilder::new("UPDATE empleados SET ");
    {
        let mut set = query.separated(", ");

        if let Some(first_name) = &update.first_name {
            set.push("primer_nombre = ").push_bind_unseparated(first_name);
        }
        if let Some(middle_name) = &update.middle_name {
            set.push("segundo_nombre = ").push_bind_unseparated(middle_name.as_deref());
        }
        if let Some(last_name) = &update.last_name {
            set.push("primer_apellido = ").push_bind_unseparated(last_name);
        }
        if let Some(second_last_name) = &update.second_last_name {
            set.push("segundo_apellido = ").push_bind_unseparated(second_last_name.as_deref());
        }
        if let Some(email) = &update.email {
            set.push("email = ").push_bind_unseparated(email);
        }
        if let Some(phone) = &update.phone {
            set.push("celular = ").push_bind_unseparated(phone);
        }
        if let Some(hire_date) = update.hire_date {
            set.push("fecha_contratacion = ").push_bind_unseparated(hire_date);
        }
        if let Some(department_id) = update.department_id {
            set.push("departamento_id = ").push_bind_unseparated(department_id);
        }
        if let Some(position_id) = update.position_id {
            set.push("cargo_id = ").push_bind_unseparated(position_id);
        }
        set.push("updated_at = NOW()");
    }
    query.push(" WHERE id = ").push_bind(update.id);

    Some(query)
}
