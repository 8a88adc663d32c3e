use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// The salary components a client may send.
///
/// `salario_total` is derived on every write; a total sent by the client is
/// ignored. Missing components count as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryInput {
    #[serde(rename = "salario_base", default, with = "rust_decimal::serde::float")]
    pub base: Decimal,
    #[serde(rename = "bonificaciones", default, with = "rust_decimal::serde::float")]
    pub bonus: Decimal,
    #[serde(rename = "deducciones", default, with = "rust_decimal::serde::float")]
    pub deductions: Decimal,
}

impl SalaryInput {
    pub fn new(base: Decimal, bonus: Decimal, deductions: Decimal) -> Self {
        Self { base, bonus, deductions }
    }

    /// `base + bonus - deductions`, the only way a salary total is ever produced.
    pub fn total(&self) -> Result<Decimal, CoreError> {
        self.base
            .checked_add(self.bonus)
            .and_then(|gross| gross.checked_sub(self.deductions))
            .ok_or_else(|| CoreError::Calculation("salary total overflows".to_string()))
    }
}
