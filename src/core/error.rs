use thiserror::Error;

use super::types::RecordId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("{field} must be >= 0")]
    Negative { field: &'static str },

    #[error("{field} must not be empty")]
    EmptyName { field: &'static str },

    #[error("debt principal must be > 0")]
    NonPositivePrincipal,

    #[error("debt allocation {allocation} exceeds monthly budget {budget}")]
    AllocationExceedsBudget { allocation: f64, budget: f64 },

    #[error("debt allocation fraction must be between 0 and 1, got {0}")]
    FractionOutOfRange(f64),

    #[error("horizon of {months} months exceeds the maximum of {max}")]
    HorizonTooLong { months: u32, max: u32 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("record not found: {0}")]
    NotFound(RecordId),

    #[error(transparent)]
    Invalid(#[from] InputError),
}

pub(crate) fn non_negative(field: &'static str, value: f64) -> Result<(), InputError> {
    if !value.is_finite() {
        return Err(InputError::NotFinite { field });
    }
    if value < 0.0 {
        return Err(InputError::Negative { field });
    }
    Ok(())
}
