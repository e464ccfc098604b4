use thiserror::Error;

use crate::domain::{Cents, format_currency};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Person not found: {0}")]
    PersonNotFound(String),

    #[error("Person already exists: {0}")]
    PersonAlreadyExists(String),

    #[error("Expense not found: {0}")]
    ExpenseNotFound(String),

    #[error("Expense is already settled: {0}")]
    AlreadySettled(String),

    #[error("Cannot remove {name}: outstanding balance of {}", format_currency(*.balance))]
    OutstandingBalance { name: String, balance: Cents },

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl AppError {
    /// Convenience constructor for field-level validation failures.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}
