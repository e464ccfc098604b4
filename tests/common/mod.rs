// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use tempfile::TempDir;
use udhaar::application::LedgerService;
use udhaar::domain::{Category, ExpenseId, PaymentMethod};

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Test fixture: standard friend setup
pub struct StandardFriends;

impl StandardFriends {
    /// Create a basic friend set: Ravi, Sana, Amit
    pub async fn create_basic(service: &LedgerService) -> Result<()> {
        service
            .create_person("Ravi".into(), None, None)
            .await?;
        service
            .create_person("Sana".into(), None, None)
            .await?;
        service
            .create_person("Amit".into(), None, None)
            .await?;
        Ok(())
    }
}

/// Record a cash food expense for a friend and return its ID.
pub async fn add_expense(service: &LedgerService, person: &str, amount: i64) -> Result<ExpenseId> {
    let result = service
        .create_expense(
            person,
            amount,
            Category::Food,
            PaymentMethod::Cash,
            None,
            None,
        )
        .await?;
    Ok(result.expense.id)
}
