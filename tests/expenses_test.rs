mod common;

use anyhow::Result;
use common::{StandardFriends, add_expense, test_service};
use udhaar::application::AppError;
use udhaar::domain::{Category, PaymentMethod, UpiApp};

#[tokio::test]
async fn test_create_expense_starts_unpaid() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardFriends::create_basic(&service).await?;

    let result = service
        .create_expense(
            "Ravi",
            25000,
            Category::Food,
            PaymentMethod::Upi,
            Some(UpiApp::Gpay),
            Some("dinner at the dhaba".into()),
        )
        .await?;

    let expense = &result.expense;
    assert_eq!(expense.amount_cents, 25000);
    assert_eq!(expense.amount_paid_cents, 0);
    assert!(!expense.is_paid);
    assert_eq!(expense.category, Category::Food);
    assert_eq!(expense.upi_app, Some(UpiApp::Gpay));
    assert_eq!(result.person.name, "Ravi");

    Ok(())
}

#[tokio::test]
async fn test_create_expense_rejects_non_positive_amount() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardFriends::create_basic(&service).await?;

    for amount in [0, -500] {
        let result = service
            .create_expense("Ravi", amount, Category::Other, PaymentMethod::Cash, None, None)
            .await;
        assert!(matches!(
            result,
            Err(AppError::Validation { ref field, .. }) if field == "amount"
        ));
    }

    Ok(())
}

#[tokio::test]
async fn test_create_expense_rejects_unknown_person() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let result = service
        .create_expense("Nobody", 1000, Category::Gift, PaymentMethod::Cash, None, None)
        .await;
    assert!(matches!(
        result,
        Err(AppError::Validation { ref field, .. }) if field == "person"
    ));

    Ok(())
}

#[tokio::test]
async fn test_upi_app_ignored_for_non_upi_methods() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardFriends::create_basic(&service).await?;

    let result = service
        .create_expense(
            "Sana",
            5000,
            Category::Recharge,
            PaymentMethod::Cash,
            Some(UpiApp::Paytm),
            None,
        )
        .await?;

    assert_eq!(result.expense.upi_app, None);

    Ok(())
}

#[tokio::test]
async fn test_list_expenses_filters() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardFriends::create_basic(&service).await?;

    add_expense(&service, "Ravi", 10000).await?;
    add_expense(&service, "Ravi", 2000).await?;
    add_expense(&service, "Sana", 3000).await?;

    assert_eq!(service.list_expenses(None, false, None).await?.len(), 3);
    assert_eq!(service.list_expenses(Some("Ravi"), false, None).await?.len(), 2);
    assert_eq!(service.list_expenses(None, false, Some(1)).await?.len(), 1);

    let result = service.list_expenses(Some("Nobody"), false, None).await;
    assert!(matches!(result, Err(AppError::PersonNotFound(_))));

    Ok(())
}

#[tokio::test]
async fn test_list_expenses_unpaid_filter() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardFriends::create_basic(&service).await?;

    let settled = add_expense(&service, "Ravi", 10000).await?;
    add_expense(&service, "Ravi", 2000).await?;

    service
        .record_payment(settled, udhaar::domain::PaymentType::Full, None, None)
        .await?;

    let unpaid = service.list_expenses(None, true, None).await?;
    assert_eq!(unpaid.len(), 1);
    assert_eq!(unpaid[0].expense.amount_cents, 2000);

    Ok(())
}

#[tokio::test]
async fn test_expense_details_include_payment_history() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardFriends::create_basic(&service).await?;

    let expense_id = add_expense(&service, "Amit", 10000).await?;
    service
        .record_payment(expense_id, udhaar::domain::PaymentType::Partial, None, None)
        .await?;
    service
        .record_payment(
            expense_id,
            udhaar::domain::PaymentType::Custom,
            Some(2000),
            None,
        )
        .await?;

    let info = service.get_expense_info(expense_id).await?;
    assert_eq!(info.person.name, "Amit");
    assert_eq!(info.payments.len(), 2);
    assert_eq!(info.payments[0].amount_cents, 5000);
    assert_eq!(info.payments[1].amount_cents, 2000);
    assert_eq!(info.expense.amount_paid_cents, 7000);

    Ok(())
}

#[tokio::test]
async fn test_expense_details_unknown_id() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let result = service.get_expense_info(uuid::Uuid::new_v4()).await;
    assert!(matches!(result, Err(AppError::ExpenseNotFound(_))));

    Ok(())
}
