mod common;

use anyhow::Result;
use common::{StandardFriends, add_expense, test_service};
use udhaar::application::AppError;
use udhaar::domain::{COLOR_PALETTE, PaymentType};

#[tokio::test]
async fn test_add_friend_defaults() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let person = service
        .create_person("Ravi Kumar".into(), None, None)
        .await?;

    assert_eq!(person.name, "Ravi Kumar");
    assert_eq!(person.initials, "RK");
    assert!(COLOR_PALETTE.contains(&person.color.as_str()));
    assert!(person.avatar.is_none());

    Ok(())
}

#[tokio::test]
async fn test_add_friend_with_overrides() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let person = service
        .create_person(
            "Sana".into(),
            Some("#123456".into()),
            Some("avatar-7".into()),
        )
        .await?;

    assert_eq!(person.color, "#123456");
    assert_eq!(person.avatar.as_deref(), Some("avatar-7"));

    Ok(())
}

#[tokio::test]
async fn test_add_friend_rejects_empty_name() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let result = service.create_person("   ".into(), None, None).await;
    assert!(matches!(
        result,
        Err(AppError::Validation { ref field, .. }) if field == "name"
    ));

    Ok(())
}

#[tokio::test]
async fn test_add_friend_rejects_duplicate_name() -> Result<()> {
    let (service, _temp) = test_service().await?;

    service.create_person("Ravi".into(), None, None).await?;
    let result = service.create_person("Ravi".into(), None, None).await;

    assert!(matches!(result, Err(AppError::PersonAlreadyExists(_))));

    Ok(())
}

#[tokio::test]
async fn test_add_friend_concurrent_duplicate_name() -> Result<()> {
    let (service, _temp) = test_service().await?;

    // Both creates may pass the existence check before either inserts; the
    // loser must still surface as a duplicate, not an opaque database error.
    let (first, second) = tokio::join!(
        service.create_person("Ravi".into(), None, None),
        service.create_person("Ravi".into(), None, None),
    );

    let results = [first, second];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let loser = results.iter().find(|r| r.is_err()).unwrap();
    assert!(matches!(loser, Err(AppError::PersonAlreadyExists(_))));

    assert_eq!(service.list_people().await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_list_friends_sorted_by_name() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardFriends::create_basic(&service).await?;

    let people = service.list_people().await?;
    let names: Vec<&str> = people.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Amit", "Ravi", "Sana"]);

    Ok(())
}

#[tokio::test]
async fn test_remove_friend_blocked_while_outstanding() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardFriends::create_basic(&service).await?;
    add_expense(&service, "Ravi", 10000).await?;

    let result = service.delete_person("Ravi").await;
    assert!(matches!(
        result,
        Err(AppError::OutstandingBalance { balance: 10000, .. })
    ));

    // The friend and their expense are untouched
    assert_eq!(service.list_people().await?.len(), 3);
    assert_eq!(service.list_expenses(Some("Ravi"), false, None).await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_remove_friend_after_settlement() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardFriends::create_basic(&service).await?;
    let expense_id = add_expense(&service, "Ravi", 10000).await?;

    service
        .record_payment(expense_id, PaymentType::Full, None, None)
        .await?;

    service.delete_person("Ravi").await?;

    assert_eq!(service.list_people().await?.len(), 2);
    // The settled history went with them
    assert!(matches!(
        service.get_expense_info(expense_id).await,
        Err(AppError::ExpenseNotFound(_))
    ));

    Ok(())
}

#[tokio::test]
async fn test_remove_unknown_friend() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let result = service.delete_person("Nobody").await;
    assert!(matches!(result, Err(AppError::PersonNotFound(_))));

    Ok(())
}
