//! Service-level tests for registration, the purchase ledger, and discounts.

use loyalcard::db::{CustomerProfile, Store};
use loyalcard::services::{IdentityService, LedgerError, LedgerService};

async fn test_store() -> Store {
    let db_path =
        std::env::temp_dir().join(format!("loyalcard-ledger-test-{}.db", uuid::Uuid::new_v4()));

    Store::new(&format!("sqlite:{}", db_path.display()))
        .await
        .expect("failed to create test store")
}

fn empty_profile() -> CustomerProfile {
    CustomerProfile {
        name: None,
        email: None,
        phone: None,
        address: None,
        birthdate: None,
    }
}

#[tokio::test]
async fn registration_grants_bonus_and_default_name() {
    let store = test_store().await;
    let identity = IdentityService::new(store.clone());

    let customer = identity
        .register_new("LC0001234", &empty_profile(), None)
        .await
        .unwrap();

    assert_eq!(customer.barcode, "LC0001234");
    assert_eq!(customer.points_balance, 10);
    assert_eq!(customer.total_spent, 0.0);
    assert_eq!(customer.name, "Customer LC0001234");
}

#[tokio::test]
async fn registration_rejects_duplicate_barcode() {
    let store = test_store().await;
    let identity = IdentityService::new(store.clone());

    identity
        .register_new("LC0000042", &empty_profile(), None)
        .await
        .unwrap();

    let err = identity
        .register_new("LC0000042", &empty_profile(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::DuplicateBarcode));
    assert_eq!(store.count_customers(None).await.unwrap(), 1);
}

#[tokio::test]
async fn registration_rejects_malformed_barcode() {
    let store = test_store().await;
    let identity = IdentityService::new(store);

    for bad in ["", "LC123", "XX0001234", "LC12345678", "LC12a4567"] {
        let err = identity
            .register_new(bad, &empty_profile(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)), "{bad}");
    }
}

#[tokio::test]
async fn generated_barcodes_are_well_formed() {
    let store = test_store().await;
    let identity = IdentityService::new(store);

    let customer = identity
        .register_with_generated_barcode(&empty_profile(), None)
        .await
        .unwrap();

    assert!(loyalcard::barcode::is_valid(&customer.barcode));
}

#[tokio::test]
async fn purchase_earns_rounded_points() {
    let store = test_store().await;
    let identity = IdentityService::new(store.clone());
    let ledger = LedgerService::new(store.clone());

    let customer = identity
        .register_new("LC0000001", &empty_profile(), None)
        .await
        .unwrap();

    // 19.99 / 2 = 9.995, rounds to 10
    let purchase = ledger
        .record_purchase(customer.id, 19.99, None)
        .await
        .unwrap();

    assert_eq!(purchase.amount, 19.99);
    assert_eq!(purchase.points_earned, 10);
    assert_eq!(purchase.discount_applied, None);

    let refreshed = store.get_customer(customer.id).await.unwrap().unwrap();
    assert_eq!(refreshed.points_balance, 10 + 10);
    assert_eq!(refreshed.total_spent, 19.99);
}

#[tokio::test]
async fn purchase_rejects_negative_amount() {
    let store = test_store().await;
    let identity = IdentityService::new(store.clone());
    let ledger = LedgerService::new(store);

    let customer = identity
        .register_new("LC0000002", &empty_profile(), None)
        .await
        .unwrap();

    let err = ledger
        .record_purchase(customer.id, -5.0, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}

#[tokio::test]
async fn purchase_for_unknown_customer_fails() {
    let store = test_store().await;
    let ledger = LedgerService::new(store);

    let err = ledger.record_purchase(9999, 10.0, None).await.unwrap_err();
    assert!(matches!(err, LedgerError::CustomerNotFound));
}

#[tokio::test]
async fn discount_nets_amount_and_is_consumed() {
    let store = test_store().await;
    let identity = IdentityService::new(store.clone());
    let ledger = LedgerService::new(store.clone());

    let customer = identity
        .register_new("LC0000003", &empty_profile(), None)
        .await
        .unwrap();

    let expiry = (chrono::Utc::now() + chrono::Duration::days(30)).to_rfc3339();
    let discount = store
        .create_discount(customer.id, 10.0, &expiry)
        .await
        .unwrap();

    // 25 gross - 10 discount = 15 net, 15 / 2 = 7.5 rounds to 8
    let purchase = ledger
        .record_purchase(customer.id, 25.0, Some(discount.id))
        .await
        .unwrap();

    assert_eq!(purchase.amount, 15.0);
    assert_eq!(purchase.points_earned, 8);
    assert_eq!(purchase.discount_applied, Some(10.0));

    let refreshed = store.get_discount(discount.id).await.unwrap().unwrap();
    assert!(refreshed.is_used);
    assert!(
        store
            .list_available_discounts(customer.id)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn discount_larger_than_purchase_clamps_to_zero() {
    let store = test_store().await;
    let identity = IdentityService::new(store.clone());
    let ledger = LedgerService::new(store.clone());

    let customer = identity
        .register_new("LC0000004", &empty_profile(), None)
        .await
        .unwrap();

    let expiry = (chrono::Utc::now() + chrono::Duration::days(7)).to_rfc3339();
    let discount = store
        .create_discount(customer.id, 50.0, &expiry)
        .await
        .unwrap();

    let purchase = ledger
        .record_purchase(customer.id, 20.0, Some(discount.id))
        .await
        .unwrap();

    assert_eq!(purchase.amount, 0.0);
    assert_eq!(purchase.points_earned, 0);
}

#[tokio::test]
async fn used_discount_is_rejected_without_side_effects() {
    let store = test_store().await;
    let identity = IdentityService::new(store.clone());
    let ledger = LedgerService::new(store.clone());

    let customer = identity
        .register_new("LC0000005", &empty_profile(), None)
        .await
        .unwrap();

    let expiry = (chrono::Utc::now() + chrono::Duration::days(7)).to_rfc3339();
    let discount = store
        .create_discount(customer.id, 5.0, &expiry)
        .await
        .unwrap();

    ledger
        .record_purchase(customer.id, 10.0, Some(discount.id))
        .await
        .unwrap();

    let before = store.get_customer(customer.id).await.unwrap().unwrap();
    let purchases_before = store.list_customer_purchases(customer.id).await.unwrap();

    let err = ledger
        .record_purchase(customer.id, 10.0, Some(discount.id))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::DiscountAlreadyUsed));

    // Rejection leaves no trace: no purchase row, no balance movement.
    let after = store.get_customer(customer.id).await.unwrap().unwrap();
    assert_eq!(after.points_balance, before.points_balance);
    assert_eq!(after.total_spent, before.total_spent);
    assert_eq!(
        store
            .list_customer_purchases(customer.id)
            .await
            .unwrap()
            .len(),
        purchases_before.len()
    );
}

#[tokio::test]
async fn discount_expiry_with_non_utc_offset_is_honored() {
    let store = test_store().await;
    let identity = IdentityService::new(store.clone());
    let ledger = LedgerService::new(store.clone());

    let customer = identity
        .register_new("LC0000013", &empty_profile(), None)
        .await
        .unwrap();

    // One hour in the future, expressed in a -11:00 offset. Naive string
    // comparison against a UTC clock would call this expired.
    let offset = chrono::FixedOffset::west_opt(11 * 3600).unwrap();
    let expiry = (chrono::Utc::now() + chrono::Duration::hours(1))
        .with_timezone(&offset)
        .to_rfc3339();
    let discount = store
        .create_discount(customer.id, 5.0, &expiry)
        .await
        .unwrap();

    assert_eq!(
        store
            .list_available_discounts(customer.id)
            .await
            .unwrap()
            .len(),
        1
    );

    let purchase = ledger
        .record_purchase(customer.id, 10.0, Some(discount.id))
        .await
        .unwrap();
    assert_eq!(purchase.amount, 5.0);
}

#[tokio::test]
async fn expired_discount_is_rejected_but_kept() {
    let store = test_store().await;
    let identity = IdentityService::new(store.clone());
    let ledger = LedgerService::new(store.clone());

    let customer = identity
        .register_new("LC0000006", &empty_profile(), None)
        .await
        .unwrap();

    let expiry = (chrono::Utc::now() - chrono::Duration::days(1)).to_rfc3339();
    let discount = store
        .create_discount(customer.id, 5.0, &expiry)
        .await
        .unwrap();

    let err = ledger
        .record_purchase(customer.id, 10.0, Some(discount.id))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::DiscountExpired));

    // Kept for audit, still unused, but never listed as available.
    let kept = store.get_discount(discount.id).await.unwrap().unwrap();
    assert!(!kept.is_used);
    assert!(
        store
            .list_available_discounts(customer.id)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn discount_belonging_to_another_customer_is_rejected() {
    let store = test_store().await;
    let identity = IdentityService::new(store.clone());
    let ledger = LedgerService::new(store.clone());

    let alice = identity
        .register_new("LC0000007", &empty_profile(), None)
        .await
        .unwrap();
    let bob = identity
        .register_new("LC0000008", &empty_profile(), None)
        .await
        .unwrap();

    let expiry = (chrono::Utc::now() + chrono::Duration::days(7)).to_rfc3339();
    let discount = store.create_discount(alice.id, 5.0, &expiry).await.unwrap();

    let err = ledger
        .record_purchase(bob.id, 10.0, Some(discount.id))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::DiscountWrongCustomer));
}

#[tokio::test]
async fn concurrent_purchases_lose_no_updates() {
    let store = test_store().await;
    let identity = IdentityService::new(store.clone());
    let ledger = LedgerService::new(store.clone());

    let customer = identity
        .register_new("LC0000009", &empty_profile(), None)
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        ledger.record_purchase(customer.id, 10.0, None),
        ledger.record_purchase(customer.id, 30.0, None),
    );
    let a = a.unwrap();
    let b = b.unwrap();

    let refreshed = store.get_customer(customer.id).await.unwrap().unwrap();
    assert_eq!(
        refreshed.points_balance,
        10 + a.points_earned + b.points_earned
    );
    assert_eq!(refreshed.total_spent, 40.0);
}

#[tokio::test]
async fn racing_purchases_consume_a_discount_at_most_once() {
    let store = test_store().await;
    let identity = IdentityService::new(store.clone());
    let ledger = LedgerService::new(store.clone());

    let customer = identity
        .register_new("LC0000012", &empty_profile(), None)
        .await
        .unwrap();

    let expiry = (chrono::Utc::now() + chrono::Duration::days(7)).to_rfc3339();
    let discount = store
        .create_discount(customer.id, 10.0, &expiry)
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        ledger.record_purchase(customer.id, 30.0, Some(discount.id)),
        ledger.record_purchase(customer.id, 30.0, Some(discount.id)),
    );

    let (winner, loser) = match (a, b) {
        (Ok(p), Err(e)) | (Err(e), Ok(p)) => (p, e),
        other => panic!("expected exactly one purchase to win: {other:?}"),
    };
    assert!(matches!(loser, LedgerError::DiscountAlreadyUsed));
    assert_eq!(winner.amount, 20.0);

    // Only the winner's side effects persist.
    let refreshed = store.get_customer(customer.id).await.unwrap().unwrap();
    assert_eq!(refreshed.points_balance, 10 + winner.points_earned);
    assert_eq!(refreshed.total_spent, 20.0);
    assert_eq!(
        store
            .list_customer_purchases(customer.id)
            .await
            .unwrap()
            .len(),
        1
    );
    assert!(store.get_discount(discount.id).await.unwrap().unwrap().is_used);
}

#[tokio::test]
async fn resolve_is_store_scoped() {
    let store = test_store().await;
    let identity = IdentityService::new(store.clone());

    let owner_a = store
        .create_store_owner("a@example.com", "password-a", "Store A", None)
        .await
        .unwrap();
    let owner_b = store
        .create_store_owner("b@example.com", "password-b", "Store B", None)
        .await
        .unwrap();

    let customer = identity
        .register_new("LC0000010", &empty_profile(), Some(owner_a.id))
        .await
        .unwrap();

    // The owning store resolves the barcode; any other scope sees nothing.
    assert!(
        identity
            .resolve_by_barcode("LC0000010", Some(owner_a.id))
            .await
            .is_ok()
    );
    let err = identity
        .resolve_by_barcode("LC0000010", Some(owner_b.id))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::CustomerNotFound));

    // Unscoped (admin) resolution still works.
    let resolved = identity.resolve_by_barcode("LC0000010", None).await.unwrap();
    assert_eq!(resolved.id, customer.id);
}

#[tokio::test]
async fn point_adjustments_respect_the_floor() {
    let store = test_store().await;
    let identity = IdentityService::new(store.clone());
    let ledger = LedgerService::new(store.clone());

    let customer = identity
        .register_new("LC0000011", &empty_profile(), None)
        .await
        .unwrap();

    let updated = ledger.adjust_points(customer.id, 5).await.unwrap();
    assert_eq!(updated.points_balance, 15);

    let err = ledger.adjust_points(customer.id, -100).await.unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));

    let unchanged = store.get_customer(customer.id).await.unwrap().unwrap();
    assert_eq!(unchanged.points_balance, 15);

    let err = ledger.adjust_points(9999, 1).await.unwrap_err();
    assert!(matches!(err, LedgerError::CustomerNotFound));
}

#[tokio::test]
async fn deactivated_owner_cannot_authenticate() {
    let store = test_store().await;
    let auth = loyalcard::services::AuthService::new(store.clone());

    let owner = store
        .create_store_owner("shop@example.com", "hunter22!", "Corner Shop", None)
        .await
        .unwrap();

    assert!(
        auth.authenticate_store_owner("shop@example.com", "hunter22!")
            .await
            .is_ok()
    );
    assert!(matches!(
        auth.authenticate_store_owner("shop@example.com", "wrong")
            .await
            .unwrap_err(),
        LedgerError::InvalidCredentials
    ));

    store
        .set_store_owner_active(owner.id, false)
        .await
        .unwrap();

    assert!(matches!(
        auth.authenticate_store_owner("shop@example.com", "hunter22!")
            .await
            .unwrap_err(),
        LedgerError::InvalidCredentials
    ));
}
