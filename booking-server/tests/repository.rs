//! SurrealDB repository tests (embedded RocksDB in a temp dir)

mod common;

use booking_server::db::repository::{BookingRepository, ShopRepository, UserRepository};
use booking_server::store::{BookingStore, NameMatch, ShopCatalog, ShopFilter, UserStore};
use chrono::{Duration, Utc};
use shared::models::{BookingStatus, Locale, MessageRef, NewBooking, ShopCategory, UserUpsert};

fn draft(shop_id: i64, user: i64, hours_ahead: i64) -> NewBooking {
    NewBooking {
        shop_id,
        shop_name: "Cuts Inc".into(),
        user_telegram_id: user,
        user_telegram_username: Some("alice".into()),
        user_number: "+998901234567".into(),
        user_telegram_number: None,
        requested_time: Utc::now() + Duration::hours(hours_ahead),
    }
}

#[tokio::test]
async fn test_booking_insert_and_find() {
    let tmp = tempfile::tempdir().unwrap();
    let db = common::open_db(&tmp).await;
    let repo = BookingRepository::new(db.db);

    let created = repo.insert(draft(7, 42, 24)).await.unwrap();
    assert_eq!(created.status, BookingStatus::Pending);
    assert!(created.rejection_reason.is_none());

    let found = repo.find_by_id(&created.id).await.unwrap().unwrap();
    assert_eq!(found.id, created.id);
    assert_eq!(found.shop_name, "Cuts Inc");
    assert_eq!(
        found.requested_time.timestamp_millis(),
        created.requested_time.timestamp_millis()
    );

    assert!(repo.find_by_id("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_booking_transition_is_conditional() {
    let tmp = tempfile::tempdir().unwrap();
    let db = common::open_db(&tmp).await;
    let repo = BookingRepository::new(db.db);
    let booking = repo.insert(draft(7, 42, 24)).await.unwrap();

    let rejected = repo
        .transition(
            &booking.id,
            &[BookingStatus::Pending],
            BookingStatus::Rejected,
            Some("Fully booked".into()),
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(rejected.status, BookingStatus::Rejected);
    assert_eq!(rejected.rejection_reason.as_deref(), Some("Fully booked"));

    // 旧状态不再匹配，写入不生效
    let second = repo
        .transition(&booking.id, &[BookingStatus::Pending], BookingStatus::Confirmed, None)
        .await
        .unwrap();
    assert!(second.is_none());
    let stored = repo.find_by_id(&booking.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Rejected);
}

#[tokio::test]
async fn test_booking_admin_message_and_queries() {
    let tmp = tempfile::tempdir().unwrap();
    let db = common::open_db(&tmp).await;
    let repo = BookingRepository::new(db.db);

    let first = repo.insert(draft(7, 42, 24)).await.unwrap();
    let second = repo.insert(draft(7, 42, 48)).await.unwrap();
    repo.insert(draft(8, 43, 24)).await.unwrap();

    let message = MessageRef {
        chat_id: 1,
        message_id: 99,
    };
    repo.set_admin_message(&first.id, message).await.unwrap();
    let stored = repo.find_by_id(&first.id).await.unwrap().unwrap();
    assert_eq!(stored.admin_message, Some(message));
    assert!(repo.set_admin_message("missing", message).await.is_err());

    let mine = repo.find_by_user(42).await.unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|b| b.user_telegram_id == 42));

    repo.transition(&second.id, &[BookingStatus::Pending], BookingStatus::Confirmed, None)
        .await
        .unwrap()
        .unwrap();
    let slots = repo.find_confirmed_after(7, Utc::now()).await.unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].id, second.id);
    assert!(repo.find_confirmed_after(8, Utc::now()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_user_upsert_merges_fields() {
    let tmp = tempfile::tempdir().unwrap();
    let db = common::open_db(&tmp).await;
    let repo = UserRepository::new(db.db);

    let created = repo
        .upsert(UserUpsert {
            telegram_id: "42".into(),
            name: "Alice".into(),
            username: Some("alice".into()),
            phone: Some("+998901234567".into()),
            avatar: None,
        })
        .await
        .unwrap();
    assert_eq!(created.phone.as_deref(), Some("+998901234567"));

    // 未提供的字段保持原值
    let updated = repo
        .upsert(UserUpsert {
            telegram_id: "42".into(),
            name: "Alice B".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(updated.name, "Alice B");
    assert_eq!(updated.phone.as_deref(), Some("+998901234567"));
    assert_eq!(updated.username.as_deref(), Some("alice"));

    let found = repo.find_by_telegram_id("42").await.unwrap().unwrap();
    assert_eq!(found, updated);
    assert!(repo.find_by_telegram_id("43").await.unwrap().is_none());

    assert!(repo
        .upsert(UserUpsert {
            telegram_id: "  ".into(),
            ..Default::default()
        })
        .await
        .is_err());
}

#[tokio::test]
async fn test_shop_catalog_filters() {
    let tmp = tempfile::tempdir().unwrap();
    let db = common::open_db(&tmp).await;
    let repo = ShopRepository::new(db.db);

    let mut salon = common::shop(2, "Glow Salon");
    salon.category = ShopCategory::HairSalon;
    salon.price_tier = Some(3);
    salon.is_editors_choice = true;
    let mut closed = common::shop(3, "Closed Cuts");
    closed.is_operational = false;

    repo.upsert(common::shop(1, "Cuts Inc")).await.unwrap();
    repo.upsert(salon).await.unwrap();
    repo.upsert(closed).await.unwrap();

    let open = repo.find_matching(&ShopFilter::operational()).await.unwrap();
    assert_eq!(open.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1, 2]);

    let all = repo
        .find_matching(&ShopFilter {
            include_closed: true,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(all.len(), 3);

    let salons = repo
        .find_matching(&ShopFilter {
            category: Some(ShopCategory::HairSalon),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(salons.len(), 1);
    assert_eq!(salons[0].id, 2);

    let tiers = repo
        .find_matching(&ShopFilter {
            price_tiers: vec![2],
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(tiers.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1]);

    let picks = repo
        .find_matching(&ShopFilter {
            editors_choice: Some(true),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(picks.len(), 1);

    let by_name = repo
        .find_matching(&ShopFilter {
            name: Some(NameMatch::InLocale(Locale::En, "CUTS".into())),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_name.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1]);

    let by_ids = repo.find_by_ids(&[2, 3, 99]).await.unwrap();
    assert_eq!(by_ids.len(), 2);
    assert!(repo.find_by_id(99).await.unwrap().is_none());
    assert_eq!(repo.find_by_id(1).await.unwrap().unwrap().name.en, "Cuts Inc");
}
