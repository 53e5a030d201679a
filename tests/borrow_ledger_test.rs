use chrono::NaiveDate;
use libris::db;
use libris::domain::DomainError;
use libris::models::{book, borrow_item, borrow_request, category, user};
use libris::services::borrow_service;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};

// Helper to create a test database
async fn setup_test_db() -> DatabaseConnection {
    // In-memory SQLite for testing
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

async fn create_test_category(db: &DatabaseConnection) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let category = category::ActiveModel {
        name: Set("Fiction".to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    category.insert(db).await.expect("Failed to create category").id
}

async fn create_test_book(
    db: &DatabaseConnection,
    title: &str,
    copies: i32,
    category_id: i32,
) -> book::Model {
    let now = chrono::Utc::now().to_rfc3339();
    let book = book::ActiveModel {
        title: Set(title.to_string()),
        author: Set("Author".to_string()),
        publisher: Set(None),
        publication_year: Set(Some(2000)),
        total_copies: Set(copies),
        copies_out: Set(0),
        total_borrow_count: Set(0),
        is_active: Set(true),
        category_id: Set(category_id),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    book.insert(db).await.expect("Failed to create book")
}

async fn create_test_reader(db: &DatabaseConnection, username: &str) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let user = user::ActiveModel {
        username: Set(username.to_string()),
        phone: Set(None),
        birth_year: Set(Some(1990)),
        role: Set("reader".to_string()),
        is_staff: Set(true),
        is_superuser: Set(false),
        is_active: Set(true),
        borrowed_count: Set(0),
        returned_count: Set(0),
        overdue_count: Set(0),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    user.insert(db).await.expect("Failed to create user").id
}

async fn create_test_request(
    db: &DatabaseConnection,
    reader_id: i32,
    borrow_date: &str,
    expected_return_date: &str,
) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let request = borrow_request::ActiveModel {
        reader_id: Set(reader_id),
        borrow_date: Set(borrow_date.to_string()),
        expected_return_date: Set(expected_return_date.to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    request.insert(db).await.expect("Failed to create request").id
}

async fn fetch_book(db: &DatabaseConnection, id: i32) -> book::Model {
    book::Entity::find_by_id(id)
        .one(db)
        .await
        .expect("query failed")
        .expect("book missing")
}

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[tokio::test]
async fn create_request_rejects_malformed_dates() {
    let db = setup_test_db().await;
    let reader_id = create_test_reader(&db, "reader1").await;

    // A request with an unparseable window could never be settled later,
    // so it must not be persisted at all.
    let err = borrow_service::create_request(&db, reader_id, None, "next tuesday".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let err = borrow_service::create_request(
        &db,
        reader_id,
        Some("not-a-date".to_string()),
        "2024-03-10".to_string(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    assert_eq!(borrow_request::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn create_request_rejects_unknown_reader() {
    let db = setup_test_db().await;
    let err = borrow_service::create_request(&db, 999, None, "2024-03-10".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn create_request_normalizes_dates_and_settles() {
    let db = setup_test_db().await;
    let category_id = create_test_category(&db).await;
    let book = create_test_book(&db, "Dune", 1, category_id).await;
    let reader_id = create_test_reader(&db, "reader1").await;

    let request = borrow_service::create_request(
        &db,
        reader_id,
        Some("2024-3-1".to_string()),
        "2024-3-10".to_string(),
    )
    .await
    .expect("create request failed");
    assert_eq!(request.borrow_date, "2024-03-01");
    assert_eq!(request.expected_return_date, "2024-03-10");

    let item = borrow_service::create_borrow_item(&db, request.id, Some(book.id), None)
        .await
        .unwrap();
    let updated = borrow_service::record_return(&db, item.id, d("2024-03-12"))
        .await
        .expect("return failed");
    assert_eq!(updated.status, "late");
    assert_eq!(updated.fine, Some(6000));
}

#[tokio::test]
async fn checkout_moves_exactly_one_copy() {
    let db = setup_test_db().await;
    let category_id = create_test_category(&db).await;
    let book = create_test_book(&db, "Dune", 3, category_id).await;
    let reader_id = create_test_reader(&db, "reader1").await;
    let request_id = create_test_request(&db, reader_id, "2024-03-01", "2024-03-10").await;

    let item = borrow_service::create_borrow_item(&db, request_id, Some(book.id), None)
        .await
        .expect("create item failed");

    assert_eq!(item.status, "borrowed");
    assert_eq!(item.book_id, Some(book.id));
    assert!(item.actual_return_date.is_none());

    let book = fetch_book(&db, book.id).await;
    assert_eq!(book.total_copies, 2);
    assert_eq!(book.copies_out, 1);
    assert_eq!(book.total_borrow_count, 1);
}

#[tokio::test]
async fn create_item_rejects_bad_refs() {
    let db = setup_test_db().await;
    let err = borrow_service::create_borrow_item(&db, 999, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn zero_capacity_creation_leaves_counters_alone() {
    // The source never hard-blocked creation against an empty shelf; the
    // item appears and the counters stay put.
    let db = setup_test_db().await;
    let category_id = create_test_category(&db).await;
    let book = create_test_book(&db, "Dune", 0, category_id).await;
    let reader_id = create_test_reader(&db, "reader1").await;
    let request_id = create_test_request(&db, reader_id, "2024-03-01", "2024-03-10").await;

    let item = borrow_service::create_borrow_item(&db, request_id, Some(book.id), None)
        .await
        .expect("create item failed");
    assert_eq!(item.status, "borrowed");

    let book = fetch_book(&db, book.id).await;
    assert_eq!(book.total_copies, 0);
    assert_eq!(book.copies_out, 0);
    assert_eq!(book.total_borrow_count, 0);
}

#[tokio::test]
async fn on_time_return_has_no_fine() {
    let db = setup_test_db().await;
    let category_id = create_test_category(&db).await;
    let book = create_test_book(&db, "Dune", 1, category_id).await;
    let reader_id = create_test_reader(&db, "reader1").await;
    let request_id = create_test_request(&db, reader_id, "2024-03-01", "2024-03-10").await;

    let item = borrow_service::create_borrow_item(&db, request_id, Some(book.id), None)
        .await
        .unwrap();

    let updated = borrow_service::record_return(&db, item.id, d("2024-03-10"))
        .await
        .expect("return failed");

    assert_eq!(updated.status, "returned");
    assert_eq!(updated.fine, None);
    assert_eq!(updated.actual_return_date.as_deref(), Some("2024-03-10"));

    // Availability credited back
    let book = fetch_book(&db, book.id).await;
    assert_eq!(book.total_copies, 1);
    assert_eq!(book.copies_out, 0);
    assert_eq!(book.total_borrow_count, 1);
}

#[tokio::test]
async fn five_days_late_costs_15000() {
    let db = setup_test_db().await;
    let category_id = create_test_category(&db).await;
    let book = create_test_book(&db, "Dune", 1, category_id).await;
    let reader_id = create_test_reader(&db, "reader1").await;
    let request_id = create_test_request(&db, reader_id, "2024-03-01", "2024-03-10").await;

    let item = borrow_service::create_borrow_item(&db, request_id, Some(book.id), None)
        .await
        .unwrap();

    let updated = borrow_service::record_return(&db, item.id, d("2024-03-15"))
        .await
        .expect("return failed");

    assert_eq!(updated.status, "late");
    assert_eq!(updated.fine, Some(15000));

    // The book is credited back even on a late return
    let book = fetch_book(&db, book.id).await;
    assert_eq!(book.total_copies, 1);
    assert_eq!(book.copies_out, 0);
}

#[tokio::test]
async fn double_return_is_rejected() {
    let db = setup_test_db().await;
    let category_id = create_test_category(&db).await;
    let book = create_test_book(&db, "Dune", 1, category_id).await;
    let reader_id = create_test_reader(&db, "reader1").await;
    let request_id = create_test_request(&db, reader_id, "2024-03-01", "2024-03-10").await;

    let item = borrow_service::create_borrow_item(&db, request_id, Some(book.id), None)
        .await
        .unwrap();
    borrow_service::record_return(&db, item.id, d("2024-03-15"))
        .await
        .unwrap();

    let err = borrow_service::record_return(&db, item.id, d("2024-03-16"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));

    // Counters untouched by the rejected call
    let book = fetch_book(&db, book.id).await;
    assert_eq!(book.total_copies, 1);
    assert_eq!(book.copies_out, 0);
}

#[tokio::test]
async fn returning_missing_item_is_not_found() {
    let db = setup_test_db().await;
    let err = borrow_service::record_return(&db, 42, d("2024-03-15"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound));
}

#[tokio::test]
async fn orphaned_item_still_settles() {
    // Hard-deleting the book leaves the line item without book identity;
    // the return still computes status and fine.
    let db = setup_test_db().await;
    let category_id = create_test_category(&db).await;
    let book = create_test_book(&db, "Dune", 1, category_id).await;
    let reader_id = create_test_reader(&db, "reader1").await;
    let request_id = create_test_request(&db, reader_id, "2024-03-01", "2024-03-10").await;

    let item = borrow_service::create_borrow_item(&db, request_id, Some(book.id), None)
        .await
        .unwrap();

    book::Entity::delete_by_id(book.id)
        .exec(&db)
        .await
        .expect("hard delete failed");

    let updated = borrow_service::record_return(&db, item.id, d("2024-03-12"))
        .await
        .expect("return failed");
    assert_eq!(updated.status, "late");
    assert_eq!(updated.fine, Some(6000));
}

#[tokio::test]
async fn delete_request_with_only_open_items_removes_both() {
    let db = setup_test_db().await;
    let category_id = create_test_category(&db).await;
    let book = create_test_book(&db, "Dune", 1, category_id).await;
    let reader_id = create_test_reader(&db, "reader1").await;
    let request_id = create_test_request(&db, reader_id, "2024-03-01", "2024-03-10").await;

    borrow_service::create_borrow_item(&db, request_id, Some(book.id), None)
        .await
        .unwrap();

    borrow_service::delete_borrow_request(&db, request_id)
        .await
        .expect("delete failed");

    assert!(borrow_request::Entity::find_by_id(request_id)
        .one(&db)
        .await
        .unwrap()
        .is_none());
    let remaining = borrow_item::Entity::find()
        .filter(borrow_item::Column::RequestId.eq(request_id))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn delete_request_with_returned_child_is_blocked() {
    let db = setup_test_db().await;
    let category_id = create_test_category(&db).await;
    let book = create_test_book(&db, "Dune", 1, category_id).await;
    let reader_id = create_test_reader(&db, "reader1").await;
    let request_id = create_test_request(&db, reader_id, "2024-03-01", "2024-03-10").await;

    let item = borrow_service::create_borrow_item(&db, request_id, Some(book.id), None)
        .await
        .unwrap();
    borrow_service::record_return(&db, item.id, d("2024-03-09"))
        .await
        .unwrap();

    let err = borrow_service::delete_borrow_request(&db, request_id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));

    // Nothing was mutated
    assert!(borrow_request::Entity::find_by_id(request_id)
        .one(&db)
        .await
        .unwrap()
        .is_some());
    assert!(borrow_item::Entity::find_by_id(item.id)
        .one(&db)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn bulk_borrow_is_all_or_nothing() {
    let db = setup_test_db().await;
    let category_id = create_test_category(&db).await;
    let available = create_test_book(&db, "Dune", 1, category_id).await;
    let exhausted = create_test_book(&db, "Foundation", 0, category_id).await;
    let reader_id = create_test_reader(&db, "reader1").await;

    let err = borrow_service::bulk_borrow(&db, reader_id, &[available.id, exhausted.id])
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));

    // Rolled back: first book untouched, no line items or requests exist
    let book = fetch_book(&db, available.id).await;
    assert_eq!(book.total_copies, 1);
    assert_eq!(book.copies_out, 0);
    assert_eq!(book.total_borrow_count, 0);
    assert_eq!(borrow_item::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(borrow_request::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn bulk_borrow_creates_one_request_with_week_window() {
    let db = setup_test_db().await;
    let category_id = create_test_category(&db).await;
    let a = create_test_book(&db, "Dune", 2, category_id).await;
    let b = create_test_book(&db, "Foundation", 1, category_id).await;
    let reader_id = create_test_reader(&db, "reader1").await;

    let borrowed = borrow_service::bulk_borrow(&db, reader_id, &[a.id, b.id])
        .await
        .expect("bulk borrow failed");
    assert_eq!(borrowed.len(), 2);

    let requests = borrow_request::Entity::find().all(&db).await.unwrap();
    assert_eq!(requests.len(), 1);

    let today = chrono::Local::now().date_naive();
    let expected = (today + chrono::Duration::days(7)).format("%Y-%m-%d").to_string();
    assert_eq!(requests[0].expected_return_date, expected);
    assert_eq!(requests[0].reader_id, reader_id);

    assert_eq!(borrow_item::Entity::find().count(&db).await.unwrap(), 2);
    let a = fetch_book(&db, a.id).await;
    assert_eq!(a.total_copies, 1);
    assert_eq!(a.copies_out, 1);
}

#[tokio::test]
async fn bulk_borrow_of_nothing_creates_nothing() {
    let db = setup_test_db().await;
    let reader_id = create_test_reader(&db, "reader1").await;

    let borrowed = borrow_service::bulk_borrow(&db, reader_id, &[])
        .await
        .expect("bulk borrow failed");
    assert!(borrowed.is_empty());
    assert_eq!(borrow_request::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn bulk_return_skips_foreign_and_settled_items() {
    let db = setup_test_db().await;
    let category_id = create_test_category(&db).await;
    let mine = create_test_book(&db, "Dune", 1, category_id).await;
    let theirs = create_test_book(&db, "Foundation", 1, category_id).await;
    let reader_id = create_test_reader(&db, "reader1").await;
    let other_id = create_test_reader(&db, "reader2").await;

    let my_request = create_test_request(&db, reader_id, "2024-03-01", "2099-01-01").await;
    let their_request = create_test_request(&db, other_id, "2024-03-01", "2099-01-01").await;

    let my_item = borrow_service::create_borrow_item(&db, my_request, Some(mine.id), None)
        .await
        .unwrap();
    let their_item = borrow_service::create_borrow_item(&db, their_request, Some(theirs.id), None)
        .await
        .unwrap();

    let returned = borrow_service::bulk_return(&db, reader_id, &[my_item.id, their_item.id, 999])
        .await
        .expect("bulk return failed");
    assert_eq!(returned.len(), 1);
    assert_eq!(returned[0].id, mine.id);

    let my_item = borrow_item::Entity::find_by_id(my_item.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(my_item.status, "returned");

    // The other reader's item is untouched
    let their_item = borrow_item::Entity::find_by_id(their_item.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(their_item.status, "borrowed");
    assert!(their_item.actual_return_date.is_none());
}
