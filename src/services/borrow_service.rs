//! Borrow Ledger - availability accounting, fines and deletion guards.
//!
//! Every mutation runs inside a single transaction: book counters, line
//! items and requests commit together or not at all.

use chrono::{Duration, Local, NaiveDate};
use sea_orm::*;

use crate::domain::DomainError;
use crate::models::book::{self, Entity as Book};
use crate::models::borrow_item::{
    self, Entity as BorrowItem, STATUS_BORROWED, STATUS_LATE, STATUS_RETURNED,
};
use crate::models::borrow_request::{self, Entity as BorrowRequest};
use crate::models::user::Entity as User;

/// Flat per-day penalty in currency minor units. Not compounding, not capped.
pub const FINE_PER_DAY: i64 = 3000;

/// Expected-return window used by bulk checkout.
pub const DEFAULT_LOAN_DAYS: i64 = 7;

pub const DATE_FMT: &str = "%Y-%m-%d";

fn now_ts() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn parse_date(s: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(s, DATE_FMT)
        .map_err(|e| DomainError::Validation(format!("invalid date '{}': {}", s, e)))
}

/// Lateness assessment for a return. Returns the new status and the fine,
/// if any.
pub fn assess_return(expected: NaiveDate, actual: NaiveDate) -> (&'static str, Option<i64>) {
    let days_late = (actual - expected).num_days();
    if days_late > 0 {
        (STATUS_LATE, Some(days_late * FINE_PER_DAY))
    } else {
        (STATUS_RETURNED, None)
    }
}

/// Checkout side effect on the book. The guard mirrors the source system:
/// with zero availability nothing changes, the caller decides whether that
/// is an error.
async fn apply_checkout<C: ConnectionTrait>(
    conn: &C,
    book: book::Model,
) -> Result<book::Model, DomainError> {
    if book.total_copies <= 0 {
        return Ok(book);
    }

    let total_copies = book.total_copies - 1;
    let copies_out = book.copies_out + 1;
    let total_borrow_count = book.total_borrow_count + 1;

    let mut active: book::ActiveModel = book.into();
    active.total_copies = Set(total_copies);
    active.copies_out = Set(copies_out);
    active.total_borrow_count = Set(total_borrow_count);
    active.updated_at = Set(now_ts());

    Ok(active.update(conn).await?)
}

/// Return side effect on the book: availability credited back whether the
/// return was on time or late.
async fn apply_return<C: ConnectionTrait>(
    conn: &C,
    book: book::Model,
) -> Result<book::Model, DomainError> {
    if book.copies_out <= 0 {
        return Ok(book);
    }

    let total_copies = book.total_copies + 1;
    let copies_out = book.copies_out - 1;

    let mut active: book::ActiveModel = book.into();
    active.total_copies = Set(total_copies);
    active.copies_out = Set(copies_out);
    active.updated_at = Set(now_ts());

    Ok(active.update(conn).await?)
}

async fn insert_item<C: ConnectionTrait>(
    conn: &C,
    request_id: i32,
    book_id: Option<i32>,
    note: Option<String>,
) -> Result<borrow_item::Model, DomainError> {
    let now = now_ts();
    let item = borrow_item::ActiveModel {
        request_id: Set(request_id),
        book_id: Set(book_id),
        status: Set(STATUS_BORROWED.to_owned()),
        actual_return_date: Set(None),
        fine: Set(None),
        note: Set(note),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(item.insert(conn).await?)
}

/// Create a borrow request after validating the reader and both dates.
///
/// Dates are parsed and re-rendered so only zero-padded `%Y-%m-%d` ever
/// reaches storage; later window comparisons rely on that.
pub async fn create_request(
    db: &DatabaseConnection,
    reader_id: i32,
    borrow_date: Option<String>,
    expected_return_date: String,
) -> Result<borrow_request::Model, DomainError> {
    let borrow_date = match borrow_date {
        Some(s) => parse_date(&s)?,
        None => Local::now().date_naive(),
    };
    let expected = parse_date(&expected_return_date)?;

    User::find_by_id(reader_id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::Validation("invalid reader id".to_string()))?;

    let now = now_ts();
    let request = borrow_request::ActiveModel {
        reader_id: Set(reader_id),
        borrow_date: Set(borrow_date.format(DATE_FMT).to_string()),
        expected_return_date: Set(expected.format(DATE_FMT).to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(request.insert(db).await?)
}

/// Create a borrow line item in `borrowed` state.
///
/// Bad request/book references are a validation failure. The zero-capacity
/// case is deliberately not blocked: the item is created and the book
/// counters stay untouched, exactly as the source system behaved.
pub async fn create_borrow_item(
    db: &DatabaseConnection,
    request_id: i32,
    book_id: Option<i32>,
    note: Option<String>,
) -> Result<borrow_item::Model, DomainError> {
    let txn = db.begin().await?;

    BorrowRequest::find_by_id(request_id)
        .one(&txn)
        .await?
        .ok_or_else(|| DomainError::Validation("invalid borrow request id".to_string()))?;

    let book = match book_id {
        Some(id) => Some(
            Book::find_by_id(id)
                .one(&txn)
                .await?
                .ok_or_else(|| DomainError::Validation("invalid book id".to_string()))?,
        ),
        None => None,
    };

    let item = insert_item(&txn, request_id, book_id, note).await?;

    if let Some(book) = book {
        apply_checkout(&txn, book).await?;
    }

    txn.commit().await?;
    Ok(item)
}

/// Record the actual return date on a line item and settle the fine.
///
/// A second return on the same item is rejected; the source recomputed the
/// fine against an already-credited counter, which was a defect.
pub async fn record_return(
    db: &DatabaseConnection,
    item_id: i32,
    actual_date: NaiveDate,
) -> Result<borrow_item::Model, DomainError> {
    let txn = db.begin().await?;

    let item = BorrowItem::find_by_id(item_id)
        .one(&txn)
        .await?
        .ok_or(DomainError::NotFound)?;

    if item.actual_return_date.is_some() {
        return Err(DomainError::Conflict(
            "line item is already returned".to_string(),
        ));
    }

    let request = BorrowRequest::find_by_id(item.request_id)
        .one(&txn)
        .await?
        .ok_or(DomainError::NotFound)?;

    let expected = parse_date(&request.expected_return_date)?;
    let (status, fine) = assess_return(expected, actual_date);

    let book_id = item.book_id;
    let mut active: borrow_item::ActiveModel = item.into();
    active.actual_return_date = Set(Some(actual_date.format(DATE_FMT).to_string()));
    active.status = Set(status.to_owned());
    active.fine = Set(fine);
    active.updated_at = Set(now_ts());
    let updated = active.update(&txn).await?;

    // Credit the book back regardless of lateness. A hard-deleted book
    // leaves the item orphaned and there is nothing to credit.
    if let Some(book_id) = book_id {
        if let Some(book) = Book::find_by_id(book_id).one(&txn).await? {
            apply_return(&txn, book).await?;
        }
    }

    txn.commit().await?;
    Ok(updated)
}

/// Delete a borrow request and its line items, unless any item has already
/// been returned or gone late.
pub async fn delete_borrow_request(
    db: &DatabaseConnection,
    request_id: i32,
) -> Result<(), DomainError> {
    let txn = db.begin().await?;

    BorrowRequest::find_by_id(request_id)
        .one(&txn)
        .await?
        .ok_or(DomainError::NotFound)?;

    let settled = BorrowItem::find()
        .filter(borrow_item::Column::RequestId.eq(request_id))
        .filter(borrow_item::Column::Status.is_in([STATUS_RETURNED, STATUS_LATE]))
        .count(&txn)
        .await?;

    if settled > 0 {
        return Err(DomainError::Conflict(
            "request has line items that are returned or late".to_string(),
        ));
    }

    BorrowItem::delete_many()
        .filter(borrow_item::Column::RequestId.eq(request_id))
        .exec(&txn)
        .await?;

    BorrowRequest::delete_by_id(request_id).exec(&txn).await?;

    txn.commit().await?;
    Ok(())
}

/// Borrow a batch of books for a reader, all or nothing.
///
/// The first missing or unavailable book aborts the whole batch; the
/// transaction rollback restores every counter touched so far.
pub async fn bulk_borrow(
    db: &DatabaseConnection,
    reader_id: i32,
    book_ids: &[i32],
) -> Result<Vec<book::Model>, DomainError> {
    if book_ids.is_empty() {
        return Ok(vec![]);
    }

    let txn = db.begin().await?;

    let today = Local::now().date_naive();
    let expected = (today + Duration::days(DEFAULT_LOAN_DAYS))
        .format(DATE_FMT)
        .to_string();

    // One request per batch, reused across books (and across calls landing
    // on the same reader/window). A failed batch rolls it back with the rest.
    let existing = BorrowRequest::find()
        .filter(borrow_request::Column::ReaderId.eq(reader_id))
        .filter(borrow_request::Column::ExpectedReturnDate.eq(expected.clone()))
        .one(&txn)
        .await?;
    let request = match existing {
        Some(r) => r,
        None => {
            let now = now_ts();
            let new_request = borrow_request::ActiveModel {
                reader_id: Set(reader_id),
                borrow_date: Set(today.format(DATE_FMT).to_string()),
                expected_return_date: Set(expected),
                created_at: Set(now.clone()),
                updated_at: Set(now),
                ..Default::default()
            };
            new_request.insert(&txn).await?
        }
    };

    let mut borrowed = Vec::with_capacity(book_ids.len());
    for &book_id in book_ids {
        let book = Book::find_by_id(book_id)
            .one(&txn)
            .await?
            .ok_or(DomainError::NotFound)?;

        if book.total_copies <= 0 {
            return Err(DomainError::Conflict(format!(
                "{} is not available for borrowing",
                book.title
            )));
        }

        insert_item(&txn, request.id, Some(book.id), None).await?;
        let book = apply_checkout(&txn, book).await?;
        borrowed.push(book);
    }

    txn.commit().await?;
    Ok(borrowed)
}

/// Return a batch of line items for a reader.
///
/// Items that are missing, owned by someone else or no longer in `borrowed`
/// state are silently skipped, never errored.
pub async fn bulk_return(
    db: &DatabaseConnection,
    reader_id: i32,
    item_ids: &[i32],
) -> Result<Vec<book::Model>, DomainError> {
    let txn = db.begin().await?;

    let today = Local::now().date_naive();
    let mut returned = Vec::new();

    for &item_id in item_ids {
        let item = match BorrowItem::find_by_id(item_id).one(&txn).await? {
            Some(item) => item,
            None => continue,
        };

        if item.status != STATUS_BORROWED {
            continue;
        }

        let request = match BorrowRequest::find_by_id(item.request_id).one(&txn).await? {
            Some(r) => r,
            None => continue,
        };

        if request.reader_id != reader_id {
            continue;
        }

        let expected = parse_date(&request.expected_return_date)?;
        let (status, fine) = assess_return(expected, today);

        let book_id = item.book_id;
        let mut active: borrow_item::ActiveModel = item.into();
        active.actual_return_date = Set(Some(today.format(DATE_FMT).to_string()));
        active.status = Set(status.to_owned());
        active.fine = Set(fine);
        active.updated_at = Set(now_ts());
        active.update(&txn).await?;

        if let Some(book_id) = book_id {
            if let Some(book) = Book::find_by_id(book_id).one(&txn).await? {
                let book = apply_return(&txn, book).await?;
                returned.push(book);
            }
        }
    }

    txn.commit().await?;
    Ok(returned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FMT).unwrap()
    }

    #[test]
    fn on_time_return_has_no_fine() {
        assert_eq!(
            assess_return(d("2024-03-10"), d("2024-03-10")),
            (STATUS_RETURNED, None)
        );
        assert_eq!(
            assess_return(d("2024-03-10"), d("2024-03-01")),
            (STATUS_RETURNED, None)
        );
    }

    #[test]
    fn late_return_pays_flat_per_day() {
        assert_eq!(
            assess_return(d("2024-03-10"), d("2024-03-11")),
            (STATUS_LATE, Some(FINE_PER_DAY))
        );
        assert_eq!(
            assess_return(d("2024-03-10"), d("2024-03-15")),
            (STATUS_LATE, Some(5 * FINE_PER_DAY))
        );
    }
}
