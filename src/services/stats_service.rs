//! Statistics Engine - read-only aggregations over the ledger and catalog.
//!
//! Reports never fail on an empty store; they return empty vectors or
//! zeroes. Grouping is done in memory after a filtered fetch, the same way
//! the rest of the codebase enriches rows with related titles.

use std::collections::HashMap;

use chrono::{Datelike, Local};
use sea_orm::*;
use serde::Serialize;

use crate::domain::DomainError;
use crate::models::book::{self, Entity as Book};
use crate::models::borrow_item::{
    self, Entity as BorrowItem, STATUS_BORROWED, STATUS_LATE, STATUS_RETURNED,
};
use crate::models::borrow_request::{self, Entity as BorrowRequest};
use crate::models::comment::Entity as Comment;
use crate::models::like::Entity as Like;
use crate::models::user::Entity as User;

#[derive(Debug, Serialize)]
pub struct AgeBucket {
    pub age: i32,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct BookCount {
    pub title: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct MonthlyActivity {
    pub year: i32,
    pub month: u32,
    pub borrowed: i64,
    pub returned: i64,
    pub late: i64,
}

#[derive(Debug, Serialize)]
pub struct FilteredItem {
    pub title: String,
    pub status: String,
    pub actual_return_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InteractionTotals {
    pub total_likes: i64,
    pub total_comments: i64,
    pub combined_total: i64,
}

pub fn validate_month_year(month: u32, year: i32) -> Result<(), DomainError> {
    if !(1..=12).contains(&month) {
        return Err(DomainError::Validation(
            "invalid month, must be between 1 and 12".to_string(),
        ));
    }
    let current_year = Local::now().year();
    if !(1900..=current_year).contains(&year) {
        return Err(DomainError::Validation("invalid year".to_string()));
    }
    Ok(())
}

/// Half-open `[first of month, first of next month)` window as %Y-%m-%d
/// strings. Zero-padded dates compare correctly as text.
fn month_window(year: i32, month: u32) -> (String, String) {
    let start = format!("{:04}-{:02}-01", year, month);
    let end = if month < 12 {
        format!("{:04}-{:02}-01", year, month + 1)
    } else {
        format!("{:04}-01-01", year + 1)
    };
    (start, end)
}

async fn book_titles(
    db: &DatabaseConnection,
    book_ids: Vec<i32>,
) -> Result<HashMap<i32, String>, DomainError> {
    let mut titles = HashMap::new();
    if !book_ids.is_empty() {
        for book in Book::find()
            .filter(book::Column::Id.is_in(book_ids))
            .all(db)
            .await?
        {
            titles.insert(book.id, book.title);
        }
    }
    Ok(titles)
}

/// Turn a book_id -> count map into a titled, descending report.
async fn ranked_counts(
    db: &DatabaseConnection,
    counts: HashMap<i32, i64>,
    limit: usize,
) -> Result<Vec<BookCount>, DomainError> {
    let titles = book_titles(db, counts.keys().copied().collect()).await?;

    let mut result: Vec<BookCount> = counts
        .into_iter()
        .map(|(book_id, count)| BookCount {
            title: titles
                .get(&book_id)
                .cloned()
                .unwrap_or_else(|| "Unknown".to_string()),
            count,
        })
        .collect();

    result.sort_by(|a, b| b.count.cmp(&a.count).then(a.title.cmp(&b.title)));
    result.truncate(limit);
    Ok(result)
}

/// Bucket users by age, skipping anyone without a birth year.
pub async fn age_distribution(db: &DatabaseConnection) -> Result<Vec<AgeBucket>, DomainError> {
    let current_year = Local::now().year();
    let mut buckets: HashMap<i32, i64> = HashMap::new();

    for user in User::find().all(db).await? {
        if let Some(birth_year) = user.birth_year {
            *buckets.entry(current_year - birth_year).or_default() += 1;
        }
    }

    let mut result: Vec<AgeBucket> = buckets
        .into_iter()
        .map(|(age, count)| AgeBucket { age, count })
        .collect();
    result.sort_by_key(|b| b.age);
    Ok(result)
}

/// Books most borrowed in a given month, by parent-request borrow date.
pub async fn most_borrowed_in_month(
    db: &DatabaseConnection,
    month: u32,
    year: i32,
) -> Result<Vec<BookCount>, DomainError> {
    validate_month_year(month, year)?;
    let (start, end) = month_window(year, month);

    let requests: Vec<borrow_request::Model> = BorrowRequest::find()
        .filter(borrow_request::Column::BorrowDate.gte(start))
        .filter(borrow_request::Column::BorrowDate.lt(end))
        .all(db)
        .await?;

    if requests.is_empty() {
        return Ok(vec![]);
    }

    let request_ids: Vec<i32> = requests.iter().map(|r| r.id).collect();
    let items = BorrowItem::find()
        .filter(borrow_item::Column::RequestId.is_in(request_ids))
        .all(db)
        .await?;

    let mut counts: HashMap<i32, i64> = HashMap::new();
    for item in items {
        if let Some(book_id) = item.book_id {
            *counts.entry(book_id).or_default() += 1;
        }
    }

    ranked_counts(db, counts, usize::MAX).await
}

/// Top 5 books by like count.
pub async fn top_by_likes(db: &DatabaseConnection) -> Result<Vec<BookCount>, DomainError> {
    let mut counts: HashMap<i32, i64> = HashMap::new();
    for like in Like::find().all(db).await? {
        *counts.entry(like.book_id).or_default() += 1;
    }
    ranked_counts(db, counts, 5).await
}

/// Top 5 books by comment count.
pub async fn top_by_comments(db: &DatabaseConnection) -> Result<Vec<BookCount>, DomainError> {
    let mut counts: HashMap<i32, i64> = HashMap::new();
    for comment in Comment::find().all(db).await? {
        *counts.entry(comment.book_id).or_default() += 1;
    }
    ranked_counts(db, counts, 5).await
}

/// Top 10 books by line-item count in the given status.
pub async fn top_by_status(
    db: &DatabaseConnection,
    status: &str,
) -> Result<Vec<BookCount>, DomainError> {
    let items = BorrowItem::find()
        .filter(borrow_item::Column::Status.eq(status))
        .all(db)
        .await?;

    let mut counts: HashMap<i32, i64> = HashMap::new();
    for item in items {
        if let Some(book_id) = item.book_id {
            *counts.entry(book_id).or_default() += 1;
        }
    }
    ranked_counts(db, counts, 10).await
}

/// Rolling 12-month borrow/return/late histogram, current month included.
/// Months with no activity in any counter are omitted; output ascends by
/// (year, month).
pub async fn monthly_activity(
    db: &DatabaseConnection,
) -> Result<Vec<MonthlyActivity>, DomainError> {
    let items = BorrowItem::find().all(db).await?;

    let mut borrow_dates: HashMap<i32, String> = HashMap::new();
    for request in BorrowRequest::find().all(db).await? {
        borrow_dates.insert(request.id, request.borrow_date);
    }

    let now = Local::now().date_naive();
    let mut year = now.year();
    let mut month = now.month();

    let mut result = Vec::new();
    for _ in 0..12 {
        let (start, end) = month_window(year, month);
        let in_window = |d: &str| *d >= *start && *d < *end;

        let mut borrowed = 0;
        let mut returned = 0;
        let mut late = 0;

        for item in &items {
            match item.status.as_str() {
                s if s == STATUS_BORROWED => {
                    if borrow_dates
                        .get(&item.request_id)
                        .is_some_and(|d| in_window(d))
                    {
                        borrowed += 1;
                    }
                }
                s if s == STATUS_RETURNED => {
                    if item.actual_return_date.as_deref().is_some_and(in_window) {
                        returned += 1;
                    }
                }
                s if s == STATUS_LATE => {
                    if item.actual_return_date.as_deref().is_some_and(in_window) {
                        late += 1;
                    }
                }
                _ => {}
            }
        }

        if borrowed > 0 || returned > 0 || late > 0 {
            result.push(MonthlyActivity {
                year,
                month,
                borrowed,
                returned,
                late,
            });
        }

        if month == 1 {
            month = 12;
            year -= 1;
        } else {
            month -= 1;
        }
    }

    result.sort_by_key(|m| (m.year, m.month));
    Ok(result)
}

/// Line items filtered by status and month of actual return.
///
/// For `borrowed` the month/year filter is deliberately ignored and every
/// open item comes back; that asymmetry is part of the contract.
pub async fn filter_items(
    db: &DatabaseConnection,
    status: &str,
    month: u32,
    year: i32,
) -> Result<Vec<FilteredItem>, DomainError> {
    validate_month_year(month, year)?;

    let items = if status == STATUS_BORROWED {
        BorrowItem::find()
            .filter(borrow_item::Column::Status.eq(STATUS_BORROWED))
            .filter(borrow_item::Column::ActualReturnDate.is_null())
            .all(db)
            .await?
    } else {
        let (start, end) = month_window(year, month);
        BorrowItem::find()
            .filter(borrow_item::Column::Status.eq(status))
            .filter(borrow_item::Column::ActualReturnDate.gte(start))
            .filter(borrow_item::Column::ActualReturnDate.lt(end))
            .all(db)
            .await?
    };

    let titles = book_titles(db, items.iter().filter_map(|i| i.book_id).collect()).await?;

    Ok(items
        .into_iter()
        .map(|item| FilteredItem {
            title: item
                .book_id
                .and_then(|id| titles.get(&id).cloned())
                .unwrap_or_else(|| "Unknown".to_string()),
            status: item.status,
            actual_return_date: item.actual_return_date,
        })
        .collect())
}

/// Combined like/comment totals across the catalog.
pub async fn total_interactions(
    db: &DatabaseConnection,
) -> Result<InteractionTotals, DomainError> {
    let total_likes = Like::find().count(db).await? as i64;
    let total_comments = Comment::find().count(db).await? as i64;

    Ok(InteractionTotals {
        total_likes,
        total_comments,
        combined_total: total_likes + total_comments,
    })
}
