use sea_orm::*;

use crate::models::user::derive_access_flags;
use crate::models::{book, category, user};

/// Demo data for local development, behind SEED_DEMO. A non-empty catalog
/// means a previous run already seeded; nothing is inserted twice.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    if category::Entity::find().count(db).await? > 0 {
        tracing::info!("Catalog already seeded, skipping");
        return Ok(());
    }

    let now = chrono::Utc::now().to_rfc3339();

    let categories = vec!["Fiction", "Science", "History"];
    for name in &categories {
        let category = category::ActiveModel {
            name: Set((*name).to_owned()),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        };
        category.insert(db).await?;
    }

    let books = vec![
        ("Dune", "Frank Herbert", 1965, 4, 2),
        ("Foundation", "Isaac Asimov", 1951, 3, 2),
        ("A Brief History of Time", "Stephen Hawking", 1988, 2, 1),
    ];
    for (title, author, year, copies, category_id) in books {
        let book = book::ActiveModel {
            title: Set(title.to_owned()),
            author: Set(author.to_owned()),
            publisher: Set(None),
            publication_year: Set(Some(year)),
            total_copies: Set(copies),
            copies_out: Set(0),
            total_borrow_count: Set(0),
            is_active: Set(true),
            category_id: Set(category_id),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        };
        book.insert(db).await?;
    }

    let users = vec![
        ("librarian", "staff", Some(1985)),
        ("reader1", "reader", Some(1998)),
        ("reader2", "reader", None),
    ];
    for (username, role, birth_year) in users {
        let (is_staff, is_superuser) = derive_access_flags(role);
        let account = user::ActiveModel {
            username: Set(username.to_owned()),
            phone: Set(None),
            birth_year: Set(birth_year),
            role: Set(role.to_owned()),
            is_staff: Set(is_staff),
            is_superuser: Set(is_superuser),
            is_active: Set(true),
            borrowed_count: Set(0),
            returned_count: Set(0),
            overdue_count: Set(0),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        };
        user::Entity::insert(account)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(user::Column::Username)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(db)
            .await?;
    }

    Ok(())
}
