use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "borrow_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub request_id: i32,
    /// NULL once the book has been hard-deleted; the line item survives
    /// without book identity.
    pub book_id: Option<i32>,
    pub status: String, // 'borrowed', 'returned', 'late'
    pub actual_return_date: Option<String>, // %Y-%m-%d
    /// Fine in currency minor units, set only on late returns.
    pub fine: Option<i64>,
    pub note: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::borrow_request::Entity",
        from = "Column::RequestId",
        to = "super::borrow_request::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Request,
    #[sea_orm(
        belongs_to = "super::book::Entity",
        from = "Column::BookId",
        to = "super::book::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Book,
}

impl Related<super::borrow_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Request.def()
    }
}

impl Related<super::book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Book.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub const STATUS_BORROWED: &str = "borrowed";
pub const STATUS_RETURNED: &str = "returned";
pub const STATUS_LATE: &str = "late";
