use sea_orm::entity::prelude::*;
use sea_orm::{NotSet, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub publication_year: Option<i32>,
    /// Copies currently on the shelf. Decremented on checkout, credited back
    /// on return.
    pub total_copies: i32,
    /// Copies currently out with readers.
    pub copies_out: i32,
    pub total_borrow_count: i32,
    pub is_active: bool,
    pub category_id: i32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Category,
    #[sea_orm(has_many = "super::borrow_item::Entity")]
    BorrowItems,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::borrow_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BorrowItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// DTO for create/update payloads
#[derive(Debug, Serialize, Deserialize)]
pub struct BookDto {
    pub id: Option<i32>,
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub publication_year: Option<i32>,
    pub total_copies: i32,
    pub category_id: i32,
}

impl From<BookDto> for ActiveModel {
    fn from(dto: BookDto) -> Self {
        Self {
            id: dto.id.map_or(NotSet, Set),
            title: Set(dto.title),
            author: Set(dto.author),
            publisher: Set(dto.publisher),
            publication_year: Set(dto.publication_year),
            total_copies: Set(dto.total_copies),
            copies_out: NotSet,
            total_borrow_count: NotSet,
            is_active: Set(true),
            category_id: Set(dto.category_id),
            created_at: NotSet,
            updated_at: NotSet,
        }
    }
}
