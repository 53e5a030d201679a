use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "borrow_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub reader_id: i32,
    pub borrow_date: String,          // %Y-%m-%d
    pub expected_return_date: String, // %Y-%m-%d
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ReaderId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Reader,
    #[sea_orm(has_many = "super::borrow_item::Entity")]
    Items,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reader.def()
    }
}

impl Related<super::borrow_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Serialize, Deserialize)]
pub struct BorrowRequestDto {
    pub reader_id: i32,
    pub borrow_date: Option<String>,
    pub expected_return_date: String,
}
