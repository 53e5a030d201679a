use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub username: String,
    pub phone: Option<String>,
    pub birth_year: Option<i32>,
    pub role: String, // 'staff', 'reader'
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    // Declared in the source schema but never maintained by any code path.
    pub borrowed_count: i32,
    pub returned_count: i32,
    pub overdue_count: i32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::borrow_request::Entity")]
    BorrowRequests,
}

impl Related<super::borrow_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BorrowRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub const ROLE_STAFF: &str = "staff";
pub const ROLE_READER: &str = "reader";

/// Access flags derived from the role on every save. Readers count as staff
/// but never as superusers.
pub fn derive_access_flags(role: &str) -> (bool, bool) {
    if role == ROLE_STAFF {
        (true, true)
    } else {
        (true, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_gets_both_flags() {
        assert_eq!(derive_access_flags(ROLE_STAFF), (true, true));
    }

    #[test]
    fn reader_is_staff_but_not_superuser() {
        assert_eq!(derive_access_flags(ROLE_READER), (true, false));
        assert_eq!(derive_access_flags("anything-else"), (true, false));
    }
}
