pub mod book;
pub mod borrow_item;
pub mod borrow_request;
pub mod category;
pub mod comment;
pub mod interaction;
pub mod like;
pub mod share;
pub mod user;

pub use interaction::Interaction;
