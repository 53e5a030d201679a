pub mod borrow_service;
pub mod stats_service;
