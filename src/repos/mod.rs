pub mod error;
pub mod namespace;
pub mod record_repo;
pub mod records;
