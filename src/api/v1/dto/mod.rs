pub mod queries;
pub mod records;
