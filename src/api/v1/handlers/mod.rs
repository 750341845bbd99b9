pub mod fortune;
pub mod health;
pub mod houses;
