pub mod client;
pub mod memory;
#[cfg(test)]
pub mod testing;
pub mod valkey;

pub use client::{DurableStore, StoreError};
pub use memory::InProcessStore;
pub use valkey::ValkeyStore;
