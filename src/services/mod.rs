pub mod clock;
pub mod factory;
pub mod fallback;
pub mod fetch;
pub mod keys;
pub mod period;
pub mod repair;
pub mod secret;
pub mod store;
#[cfg(test)]
pub mod testkit;
pub mod write;

pub use factory::{Engines, build_engines};
