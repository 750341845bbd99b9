pub mod payload;
pub mod region;

pub use payload::Payload;
pub use region::RegionPath;
