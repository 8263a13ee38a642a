pub mod cache;
pub mod judge;

pub use cache::*;
pub use judge::*;
