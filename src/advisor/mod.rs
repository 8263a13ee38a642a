pub mod advisor;
pub mod snapshot;

pub use advisor::*;
pub use snapshot::*;
