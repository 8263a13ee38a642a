pub mod lead;
pub mod report;
pub mod search;
pub mod spot;
pub mod tree;

pub use lead::*;
pub use report::*;
pub use search::*;
pub use spot::*;
pub use tree::*;
