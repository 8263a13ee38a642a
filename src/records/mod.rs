pub mod ledger;
pub use ledger::*;

pub mod query;
pub use query::*;

pub mod record;
pub use record::*;

pub mod stats;
pub use stats::*;
