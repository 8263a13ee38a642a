pub mod board;
pub use board::*;

pub mod card;
pub use card::*;

pub mod hole;
pub use hole::*;

pub mod pile;
pub use pile::*;

pub mod rank;
pub use rank::*;

pub mod rankings;
pub use rankings::*;

pub mod rollout;
pub use rollout::*;

pub mod suit;
pub use suit::*;
