pub mod action;
pub use action::*;

pub mod code;
pub use code::*;

pub mod game;
pub use game::*;

pub mod phase;
pub use phase::*;

pub mod ply;
pub use ply::*;

pub mod seat;
pub use seat::*;

pub mod table;
pub use table::*;
