//! Request Handlers

pub mod engagements;
pub mod farcaster;
pub mod frame;
pub mod generate;
pub mod health;
pub mod marketplace;
pub mod memes;
pub mod rewards;
pub mod templates;
pub mod trends;
pub mod users;

pub use engagements::*;
pub use farcaster::*;
pub use frame::*;
pub use generate::*;
pub use health::*;
pub use marketplace::*;
pub use memes::*;
pub use rewards::*;
pub use templates::*;
pub use trends::*;
pub use users::*;
