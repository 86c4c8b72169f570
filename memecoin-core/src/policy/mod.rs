//! Reward Policy
//!
//! The fixed rule table and the pure evaluation that turns a reward event
//! plus current recipient state into an amount and a reason. No I/O here;
//! reading state and persisting the credit belong to the settlement engine.

mod evaluator;
mod events;
pub mod rules;

pub use evaluator::{evaluate, RewardDecision};
pub use events::RewardEvent;
