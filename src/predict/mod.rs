//! Prediction and replay
//!
//! Load the trained model, answer point queries, and stream stored games
//! into win-probability curves.

pub mod inference;
pub mod replay;

pub use inference::Predictor;
pub use replay::{replay_game, ReplayPoint};
