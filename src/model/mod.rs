//! Win-probability model
//!
//! A logistic layer over (score margin, time remaining).

pub mod logistic;

pub use logistic::{WinProbConfig, WinProbModel};
