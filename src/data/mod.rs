//! Data ingestion and storage
//!
//! Play-by-play CSV reading, SQLite game-state storage, and the training
//! dataset built on top of it.

pub mod database;
pub mod dataset;
pub mod pbp;

pub use database::Database;
pub use dataset::StateDataset;
