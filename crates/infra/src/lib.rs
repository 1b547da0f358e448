//! Infrastructure layer: stores, database wiring, config.

pub mod config;
pub mod db;
pub mod store;
