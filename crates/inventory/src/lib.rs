//! `sweetshop-inventory`: the sweet catalog and its stock.
//!
//! Items are plain records behind a [`CatalogStore`]. Quantity only moves
//! through [`StockAdjustment`], which stores apply atomically.

pub mod engine;
pub mod item;
pub mod search;
pub mod store;

pub use engine::InventoryEngine;
pub use item::{CatalogItem, DetailsPatch, ItemPatch, NewItem};
pub use search::{SearchFilter, sort_newest_first};
pub use store::{AdjustOutcome, CatalogStore, StockAdjustment};
