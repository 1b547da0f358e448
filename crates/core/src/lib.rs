//! `sweetshop-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use entity::{Entity, creation_order};
pub use error::{DomainError, DomainResult, ErrorKind, StoreError};
pub use id::{ItemId, UserId};
pub use value_object::{Email, Price};
