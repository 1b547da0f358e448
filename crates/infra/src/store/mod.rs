//! Store adapters behind the `CatalogStore` and `CredentialStore` ports.

pub mod memory;
pub mod postgres;

pub use memory::{InMemoryCatalogStore, InMemoryCredentialStore};
pub use postgres::{PgCatalogStore, PgCredentialStore};
