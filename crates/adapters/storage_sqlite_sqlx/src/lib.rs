//! # infratree-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the `DocumentStore` port defined in `infratree-app::ports`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between JSON documents and database rows
//!
//! ## Dependency rule
//! Depends on `infratree-app` (for the port trait) and `infratree-domain`
//! (for domain types). The `app` and `domain` crates must never reference
//! this adapter.

pub mod document_store;
pub mod error;
pub mod pool;

pub use document_store::SqliteDocumentStore;
pub use pool::{Config, Database};
