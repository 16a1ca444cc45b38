//! # infratree-app
//!
//! Application layer: the hierarchy engine use-cases and the **document
//! store port**.
//!
//! ## Responsibilities
//! - Define the `DocumentStore` port that storage adapters implement
//! - Validate payloads against the kind registry and the parent chain
//! - Serve the flat store (CRUD, children, hierarchy assembly, cascade delete)
//! - Serve the nested store (auxiliary kinds embedded in their parent)
//! - Resolve ancestor paths down to an entity or a listing
//!
//! ## Dependency rule
//! Depends on `infratree-domain` only. Never imports adapter crates.
//! Adapters depend on *this* crate, not the reverse.

mod collector;
pub mod ports;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;
