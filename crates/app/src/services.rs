//! Application services: use-case implementations.
//!
//! Each service struct accepts a [`DocumentStore`](crate::ports::DocumentStore)
//! via a generic parameter (constructor injection), keeping this layer
//! decoupled from concrete adapters.

pub mod ancestor_resolver;
pub mod hierarchy_service;
pub mod nested_service;
pub mod validation_service;

pub use ancestor_resolver::{AncestorResolver, Resolved, RootLookup};
pub use hierarchy_service::HierarchyService;
pub use nested_service::NestedEntityService;
pub use validation_service::ValidationService;
