//! # infratree-domain
//!
//! Pure domain model for the infratree physical-infrastructure inventory.
//!
//! ## Responsibilities
//! - Foundational types: identifiers, schemaless documents, equality filters
//! - The **Kind Registry**: the fixed taxonomy (tenant → site → building →
//!   room → rack → device → subdevice → subdevice1, plus auxiliary kinds and
//!   templates), its collection names, parent rules and storage placement
//! - The **Identifier Normalizer**: native `_id` ↔ external `id`
//! - Typed per-kind payloads and the pure half of the **Validation Engine**
//! - Hierarchy values: assembled trees and cascade deletion plans
//! - The error taxonomy shared by every layer
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod kind;

pub mod document;
pub mod entity;
pub mod filter;
pub mod hierarchy;
pub mod path;
pub mod validation;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
