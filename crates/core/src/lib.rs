//! `hookline-core` — shared domain primitives.
//!
//! Identifiers, entity kinds and the domain error model. No IO, no dispatch.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::{Entity, EntityKind};
pub use error::{DomainError, DomainResult};
pub use id::{GroupId, UserId};
