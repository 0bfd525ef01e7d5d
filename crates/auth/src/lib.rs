//! `hookline-auth` — users, groups and the observers that keep memberships
//! in step with the user lifecycle.
//!
//! Storage of users is not handled here; groups go through the [`GroupStore`]
//! collaborator.

pub mod group;
pub mod in_memory_store;
pub mod observers;
pub mod store;
pub mod user;

pub use group::{DEFAULT_GROUP, Group, GroupName};
pub use in_memory_store::InMemoryGroupStore;
pub use observers::{AssignDefaultGroup, RemoveMemberships};
pub use store::{GroupStore, GroupStoreError};
pub use user::{User, UserStatus};
