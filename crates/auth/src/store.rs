use std::collections::BTreeSet;
use std::sync::Arc;

use thiserror::Error;

use hookline_core::{GroupId, UserId};

use crate::{Group, GroupName};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GroupStoreError {
    /// The backing store could not be reached or is in an unusable state.
    #[error("group store unavailable: {0}")]
    Unavailable(String),

    /// A membership referenced a group the store does not know.
    #[error("unknown group: {0}")]
    UnknownGroup(GroupId),
}

/// Group/membership collaborator.
///
/// Memberships have set semantics: adding an existing membership is a no-op.
pub trait GroupStore: Send + Sync {
    /// Return the group called `name`, creating it if absent.
    fn get_or_create(&self, name: &GroupName) -> Result<Group, GroupStoreError>;

    /// Add `user_id` to `group`. Returns `false` if it was already a member.
    fn add_membership(&self, user_id: UserId, group: &Group) -> Result<bool, GroupStoreError>;

    /// Names of the groups `user_id` belongs to.
    fn groups_of(&self, user_id: UserId) -> Result<BTreeSet<GroupName>, GroupStoreError>;

    /// Drop every membership of `user_id`. Returns how many were removed.
    fn remove_memberships(&self, user_id: UserId) -> Result<usize, GroupStoreError>;
}

impl<S> GroupStore for Arc<S>
where
    S: GroupStore + ?Sized,
{
    fn get_or_create(&self, name: &GroupName) -> Result<Group, GroupStoreError> {
        (**self).get_or_create(name)
    }

    fn add_membership(&self, user_id: UserId, group: &Group) -> Result<bool, GroupStoreError> {
        (**self).add_membership(user_id, group)
    }

    fn groups_of(&self, user_id: UserId) -> Result<BTreeSet<GroupName>, GroupStoreError> {
        (**self).groups_of(user_id)
    }

    fn remove_memberships(&self, user_id: UserId) -> Result<usize, GroupStoreError> {
        (**self).remove_memberships(user_id)
    }
}
