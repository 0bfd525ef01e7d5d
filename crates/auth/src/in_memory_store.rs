//! In-memory group store for tests/dev.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::RwLock;

use hookline_core::{GroupId, UserId};

use crate::{Group, GroupName, GroupStore, GroupStoreError};

#[derive(Debug, Default)]
struct State {
    groups: BTreeMap<GroupName, Group>,
    memberships: HashMap<UserId, BTreeSet<GroupId>>,
}

/// In-memory group/membership store.
///
/// - Group names are unique
/// - A poisoned lock surfaces as `GroupStoreError::Unavailable`
#[derive(Debug, Default)]
pub struct InMemoryGroupStore {
    inner: RwLock<State>,
}

impl InMemoryGroupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All groups, ordered by name.
    pub fn groups(&self) -> Result<Vec<Group>, GroupStoreError> {
        let state = self.inner.read().map_err(|_| poisoned())?;
        Ok(state.groups.values().cloned().collect())
    }

    /// Number of groups `user_id` belongs to.
    pub fn membership_count(&self, user_id: UserId) -> Result<usize, GroupStoreError> {
        let state = self.inner.read().map_err(|_| poisoned())?;
        Ok(state.memberships.get(&user_id).map_or(0, BTreeSet::len))
    }
}

fn poisoned() -> GroupStoreError {
    GroupStoreError::Unavailable("lock poisoned".to_string())
}

impl GroupStore for InMemoryGroupStore {
    fn get_or_create(&self, name: &GroupName) -> Result<Group, GroupStoreError> {
        if let Some(group) = self.inner.read().map_err(|_| poisoned())?.groups.get(name) {
            return Ok(group.clone());
        }

        let mut state = self.inner.write().map_err(|_| poisoned())?;
        // Another writer may have created it between the two locks.
        let group = state
            .groups
            .entry(name.clone())
            .or_insert_with(|| {
                tracing::info!(group = %name, "group created");
                Group::new(name.clone())
            })
            .clone();
        Ok(group)
    }

    fn add_membership(&self, user_id: UserId, group: &Group) -> Result<bool, GroupStoreError> {
        let mut state = self.inner.write().map_err(|_| poisoned())?;

        let known = state
            .groups
            .get(&group.name)
            .is_some_and(|g| g.id == group.id);
        if !known {
            return Err(GroupStoreError::UnknownGroup(group.id));
        }

        Ok(state.memberships.entry(user_id).or_default().insert(group.id))
    }

    fn groups_of(&self, user_id: UserId) -> Result<BTreeSet<GroupName>, GroupStoreError> {
        let state = self.inner.read().map_err(|_| poisoned())?;
        let Some(ids) = state.memberships.get(&user_id) else {
            return Ok(BTreeSet::new());
        };

        Ok(state
            .groups
            .values()
            .filter(|g| ids.contains(&g.id))
            .map(|g| g.name.clone())
            .collect())
    }

    fn remove_memberships(&self, user_id: UserId) -> Result<usize, GroupStoreError> {
        let mut state = self.inner.write().map_err(|_| poisoned())?;
        Ok(state.memberships.remove(&user_id).map_or(0, |ids| ids.len()))
    }
}
