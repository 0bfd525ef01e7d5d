//! Lifecycle observers that maintain group memberships.
//!
//! - [`AssignDefaultGroup`]: on `PostSave` of a newly created user, put the user
//!   in the default group (created on first use).
//! - [`RemoveMemberships`]: on `PostDelete` of a user, drop its memberships.
//!
//! Neither observer retries; a store failure is returned to the dispatcher.

use anyhow::Context as _;

use hookline_core::Entity;
use hookline_events::{EventContext, EventKind, Observer, ObserverResult};

use crate::{DEFAULT_GROUP, GroupName, GroupStore, User};

fn expect_user<'a>(ctx: &EventContext<'a>) -> anyhow::Result<&'a User> {
    ctx.entity::<User>()
        .with_context(|| format!("expected a {} entity, got {}", User::KIND, ctx.entity_kind()))
}

/// Adds newly created users to a default group.
///
/// Updates (`created == false`) and raw loads are ignored. Re-running on a user
/// that is already a member leaves memberships unchanged.
#[derive(Debug)]
pub struct AssignDefaultGroup<S> {
    store: S,
    group: GroupName,
}

impl<S: GroupStore> AssignDefaultGroup<S> {
    pub const NAME: &'static str = "auth.assign_default_group";

    pub fn new(store: S) -> Self {
        Self {
            store,
            group: DEFAULT_GROUP,
        }
    }

    pub fn with_group(store: S, group: GroupName) -> Self {
        Self { store, group }
    }

    pub fn group(&self) -> &GroupName {
        &self.group
    }
}

impl<S: GroupStore> Observer for AssignDefaultGroup<S> {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn notify(&self, _event_kind: EventKind, ctx: &EventContext<'_>) -> ObserverResult {
        if !ctx.created() || ctx.raw() {
            return Ok(());
        }

        let user = expect_user(ctx)?;
        let group = self.store.get_or_create(&self.group)?;
        let added = self.store.add_membership(user.id, &group)?;

        if added {
            tracing::info!(user_id = %user.id, group = %group.name, "user added to default group");
        } else {
            tracing::debug!(
                user_id = %user.id,
                group = %group.name,
                "user already in default group"
            );
        }
        Ok(())
    }
}

/// Drops every membership of a deleted user.
#[derive(Debug)]
pub struct RemoveMemberships<S> {
    store: S,
}

impl<S: GroupStore> RemoveMemberships<S> {
    pub const NAME: &'static str = "auth.remove_memberships";

    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: GroupStore> Observer for RemoveMemberships<S> {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn notify(&self, _event_kind: EventKind, ctx: &EventContext<'_>) -> ObserverResult {
        let user = expect_user(ctx)?;
        let removed = self.store.remove_memberships(user.id)?;
        tracing::debug!(user_id = %user.id, removed, "memberships removed");
        Ok(())
    }
}
