//! Entity trait: identity + the kind tag lifecycle events are keyed by.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Identifier of an entity type (e.g. `"User"`).
///
/// Kinds are opaque strings; observers subscribe to `(EventKind, EntityKind)`
/// pairs, so two entity types must never share a kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKind(Cow<'static, str>);

impl EntityKind {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for EntityKind {
    fn from(value: &'static str) -> Self {
        Self::from_static(value)
    }
}

/// Entity marker + minimal interface.
///
/// `Send + Sync + 'static` so a borrowed entity can travel through an event
/// context as `&dyn Any`.
pub trait Entity: Send + Sync + 'static {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Kind tag used as the event sender.
    const KIND: EntityKind;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    fn entity_kind(&self) -> EntityKind {
        Self::KIND
    }
}
