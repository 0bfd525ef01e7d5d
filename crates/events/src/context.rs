use std::any::Any;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

use hookline_core::{Entity, EntityKind};

/// Transient value handed to every observer of one dispatch.
///
/// The entity is borrowed from the lifecycle owner; observers read it through
/// [`EventContext::entity`] and must not hold on to it past the call.
#[derive(Debug, Clone)]
pub struct EventContext<'a> {
    entity: &'a (dyn Any + Send + Sync),
    entity_kind: EntityKind,
    created: bool,
    raw: bool,
    occurred_at: DateTime<Utc>,
    extensions: BTreeMap<String, JsonValue>,
}

impl<'a> EventContext<'a> {
    /// Context for a typed entity. The kind is taken from `E::KIND`.
    pub fn new<E: Entity>(entity: &'a E, created: bool) -> Self {
        Self::from_any(entity, E::KIND, created)
    }

    /// Context for an already type-erased entity.
    pub fn from_any(
        entity: &'a (dyn Any + Send + Sync),
        entity_kind: EntityKind,
        created: bool,
    ) -> Self {
        Self {
            entity,
            entity_kind,
            created,
            raw: false,
            occurred_at: Utc::now(),
            extensions: BTreeMap::new(),
        }
    }

    /// Mark the write as a raw load (fixtures, replays).
    pub fn with_raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    pub fn with_occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = occurred_at;
        self
    }

    /// Attach a metadata entry. A later entry with the same key wins.
    pub fn with_extension(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.extensions.insert(key.into(), value.into());
        self
    }

    /// Typed view of the entity, `None` if it is not an `E`.
    pub fn entity<E: Any>(&self) -> Option<&'a E> {
        self.entity.downcast_ref::<E>()
    }

    pub fn entity_kind(&self) -> &EntityKind {
        &self.entity_kind
    }

    /// `true` on the first write of the entity, `false` on updates.
    pub fn created(&self) -> bool {
        self.created
    }

    pub fn raw(&self) -> bool {
        self.raw
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn extension(&self, key: &str) -> Option<&JsonValue> {
        self.extensions.get(key)
    }

    pub fn extensions(&self) -> &BTreeMap<String, JsonValue> {
        &self.extensions
    }
}
