//! Observer registry (process-wide, built at startup).
//!
//! Registration order is the dispatch order. The registry is read-mostly: it
//! is populated once by the startup routine and afterwards only read, apart
//! from the occasional `unregister`. Lookups return a snapshot so no lock is
//! held while observers run.

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hookline_core::{Entity, EntityKind};

use crate::{EventKind, Observer, RegistryError};

/// Which entity kinds a registration applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityFilter {
    /// Only events sent for this entity kind.
    Only(EntityKind),
    /// Events for every entity kind.
    Any,
}

impl EntityFilter {
    pub fn matches(&self, entity_kind: &EntityKind) -> bool {
        match self {
            EntityFilter::Only(kind) => kind == entity_kind,
            EntityFilter::Any => true,
        }
    }
}

impl From<EntityKind> for EntityFilter {
    fn from(value: EntityKind) -> Self {
        EntityFilter::Only(value)
    }
}

impl core::fmt::Display for EntityFilter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EntityFilter::Only(kind) => write!(f, "{kind}"),
            EntityFilter::Any => f.write_str("*"),
        }
    }
}

/// Registry behaviour switches.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryOptions {
    /// Reject a second registration of the same observer name for the same
    /// `(event kind, filter)`. When off, duplicates are kept and fire twice.
    pub strict: bool,
}

/// Token returned by [`Registry::register`], used to unregister.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegistrationHandle {
    id: Uuid,
    event_kind: EventKind,
    filter: EntityFilter,
}

impl RegistrationHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn event_kind(&self) -> EventKind {
        self.event_kind
    }

    pub fn filter(&self) -> &EntityFilter {
        &self.filter
    }
}

#[derive(Debug)]
struct Registration {
    id: Uuid,
    event_kind: EventKind,
    filter: EntityFilter,
    observer: Arc<dyn Observer>,
}

/// Ordered mapping `(EventKind, EntityFilter)` → observers.
#[derive(Debug, Default)]
pub struct Registry {
    options: RegistryOptions,
    entries: RwLock<Vec<Registration>>,
}

impl Registry {
    pub fn new(options: RegistryOptions) -> Self {
        Self {
            options,
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Registry that rejects duplicate registrations.
    pub fn strict() -> Self {
        Self::new(RegistryOptions { strict: true })
    }

    pub fn options(&self) -> RegistryOptions {
        self.options
    }

    /// Append an observer for `(event_kind, filter)`.
    pub fn register(
        &self,
        event_kind: EventKind,
        filter: impl Into<EntityFilter>,
        observer: Arc<dyn Observer>,
    ) -> Result<RegistrationHandle, RegistryError> {
        let filter = filter.into();
        let mut entries = self.entries.write().map_err(|_| RegistryError::Poisoned)?;

        if self.options.strict {
            let duplicate = entries.iter().any(|r| {
                r.event_kind == event_kind
                    && r.filter == filter
                    && r.observer.name() == observer.name()
            });
            if duplicate {
                return Err(RegistryError::DuplicateRegistration {
                    event_kind,
                    filter,
                    observer: observer.name().to_string(),
                });
            }
        }

        let id = Uuid::now_v7();
        tracing::debug!(
            observer = observer.name(),
            event = %event_kind,
            entity = %filter,
            "observer registered"
        );
        entries.push(Registration {
            id,
            event_kind,
            filter: filter.clone(),
            observer,
        });

        Ok(RegistrationHandle {
            id,
            event_kind,
            filter,
        })
    }

    /// Register for the kind of entity type `E`.
    pub fn register_for<E: Entity>(
        &self,
        event_kind: EventKind,
        observer: Arc<dyn Observer>,
    ) -> Result<RegistrationHandle, RegistryError> {
        self.register(event_kind, EntityFilter::Only(E::KIND), observer)
    }

    /// Remove a registration. Returns `false` if it was already gone.
    pub fn unregister(&self, handle: &RegistrationHandle) -> Result<bool, RegistryError> {
        let mut entries = self.entries.write().map_err(|_| RegistryError::Poisoned)?;
        let before = entries.len();
        entries.retain(|r| r.id != handle.id);
        let removed = entries.len() != before;
        if removed {
            tracing::debug!(
                event = %handle.event_kind,
                entity = %handle.filter,
                "observer unregistered"
            );
        }
        Ok(removed)
    }

    /// Observers for `(event_kind, entity_kind)` in registration order.
    pub fn lookup(
        &self,
        event_kind: EventKind,
        entity_kind: &EntityKind,
    ) -> Result<Vec<Arc<dyn Observer>>, RegistryError> {
        let entries = self.entries.read().map_err(|_| RegistryError::Poisoned)?;
        Ok(entries
            .iter()
            .filter(|r| r.event_kind == event_kind && r.filter.matches(entity_kind))
            .map(|r| Arc::clone(&r.observer))
            .collect())
    }

    pub fn has_observers(
        &self,
        event_kind: EventKind,
        entity_kind: &EntityKind,
    ) -> Result<bool, RegistryError> {
        let entries = self.entries.read().map_err(|_| RegistryError::Poisoned)?;
        Ok(entries
            .iter()
            .any(|r| r.event_kind == event_kind && r.filter.matches(entity_kind)))
    }

    /// Total number of registrations.
    pub fn len(&self) -> Result<usize, RegistryError> {
        let entries = self.entries.read().map_err(|_| RegistryError::Poisoned)?;
        Ok(entries.len())
    }

    pub fn is_empty(&self) -> Result<bool, RegistryError> {
        Ok(self.len()? == 0)
    }

    /// Drop every registration (process teardown, test isolation).
    pub fn clear(&self) -> Result<(), RegistryError> {
        let mut entries = self.entries.write().map_err(|_| RegistryError::Poisoned)?;
        entries.clear();
        Ok(())
    }
}
