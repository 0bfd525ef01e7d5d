//! Registry and dispatch errors.

use thiserror::Error;

use hookline_core::EntityKind;

use crate::EventKind;
use crate::registry::EntityFilter;

/// Registry operation failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Strict mode only: the same observer is already registered for the pair.
    #[error("observer `{observer}` already registered for {event_kind} on {filter}")]
    DuplicateRegistration {
        event_kind: EventKind,
        filter: EntityFilter,
        observer: String,
    },

    /// Internal lock poisoning (a thread panicked while mutating the registry).
    #[error("registry lock poisoned")]
    Poisoned,
}

/// An observer returned an error during dispatch.
///
/// The observer's own error is kept as the source; use
/// `err.source_error().downcast_ref::<T>()` to recover it.
#[derive(Debug)]
pub struct ObserverExecutionError {
    pub event_kind: EventKind,
    pub entity_kind: EntityKind,
    pub observer: String,
    pub cause: anyhow::Error,
}

impl ObserverExecutionError {
    pub fn source_error(&self) -> &anyhow::Error {
        &self.cause
    }
}

impl core::fmt::Display for ObserverExecutionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "observer `{}` failed handling {} for {}: {}",
            self.observer, self.event_kind, self.entity_kind, self.cause
        )
    }
}

// anyhow::Error is not itself a std Error, so the source is exposed by hand.
impl std::error::Error for ObserverExecutionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        let cause: &(dyn std::error::Error + 'static) = self.cause.as_ref();
        Some(cause)
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Fail-fast: the first observer error, remaining observers were skipped.
    #[error(transparent)]
    Observer(#[from] ObserverExecutionError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
