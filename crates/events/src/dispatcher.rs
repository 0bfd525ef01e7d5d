//! Synchronous dispatch of lifecycle events to registered observers.
//!
//! Dispatch is a direct call chain on the caller's thread: observers for one
//! event run one after another, in registration order, and `dispatch` returns
//! only when the last one has finished (or, under fail-fast, when the first
//! one failed). There is no queueing, retry or timeout at this layer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use hookline_core::{Entity, EntityKind};

use crate::{DispatchError, EventContext, EventKind, ObserverExecutionError, Registry};

/// What to do when an observer fails.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Return the first error; later observers do not run.
    #[default]
    FailFast,
    /// Log each error, keep going, and report the failures.
    LogAndContinue,
}

/// Outcome of a successful dispatch.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Observers that were invoked (including ones that failed).
    pub invoked: usize,
    /// Failures collected under [`FailurePolicy::LogAndContinue`].
    pub failures: Vec<ObserverExecutionError>,
}

impl DispatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Resolves observers through the registry and invokes them.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
    policy: FailurePolicy,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>, policy: FailurePolicy) -> Self {
        Self { registry, policy }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Dispatch `event_kind` for `entity_kind` to every matching observer.
    pub fn dispatch(
        &self,
        event_kind: EventKind,
        entity_kind: &EntityKind,
        ctx: &EventContext<'_>,
    ) -> Result<DispatchReport, DispatchError> {
        let observers = self.registry.lookup(event_kind, entity_kind)?;
        let mut report = DispatchReport::default();

        for observer in observers {
            report.invoked += 1;
            tracing::debug!(
                observer = observer.name(),
                event = %event_kind,
                entity = %entity_kind,
                created = ctx.created(),
                "invoking observer"
            );

            let Err(cause) = observer.notify(event_kind, ctx) else {
                continue;
            };

            let err = ObserverExecutionError {
                event_kind,
                entity_kind: entity_kind.clone(),
                observer: observer.name().to_string(),
                cause,
            };

            match self.policy {
                FailurePolicy::FailFast => {
                    tracing::warn!(error = %err, "observer failed; aborting dispatch");
                    return Err(err.into());
                }
                FailurePolicy::LogAndContinue => {
                    tracing::warn!(error = %err, "observer failed; continuing dispatch");
                    report.failures.push(err);
                }
            }
        }

        Ok(report)
    }

    /// Build a context for `entity` and dispatch it under `E::KIND`.
    pub fn send<E: Entity>(
        &self,
        event_kind: EventKind,
        entity: &E,
        created: bool,
    ) -> Result<DispatchReport, DispatchError> {
        let ctx = EventContext::new(entity, created);
        self.dispatch(event_kind, &E::KIND, &ctx)
    }
}
