use std::borrow::Cow;

use crate::{EventContext, EventKind};

/// Result returned by an observer.
///
/// Observers wrap whatever their collaborators return in `anyhow::Error`; the
/// dispatcher keeps it as the source of [`crate::ObserverExecutionError`], so
/// callers can still downcast to the concrete collaborator error.
pub type ObserverResult = anyhow::Result<()>;

/// Side-effecting reaction to a lifecycle event.
///
/// Observers run synchronously on the dispatching thread and own no state the
/// registry needs to know about. They are shared (`Arc<dyn Observer>`) between
/// the registry and in-flight dispatches.
pub trait Observer: Send + Sync {
    /// Stable identity used in logs, errors and strict-mode duplicate checks.
    fn name(&self) -> &str;

    fn notify(&self, event_kind: EventKind, ctx: &EventContext<'_>) -> ObserverResult;
}

impl core::fmt::Debug for dyn Observer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Observer").field("name", &self.name()).finish()
    }
}

/// Closure-backed observer.
pub struct FnObserver<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> FnObserver<F>
where
    F: Fn(EventKind, &EventContext<'_>) -> ObserverResult + Send + Sync,
{
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { name: name.into(), f }
    }
}

impl<F> Observer for FnObserver<F>
where
    F: Fn(EventKind, &EventContext<'_>) -> ObserverResult + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn notify(&self, event_kind: EventKind, ctx: &EventContext<'_>) -> ObserverResult {
        (self.f)(event_kind, ctx)
    }
}
