//! `hookline-events` — synchronous entity-lifecycle signals.
//!
//! A [`Registry`] maps `(EventKind, EntityKind)` to an ordered list of
//! [`Observer`]s. A [`Dispatcher`] resolves that list and runs each observer on
//! the calling thread, in registration order, with a borrowed [`EventContext`].
//!
//! ```text
//! save(entity) → Dispatcher::dispatch(PostSave, "User", ctx)
//!                  ├─ observer A (runs to completion)
//!                  └─ observer B
//! ```
//!
//! The registry is built once at startup and passed around explicitly; there
//! is no process-global signal table.

pub mod context;
pub mod dispatcher;
pub mod error;
pub mod kind;
pub mod observer;
pub mod registry;

pub use context::EventContext;
pub use dispatcher::{DispatchReport, Dispatcher, FailurePolicy};
pub use error::{DispatchError, ObserverExecutionError, RegistryError};
pub use kind::EventKind;
pub use observer::{FnObserver, Observer, ObserverResult};
pub use registry::{EntityFilter, RegistrationHandle, Registry, RegistryOptions};
