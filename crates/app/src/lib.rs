//! `hookline-app` — process wiring.
//!
//! [`bootstrap::install`] is the only place observers are registered. Nothing
//! registers itself; reading that function tells you everything that reacts to
//! entity lifecycle events.

pub mod bootstrap;

pub use bootstrap::{App, BootstrapError, build_app, install};
