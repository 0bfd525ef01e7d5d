//! Startup routine: build the registry, register observers, hand out the
//! lifecycle owners.

use std::sync::Arc;

use thiserror::Error;

use hookline_auth::{AssignDefaultGroup, GroupStore, InMemoryGroupStore, RemoveMemberships, User};
use hookline_events::{Dispatcher, EventKind, RegistrationHandle, Registry, RegistryError};
use hookline_infra::{HooklineConfig, InMemoryUserRepository};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("observer registration failed: {0}")]
    Registry(#[from] RegistryError),
}

/// Register every lifecycle observer of the process.
///
/// Must run before the first entity mutation. Returns the handles in
/// registration order.
pub fn install(
    registry: &Registry,
    groups: Arc<dyn GroupStore>,
    config: &HooklineConfig,
) -> Result<Vec<RegistrationHandle>, RegistryError> {
    let handles = vec![
        registry.register_for::<User>(
            EventKind::PostSave,
            Arc::new(AssignDefaultGroup::with_group(
                Arc::clone(&groups),
                config.default_group.clone(),
            )),
        )?,
        registry.register_for::<User>(
            EventKind::PostDelete,
            Arc::new(RemoveMemberships::new(groups)),
        )?,
    ];

    tracing::info!(
        observers = handles.len(),
        strict = registry.options().strict,
        default_group = %config.default_group,
        "lifecycle observers installed"
    );
    Ok(handles)
}

/// Wired process state.
#[derive(Debug)]
pub struct App {
    pub registry: Arc<Registry>,
    pub groups: Arc<InMemoryGroupStore>,
    pub users: InMemoryUserRepository,
    pub handles: Vec<RegistrationHandle>,
}

impl App {
    /// Remove every installed observer (teardown).
    pub fn shutdown(&self) -> Result<(), RegistryError> {
        for handle in &self.handles {
            self.registry.unregister(handle)?;
        }
        tracing::info!("lifecycle observers removed");
        Ok(())
    }
}

/// Build the in-memory application from configuration.
pub fn build_app(config: &HooklineConfig) -> Result<App, BootstrapError> {
    let registry = Arc::new(Registry::new(config.registry_options()));
    let groups = Arc::new(InMemoryGroupStore::new());

    let handles = install(&registry, groups.clone(), config)?;

    let dispatcher = Dispatcher::new(Arc::clone(&registry), config.failure_policy);
    let users = InMemoryUserRepository::new(dispatcher);

    Ok(App {
        registry,
        groups,
        users,
        handles,
    })
}
