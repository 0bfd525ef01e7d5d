//! In-memory user repository: the lifecycle owner that fires signals.
//!
//! ```text
//! save(user)
//!   1. PreSave            (failure aborts, nothing is written)
//!   2. write
//!   3. PostSave
//!   4. Created | Updated
//!
//! delete(id)
//!   1. PreDelete          (failure aborts, nothing is removed)
//!   2. remove
//!   3. PostDelete
//!   4. Deleted
//! ```
//!
//! A failure after the write is returned to the caller; the write is not
//! rolled back.
//!
//! Steps 1-2 run under a per-id reservation: concurrent saves/deletes of the
//! same user are serialised until the write, so `created` and the delete
//! result are decided exactly once. Pre-event observers must not save or
//! delete the same user (they would wait on their own reservation).

use std::collections::{HashMap, HashSet};
use std::sync::{Condvar, Mutex, RwLock};

use thiserror::Error;

use hookline_auth::User;
use hookline_core::{Entity, UserId};
use hookline_events::{DispatchError, Dispatcher, EventContext, EventKind};

const STORE_NAME: &str = "in_memory";

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// An observer (or the registry) failed while handling a lifecycle event.
    #[error("lifecycle dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),

    /// Internal lock poisoning.
    #[error("repository lock poisoned")]
    Poisoned,
}

/// Whether `save` inserted or updated.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Created,
    Updated,
}

impl SaveOutcome {
    pub fn created(self) -> bool {
        self == SaveOutcome::Created
    }
}

/// In-memory user storage that dispatches lifecycle events.
///
/// Intended for tests/dev. Observers run with no repository lock held, so
/// they may read the repository.
#[derive(Debug)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
    reserved: Mutex<HashSet<UserId>>,
    released: Condvar,
    dispatcher: Dispatcher,
}

/// Exclusive claim on one user id; released on drop.
struct Reservation<'a> {
    repo: &'a InMemoryUserRepository,
    id: UserId,
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if let Ok(mut reserved) = self.repo.reserved.lock() {
            reserved.remove(&self.id);
        }
        self.repo.released.notify_all();
    }
}

impl InMemoryUserRepository {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            reserved: Mutex::new(HashSet::new()),
            released: Condvar::new(),
            dispatcher,
        }
    }

    fn reserve(&self, id: UserId) -> Result<Reservation<'_>, RepositoryError> {
        let mut reserved = self.reserved.lock().map_err(|_| RepositoryError::Poisoned)?;
        while reserved.contains(&id) {
            reserved = self
                .released
                .wait(reserved)
                .map_err(|_| RepositoryError::Poisoned)?;
        }
        reserved.insert(id);
        Ok(Reservation { repo: self, id })
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Insert or update `user`, firing save events around the write.
    pub fn save(&self, user: &User) -> Result<SaveOutcome, RepositoryError> {
        let reservation = self.reserve(user.id)?;
        let exists = self
            .users
            .read()
            .map_err(|_| RepositoryError::Poisoned)?
            .contains_key(&user.id);

        self.fire(EventKind::PreSave, user, !exists)?;

        let created = self
            .users
            .write()
            .map_err(|_| RepositoryError::Poisoned)?
            .insert(user.id, user.clone())
            .is_none();
        drop(reservation);
        tracing::debug!(user_id = %user.id, created, "user saved");

        self.fire(EventKind::PostSave, user, created)?;
        let follow_up = if created {
            EventKind::Created
        } else {
            EventKind::Updated
        };
        self.fire(follow_up, user, created)?;

        Ok(if created {
            SaveOutcome::Created
        } else {
            SaveOutcome::Updated
        })
    }

    /// Remove a user. Unknown ids return `Ok(false)` and fire nothing.
    pub fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        let reservation = self.reserve(id)?;
        let Some(user) = self.get(id)? else {
            return Ok(false);
        };

        self.fire(EventKind::PreDelete, &user, false)?;

        let removed = self
            .users
            .write()
            .map_err(|_| RepositoryError::Poisoned)?
            .remove(&id);
        drop(reservation);
        let Some(user) = removed else {
            return Ok(false);
        };
        tracing::debug!(user_id = %id, "user deleted");

        self.fire(EventKind::PostDelete, &user, false)?;
        self.fire(EventKind::Deleted, &user, false)?;
        Ok(true)
    }

    pub fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let users = self.users.read().map_err(|_| RepositoryError::Poisoned)?;
        Ok(users.get(&id).cloned())
    }

    /// All users, ordered by username.
    pub fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let users = self.users.read().map_err(|_| RepositoryError::Poisoned)?;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(all)
    }

    fn fire(
        &self,
        event_kind: EventKind,
        user: &User,
        created: bool,
    ) -> Result<(), RepositoryError> {
        let ctx = EventContext::new(user, created).with_extension("store", STORE_NAME);
        let report = self.dispatcher.dispatch(event_kind, &User::KIND, &ctx)?;
        if !report.is_clean() {
            tracing::warn!(
                event = %event_kind,
                user_id = %user.id,
                failures = report.failures.len(),
                "lifecycle observers failed"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier, Mutex};
    use std::thread;
    use std::time::Duration;

    use hookline_events::{FailurePolicy, FnObserver, Registry};

    use super::*;

    type Journal = Arc<Mutex<Vec<(EventKind, bool)>>>;

    fn setup(policy: FailurePolicy) -> (Arc<Registry>, InMemoryUserRepository, Journal) {
        let registry = Arc::new(Registry::default());
        let journal: Journal = Arc::new(Mutex::new(Vec::new()));
        for kind in EventKind::ALL {
            let sink = Arc::clone(&journal);
            registry
                .register_for::<User>(
                    kind,
                    Arc::new(FnObserver::new(
                        "journal",
                        move |k: EventKind, ctx: &EventContext<'_>| {
                            sink.lock().unwrap().push((k, ctx.created()));
                            Ok(())
                        },
                    )),
                )
                .unwrap();
        }
        let repo = InMemoryUserRepository::new(Dispatcher::new(Arc::clone(&registry), policy));
        (registry, repo, journal)
    }

    #[test]
    fn first_save_fires_create_sequence() {
        let (_registry, repo, journal) = setup(FailurePolicy::FailFast);
        let user = User::new("alice", "").unwrap();

        assert_eq!(repo.save(&user).unwrap(), SaveOutcome::Created);
        assert_eq!(
            *journal.lock().unwrap(),
            vec![
                (EventKind::PreSave, true),
                (EventKind::PostSave, true),
                (EventKind::Created, true),
            ]
        );
    }

    #[test]
    fn second_save_fires_update_sequence() {
        let (_registry, repo, journal) = setup(FailurePolicy::FailFast);
        let mut user = User::new("alice", "").unwrap();
        repo.save(&user).unwrap();
        journal.lock().unwrap().clear();

        user.change_email("alice@example.com").unwrap();
        assert_eq!(repo.save(&user).unwrap(), SaveOutcome::Updated);
        assert_eq!(
            *journal.lock().unwrap(),
            vec![
                (EventKind::PreSave, false),
                (EventKind::PostSave, false),
                (EventKind::Updated, false),
            ]
        );
        assert_eq!(repo.get(user.id).unwrap().unwrap().email, "alice@example.com");
    }

    #[test]
    fn delete_fires_delete_sequence_and_unknown_ids_fire_nothing() {
        let (_registry, repo, journal) = setup(FailurePolicy::FailFast);
        let user = User::new("alice", "").unwrap();
        repo.save(&user).unwrap();
        journal.lock().unwrap().clear();

        assert!(repo.delete(user.id).unwrap());
        assert_eq!(
            *journal.lock().unwrap(),
            vec![
                (EventKind::PreDelete, false),
                (EventKind::PostDelete, false),
                (EventKind::Deleted, false),
            ]
        );

        journal.lock().unwrap().clear();
        assert!(!repo.delete(user.id).unwrap());
        assert!(journal.lock().unwrap().is_empty());
        assert!(repo.get(user.id).unwrap().is_none());
    }

    #[test]
    fn pre_save_failure_aborts_the_write() {
        let (registry, repo, _journal) = setup(FailurePolicy::FailFast);
        registry
            .register_for::<User>(
                EventKind::PreSave,
                Arc::new(FnObserver::new("veto", |_: EventKind, _: &EventContext<'_>| {
                    Err(anyhow::anyhow!("vetoed"))
                })),
            )
            .unwrap();
        let user = User::new("alice", "").unwrap();

        let err = repo.save(&user).unwrap_err();
        assert!(matches!(err, RepositoryError::Dispatch(DispatchError::Observer(_))));
        assert!(repo.get(user.id).unwrap().is_none());
    }

    #[test]
    fn post_save_failure_keeps_the_write() {
        let (registry, repo, _journal) = setup(FailurePolicy::FailFast);
        registry
            .register_for::<User>(
                EventKind::PostSave,
                Arc::new(FnObserver::new("boom", |_: EventKind, _: &EventContext<'_>| {
                    Err(anyhow::anyhow!("boom"))
                })),
            )
            .unwrap();
        let user = User::new("alice", "").unwrap();

        assert!(repo.save(&user).is_err());
        assert!(repo.get(user.id).unwrap().is_some());
    }

    #[test]
    fn log_and_continue_save_succeeds_despite_failures() {
        let (registry, repo, journal) = setup(FailurePolicy::LogAndContinue);
        registry
            .register_for::<User>(
                EventKind::PreSave,
                Arc::new(FnObserver::new("veto", |_: EventKind, _: &EventContext<'_>| {
                    Err(anyhow::anyhow!("vetoed"))
                })),
            )
            .unwrap();
        let user = User::new("alice", "").unwrap();

        assert_eq!(repo.save(&user).unwrap(), SaveOutcome::Created);
        assert_eq!(journal.lock().unwrap().len(), 3);
    }

    #[test]
    fn observers_receive_store_metadata() {
        let (registry, repo, _journal) = setup(FailurePolicy::FailFast);
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        registry
            .register_for::<User>(
                EventKind::Created,
                Arc::new(FnObserver::new("meta", move |_: EventKind, ctx: &EventContext<'_>| {
                    if let Some(store) = ctx.extension("store").and_then(|v| v.as_str()) {
                        sink.lock().unwrap().push(store.to_string());
                    }
                    Ok(())
                })),
            )
            .unwrap();

        repo.save(&User::new("alice", "").unwrap()).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![STORE_NAME]);
    }

    fn gate_first_call(
        registry: &Registry,
        kind: EventKind,
        entered: &Arc<Barrier>,
        release: &Arc<Barrier>,
    ) {
        let calls = Arc::new(AtomicUsize::new(0));
        let (entered, release) = (Arc::clone(entered), Arc::clone(release));
        registry
            .register_for::<User>(
                kind,
                Arc::new(FnObserver::new("gate", move |_: EventKind, _: &EventContext<'_>| {
                    if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                        entered.wait();
                        release.wait();
                    }
                    Ok(())
                })),
            )
            .unwrap();
    }

    fn count(journal: &Journal, kind: EventKind) -> usize {
        journal.lock().unwrap().iter().filter(|(k, _)| *k == kind).count()
    }

    #[test]
    fn concurrent_first_saves_create_once() {
        let (registry, repo, journal) = setup(FailurePolicy::FailFast);
        let (entered, release) = (Arc::new(Barrier::new(2)), Arc::new(Barrier::new(2)));
        gate_first_call(&registry, EventKind::PreSave, &entered, &release);
        let user = User::new("racer", "").unwrap();

        let mut outcomes = thread::scope(|s| {
            let first = s.spawn(|| repo.save(&user));
            entered.wait();
            let second = s.spawn(|| repo.save(&user));
            thread::sleep(Duration::from_millis(50));
            release.wait();
            vec![
                first.join().unwrap().unwrap(),
                second.join().unwrap().unwrap(),
            ]
        });
        outcomes.sort_by_key(|o| !o.created());

        assert_eq!(outcomes, vec![SaveOutcome::Created, SaveOutcome::Updated]);
        assert_eq!(count(&journal, EventKind::Created), 1);
        assert_eq!(count(&journal, EventKind::Updated), 1);
        let post_save_created: Vec<bool> = journal
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == EventKind::PostSave)
            .map(|(_, created)| *created)
            .collect();
        assert_eq!(post_save_created.iter().filter(|c| **c).count(), 1);
    }

    #[test]
    fn concurrent_deletes_remove_once() {
        let (registry, repo, journal) = setup(FailurePolicy::FailFast);
        let user = User::new("leaver", "").unwrap();
        repo.save(&user).unwrap();
        let (entered, release) = (Arc::new(Barrier::new(2)), Arc::new(Barrier::new(2)));
        gate_first_call(&registry, EventKind::PreDelete, &entered, &release);

        let mut results = thread::scope(|s| {
            let first = s.spawn(|| repo.delete(user.id));
            entered.wait();
            let second = s.spawn(|| repo.delete(user.id));
            thread::sleep(Duration::from_millis(50));
            release.wait();
            vec![first.join().unwrap().unwrap(), second.join().unwrap().unwrap()]
        });
        results.sort();

        assert_eq!(results, vec![false, true]);
        assert_eq!(count(&journal, EventKind::PostDelete), 1);
        assert_eq!(count(&journal, EventKind::Deleted), 1);
        assert!(repo.get(user.id).unwrap().is_none());
    }

    #[test]
    fn failed_pre_save_releases_the_reservation() {
        let (registry, repo, _journal) = setup(FailurePolicy::FailFast);
        let handle = registry
            .register_for::<User>(
                EventKind::PreSave,
                Arc::new(FnObserver::new("veto", |_: EventKind, _: &EventContext<'_>| {
                    Err(anyhow::anyhow!("vetoed"))
                })),
            )
            .unwrap();
        let user = User::new("retry", "").unwrap();

        assert!(repo.save(&user).is_err());
        registry.unregister(&handle).unwrap();
        assert_eq!(repo.save(&user).unwrap(), SaveOutcome::Created);
    }

    #[test]
    fn list_is_ordered_by_username() {
        let (_registry, repo, _journal) = setup(FailurePolicy::FailFast);
        for name in ["carol", "alice", "bob"] {
            repo.save(&User::new(name, "").unwrap()).unwrap();
        }

        let names: Vec<_> = repo.list().unwrap().into_iter().map(|u| u.username).collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
    }
}
