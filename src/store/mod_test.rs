use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::Duration;

use super::*;
use crate::persist::{MemoryStorage, PersistError};

fn stored_pair(storage: &MemoryStorage) -> Option<PersistedSession> {
    persist::load_json(storage, LOGIN_STORAGE_KEY).unwrap()
}

/// Backend whose writes always fail.
struct BrokenStorage;

impl SessionPersistence for BrokenStorage {
    fn load(&self, _key: &str) -> Result<Option<String>, PersistError> {
        Ok(None)
    }

    fn save(&self, _key: &str, _value: &str) -> Result<(), PersistError> {
        Err(PersistError::Io { path: "broken".into(), source: std::io::Error::other("disk full") })
    }

    fn remove(&self, _key: &str) -> Result<(), PersistError> {
        Ok(())
    }
}

/// Memory backend whose first save parks until the test releases it.
struct StalledStorage {
    entries: MemoryStorage,
    first: AtomicBool,
    entered: Mutex<mpsc::Sender<()>>,
    release: Mutex<mpsc::Receiver<()>>,
}

impl StalledStorage {
    fn new() -> (Self, mpsc::Receiver<()>, mpsc::Sender<()>) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let storage = Self {
            entries: MemoryStorage::new(),
            first: AtomicBool::new(true),
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        };
        (storage, entered_rx, release_tx)
    }
}

impl SessionPersistence for StalledStorage {
    fn load(&self, key: &str) -> Result<Option<String>, PersistError> {
        self.entries.load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PersistError> {
        if self.first.swap(false, Ordering::SeqCst) {
            self.entered.lock().unwrap().send(()).unwrap();
            self.release.lock().unwrap().recv().unwrap();
        }
        self.entries.save(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        self.entries.remove(key)
    }
}

// =============================================================
// Reads and dispatch
// =============================================================

#[test]
fn new_store_starts_anonymous_and_unregistered() {
    let store = SessionStore::in_memory();
    assert_eq!(store.snapshot(), AuthSnapshot::default());
}

#[test]
fn dispatch_pending_is_visible_synchronously() {
    let store = SessionStore::in_memory();
    store.dispatch(LoginAction::Pending);
    assert!(store.login().is_loading);
    assert!(!store.register().is_loading);
}

#[test]
fn slices_are_independent() {
    let store = SessionStore::in_memory();
    store.dispatch(RegisterAction::Pending);
    store.dispatch(RegisterAction::Rejected { message: "email taken".to_owned() });
    assert_eq!(store.login(), LoginSession::default());
    assert_eq!(store.register().error.as_deref(), Some("email taken"));

    store.dispatch(LoginAction::Rejected { message: "nope".to_owned() });
    assert_eq!(store.register().error.as_deref(), Some("email taken"));
    assert_eq!(store.login().error.as_deref(), Some("nope"));
}

#[test]
fn convenience_actions_route_to_their_slice() {
    let store = SessionStore::in_memory();
    store.dispatch(LoginAction::Fulfilled { token: "abc".to_owned() });
    store.dispatch(RegisterAction::Fulfilled);
    store.dispatch(RegisterAction::Rejected { message: "x".to_owned() });

    store.clear_register_error();
    assert_eq!(store.register().error, None);
    assert!(store.register().is_registered);

    store.reset_registration();
    assert_eq!(store.register(), RegistrationStatus::default());

    store.logout();
    assert_eq!(store.login(), LoginSession::default());
}

#[test]
fn clones_share_state() {
    let store = SessionStore::in_memory();
    let other = store.clone();
    other.dispatch(LoginAction::Fulfilled { token: "abc".to_owned() });
    assert!(store.login().is_authenticated);
}

#[tokio::test]
async fn subscribers_see_published_snapshots() {
    let store = SessionStore::in_memory();
    let mut rx = store.subscribe();

    store.dispatch(LoginAction::Pending);
    rx.changed().await.unwrap();
    assert!(rx.borrow_and_update().login.is_loading);

    store.dispatch(LoginAction::Fulfilled { token: "abc123".to_owned() });
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().login.token.as_deref(), Some("abc123"));
}

// =============================================================
// Persistence
// =============================================================

#[test]
fn login_pair_is_persisted_and_restored() {
    let storage = Arc::new(MemoryStorage::new());
    let store = SessionStore::new(storage.clone());
    store.dispatch(LoginAction::Pending);
    store.dispatch(LoginAction::Fulfilled { token: "abc123".to_owned() });

    assert_eq!(
        stored_pair(&storage),
        Some(PersistedSession { token: Some("abc123".to_owned()), is_authenticated: true })
    );

    let restarted = SessionStore::new(storage);
    let login = restarted.login();
    assert!(login.is_authenticated);
    assert_eq!(login.token.as_deref(), Some("abc123"));
    assert!(!login.is_loading);
    assert_eq!(login.error, None);
}

#[test]
fn transient_fields_are_never_persisted() {
    let storage = Arc::new(MemoryStorage::new());
    let store = SessionStore::new(storage.clone());
    store.dispatch(LoginAction::Pending);
    store.dispatch(LoginAction::Rejected { message: "bad".to_owned() });

    // Neither transition changed the token pair, so nothing was written.
    assert_eq!(stored_pair(&storage), None);
    let raw = storage.load(LOGIN_STORAGE_KEY).unwrap();
    assert!(raw.is_none());
}

#[test]
fn logout_removes_persisted_pair() {
    let storage = Arc::new(MemoryStorage::new());
    let store = SessionStore::new(storage.clone());
    store.dispatch(LoginAction::Fulfilled { token: "abc".to_owned() });
    assert!(stored_pair(&storage).is_some());

    store.logout();
    assert_eq!(storage.load(LOGIN_STORAGE_KEY).unwrap(), None);
    assert_eq!(SessionStore::new(storage).login(), LoginSession::default());
}

#[test]
fn logout_racing_a_slow_login_write_leaves_storage_anonymous() {
    let (storage, entered, release) = StalledStorage::new();
    let storage = Arc::new(storage);
    let store = SessionStore::new(storage.clone());

    let login = {
        let store = store.clone();
        std::thread::spawn(move || store.dispatch(LoginAction::Fulfilled { token: "late".to_owned() }))
    };
    entered.recv().unwrap();

    let logout = {
        let store = store.clone();
        std::thread::spawn(move || store.logout())
    };
    std::thread::sleep(Duration::from_millis(50));
    release.send(()).unwrap();
    login.join().unwrap();
    logout.join().unwrap();

    assert_eq!(store.login(), LoginSession::default());
    assert_eq!(storage.load(LOGIN_STORAGE_KEY).unwrap(), None);
    assert_eq!(SessionStore::new(storage).login(), LoginSession::default());
}

#[test]
fn registration_is_not_persisted() {
    let storage = Arc::new(MemoryStorage::new());
    let store = SessionStore::new(storage.clone());
    store.dispatch(RegisterAction::Fulfilled);
    assert_eq!(storage.load(LOGIN_STORAGE_KEY).unwrap(), None);
    assert!(!SessionStore::new(storage).register().is_registered);
}

#[test]
fn corrupt_persisted_session_starts_anonymous() {
    let storage = Arc::new(MemoryStorage::new());
    storage.save(LOGIN_STORAGE_KEY, "{broken").unwrap();
    let store = SessionStore::new(storage);
    assert_eq!(store.login(), LoginSession::default());
}

#[test]
fn persistence_failure_does_not_block_transition() {
    let store = SessionStore::new(Arc::new(BrokenStorage));
    store.dispatch(LoginAction::Fulfilled { token: "abc".to_owned() });
    assert!(store.login().is_authenticated);
}
