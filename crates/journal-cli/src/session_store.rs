//! Session persistence for the CLI: system keychain by default, or a JSON file.

#[cfg(test)]
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
#[cfg(test)]
use std::sync::{Mutex, OnceLock};

#[cfg(not(test))]
use keyring::Entry;

use journal_core::auth::{FileSessionStore, SessionPersistence};
use journal_core::{Error, Result};

#[cfg(not(test))]
const KEYRING_SERVICE_NAME: &str = "journal-cli";

/// Keychain slots namespaced per profile.
#[derive(Debug, Clone)]
pub struct KeyringSessionStore {
    profile_name: String,
}

impl KeyringSessionStore {
    pub fn new(profile_name: &str) -> Self {
        Self {
            profile_name: profile_name.to_string(),
        }
    }

    fn account(&self, slot: &str) -> String {
        format!("{slot}:{}", self.profile_name)
    }

    #[cfg(test)]
    fn test_store() -> &'static Mutex<HashMap<String, String>> {
        static STORE: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
        STORE.get_or_init(|| Mutex::new(HashMap::new()))
    }

    #[cfg(not(test))]
    fn entry(&self, slot: &str) -> Result<Entry> {
        Entry::new(KEYRING_SERVICE_NAME, &self.account(slot))
            .map_err(|error| Error::SessionStorage(error.to_string()))
    }
}

impl SessionPersistence for KeyringSessionStore {
    #[cfg(not(test))]
    fn read_slot(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(Error::SessionStorage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn read_slot(&self, key: &str) -> Result<Option<String>> {
        let guard = Self::test_store()
            .lock()
            .map_err(|error| Error::SessionStorage(error.to_string()))?;
        Ok(guard.get(&self.account(key)).cloned())
    }

    #[cfg(not(test))]
    fn write_slot(&self, key: &str, value: &str) -> Result<()> {
        self.entry(key)?
            .set_password(value)
            .map_err(|error| Error::SessionStorage(error.to_string()))
    }

    #[cfg(test)]
    fn write_slot(&self, key: &str, value: &str) -> Result<()> {
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| Error::SessionStorage(error.to_string()))?;
        guard.insert(self.account(key), value.to_string());
        Ok(())
    }

    #[cfg(not(test))]
    fn remove_slot(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(Error::SessionStorage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn remove_slot(&self, key: &str) -> Result<()> {
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| Error::SessionStorage(error.to_string()))?;
        guard.remove(&self.account(key));
        Ok(())
    }
}

/// File store when `session_file` is given, otherwise the profile's keychain slots.
pub fn open_persistence(
    session_file: Option<&Path>,
    profile_name: &str,
) -> Arc<dyn SessionPersistence> {
    match session_file {
        Some(path) => Arc::new(FileSessionStore::new(path)),
        None => Arc::new(KeyringSessionStore::new(profile_name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use journal_core::auth::{AuthSession, AuthUser, TOKEN_SLOT};
    use journal_core::SessionHandle;

    #[test]
    fn keyring_slots_are_scoped_per_profile() {
        let work = KeyringSessionStore::new("keyring-scope-work");
        let home = KeyringSessionStore::new("keyring-scope-home");

        work.write_slot(TOKEN_SLOT, "work-token").unwrap();

        assert_eq!(work.read_slot(TOKEN_SLOT).unwrap().as_deref(), Some("work-token"));
        assert_eq!(home.read_slot(TOKEN_SLOT).unwrap(), None);

        work.remove_slot(TOKEN_SLOT).unwrap();
        work.remove_slot(TOKEN_SLOT).unwrap();
        assert_eq!(work.read_slot(TOKEN_SLOT).unwrap(), None);
    }

    #[test]
    fn session_survives_reopening_keyring_store() {
        let profile = "keyring-reopen";
        let session = SessionHandle::restore(open_persistence(None, profile)).unwrap();
        session
            .establish(AuthSession {
                token: "abc".to_string(),
                user: AuthUser {
                    id: 1,
                    username: "alice".to_string(),
                },
            })
            .unwrap();

        let reopened = SessionHandle::restore(open_persistence(None, profile)).unwrap();
        assert_eq!(reopened.token().as_deref(), Some("abc"));

        reopened.clear().unwrap();
        let cleared = SessionHandle::restore(open_persistence(None, profile)).unwrap();
        assert!(!cleared.is_authenticated());
    }

    #[test]
    fn session_file_is_used_when_given() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = open_persistence(Some(&path), "ignored");

        store.write_slot(TOKEN_SLOT, "abc").unwrap();

        assert!(path.exists());
        assert_eq!(
            KeyringSessionStore::new("ignored").read_slot(TOKEN_SLOT).unwrap(),
            None
        );
    }
}
