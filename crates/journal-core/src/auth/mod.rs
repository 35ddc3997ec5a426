//! Session model, persistence substrate, and the shared session provider.
//!
//! The session lives in one [`SessionHandle`] that is injected into the API
//! client, the stores, and the router. Persistence goes through a small
//! key-value [`SessionPersistence`] trait with two named slots, so front ends
//! can back it with a file, the OS keychain, or plain memory.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Slot holding the raw bearer token.
pub const TOKEN_SLOT: &str = "journal_token";
/// Slot holding the JSON-encoded [`AuthUser`].
pub const USER_SLOT: &str = "journal_user";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    #[serde(rename = "userId", alias = "id")]
    pub id: i64,
    pub username: String,
}

/// Token and identity of the signed-in user. Both are always present together.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: AuthUser,
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthSession")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_id: i64,
    pub username: String,
}

impl From<LoginResponse> for AuthSession {
    fn from(value: LoginResponse) -> Self {
        Self {
            token: value.token,
            user: AuthUser {
                id: value.user_id,
                username: value.username,
            },
        }
    }
}

/// Key-value substrate that survives process restarts.
pub trait SessionPersistence: Send + Sync {
    fn read_slot(&self, key: &str) -> Result<Option<String>>;
    fn write_slot(&self, key: &str, value: &str) -> Result<()>;
    fn remove_slot(&self, key: &str) -> Result<()>;
}

/// Process-local persistence, used by tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionPersistence for MemorySessionStore {
    fn read_slot(&self, key: &str) -> Result<Option<String>> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(slots.get(key).cloned())
    }

    fn write_slot(&self, key: &str, value: &str) -> Result<()> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_slot(&self, key: &str) -> Result<()> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.remove(key);
        Ok(())
    }
}

/// Slots stored as a flat JSON object in a single file.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|error| {
            Error::SessionStorage(format!(
                "Failed to parse session file {}: {error}",
                self.path.display()
            ))
        })
    }

    fn write_all(&self, slots: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let serialized = serde_json::to_string_pretty(slots)?;
        std::fs::write(&self.path, serialized)?;
        Ok(())
    }
}

impl SessionPersistence for FileSessionStore {
    fn read_slot(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn write_slot(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut slots = self.read_all()?;
        slots.insert(key.to_string(), value.to_string());
        self.write_all(&slots)
    }

    fn remove_slot(&self, key: &str) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut slots = self.read_all()?;
        if slots.remove(key).is_some() {
            self.write_all(&slots)?;
        }
        Ok(())
    }
}

/// Shared session provider: the in-memory session plus its persistence.
///
/// Cloning is cheap and every clone observes the same session.
#[derive(Clone)]
pub struct SessionHandle {
    current: Arc<RwLock<Option<AuthSession>>>,
    store: Arc<dyn SessionPersistence>,
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SessionHandle")
            .field("current", &self.session())
            .finish_non_exhaustive()
    }
}

impl SessionHandle {
    /// Loads the persisted session, if any.
    ///
    /// A half-written session (token without user or the reverse, or an
    /// unreadable user slot) is discarded and both slots are cleared.
    pub fn restore(store: Arc<dyn SessionPersistence>) -> Result<Self> {
        let token = store.read_slot(TOKEN_SLOT)?;
        let raw_user = store.read_slot(USER_SLOT)?;
        let user_slot_present = raw_user.is_some();
        let user = raw_user.and_then(|raw| match serde_json::from_str::<AuthUser>(&raw) {
            Ok(user) => Some(user),
            Err(error) => {
                tracing::warn!("Discarding unreadable persisted user: {}", error);
                None
            }
        });

        let session = match (token, user) {
            (Some(token), Some(user)) if !token.trim().is_empty() => {
                Some(AuthSession { token, user })
            }
            (None, None) if !user_slot_present => None,
            _ => {
                tracing::warn!("Persisted session is incomplete; clearing it");
                store.remove_slot(TOKEN_SLOT)?;
                store.remove_slot(USER_SLOT)?;
                None
            }
        };

        Ok(Self {
            current: Arc::new(RwLock::new(session)),
            store,
        })
    }

    /// Anonymous handle backed by process memory only.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            current: Arc::new(RwLock::new(None)),
            store: Arc::new(MemorySessionStore::new()),
        }
    }

    #[must_use]
    pub fn session(&self) -> Option<AuthSession> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|session| session.token.clone())
    }

    #[must_use]
    pub fn user(&self) -> Option<AuthUser> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|session| session.user.clone())
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Persists `session` and makes it current.
    pub fn establish(&self, session: AuthSession) -> Result<()> {
        let user = serde_json::to_string(&session.user)?;
        self.store.write_slot(TOKEN_SLOT, &session.token)?;
        if let Err(error) = self.store.write_slot(USER_SLOT, &user) {
            if let Err(rollback) = self.store.remove_slot(TOKEN_SLOT) {
                tracing::warn!("Failed to roll back persisted token: {}", rollback);
            }
            return Err(error);
        }
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
        Ok(())
    }

    /// Drops the in-memory session and clears both persisted slots.
    ///
    /// The in-memory session is gone even when clearing persistence fails.
    pub fn clear(&self) -> Result<()> {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
        let token_result = self.store.remove_slot(TOKEN_SLOT);
        let user_result = self.store.remove_slot(USER_SLOT);
        token_result.and(user_result)
    }
}
