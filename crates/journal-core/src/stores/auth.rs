//! Authentication store.
//!
//! Two states: anonymous (no token) and authenticated. Only a successful
//! [`AuthStore::login`] authenticates; [`AuthStore::logout`] or a 401 from any
//! authenticated request returns to anonymous.

use std::sync::{Arc, Mutex, PoisonError};

use super::LoadingTracker;
use crate::api::ApiClient;
use crate::auth::{AuthSession, AuthUser, LoginRequest, SessionHandle};
use crate::{Error, Result};

const LOGIN_FAILED: &str = "Login failed";

#[derive(Debug, Clone)]
pub struct AuthStore {
    api: ApiClient,
    session: SessionHandle,
    loading: LoadingTracker,
    error: Arc<Mutex<Option<String>>>,
}

impl AuthStore {
    /// Builds the store on the session provider the client was given.
    pub fn new(api: ApiClient) -> Self {
        let session = api.session().clone();
        Self {
            api,
            session,
            loading: LoadingTracker::default(),
            error: Arc::new(Mutex::new(None)),
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthSession> {
        let _loading = self.loading.begin();
        self.set_error(None);

        match self.try_login(username, password).await {
            Ok(session) => Ok(session),
            Err(error) => {
                self.set_error(Some(error.user_message(LOGIN_FAILED)));
                Err(error)
            }
        }
    }

    /// Forget the session locally. Makes no network call.
    pub fn logout(&self) -> Result<()> {
        let username = self.session.user().map(|user| user.username);
        self.session.clear()?;
        if let Some(username) = username {
            tracing::info!("Signed out {}", username);
        }
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn token(&self) -> Option<String> {
        self.session.token()
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.session.user()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn try_login(&self, username: &str, password: &str) -> Result<AuthSession> {
        let username = username.trim();
        if username.is_empty() {
            return Err(Error::InvalidInput("Username is required".to_string()));
        }
        if password.is_empty() {
            return Err(Error::InvalidInput("Password is required".to_string()));
        }

        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let session = AuthSession::from(self.api.login(&request).await?);
        self.session.establish(session.clone())?;
        tracing::info!("Signed in as {}", session.user.username);
        Ok(session)
    }

    fn set_error(&self, message: Option<String>) {
        *self.error.lock().unwrap_or_else(PoisonError::into_inner) = message;
    }
}
