//! Wires the session, router, API client, and stores for one CLI invocation.

use std::sync::Arc;

use journal_core::router::Location;
use journal_core::{
    ApiClient, AuthStore, ClientConfig, DiaryStore, Navigation, RouteName, Router, SessionHandle,
};

use crate::cli::GlobalArgs;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;
use crate::session_store::open_persistence;

pub struct App {
    pub profile_name: String,
    pub config: ClientConfig,
    pub session: SessionHandle,
    pub router: Router,
    pub auth: AuthStore,
    pub diaries: DiaryStore,
}

impl App {
    /// Resolve profile and base URL from flags, environment, and the profile file.
    pub fn open(global: &GlobalArgs) -> Result<Self, CliError> {
        let profiles = CliProfilesConfig::load().map_err(CliError::Config)?;
        let profile_name = profiles.resolve_profile_name(global.profile.as_deref());
        let config = profiles.client_config(&profile_name, global.api_url.clone())?;
        let session =
            SessionHandle::restore(open_persistence(global.session_file.as_deref(), &profile_name))?;
        Self::with_session(profile_name, config, session)
    }

    pub fn with_session(
        profile_name: String,
        config: ClientConfig,
        session: SessionHandle,
    ) -> Result<Self, CliError> {
        let router = Router::new(session.clone());
        let api = ApiClient::new(&config, session.clone())?
            .with_unauthorized_handler(Arc::new(router.clone()));
        tracing::debug!("Using {} (profile '{}')", api.base_url(), profile_name);

        Ok(Self {
            profile_name,
            config,
            session,
            auth: AuthStore::new(api.clone()),
            diaries: DiaryStore::new(api),
            router,
        })
    }

    /// Navigate to the view a command works on.
    ///
    /// Fails with [`CliError::NotSignedIn`] when the guard sends the user to login.
    pub fn enter(&self, path: &str) -> Result<Location, CliError> {
        match self.router.navigate(path) {
            Navigation::Allowed(location) => Ok(location),
            Navigation::Redirected {
                requested,
                location,
            } if location.name == RouteName::Login => Err(CliError::NotSignedIn {
                return_to: requested,
            }),
            Navigation::Redirected { location, .. } => Ok(location),
            Navigation::NotFound(path) => Err(CliError::RouteNotFound(path)),
        }
    }
}
