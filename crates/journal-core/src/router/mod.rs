//! View routing with an authentication guard.
//!
//! Paths map to views through a fixed table. Every navigation consults the
//! shared session: anonymous users are sent to the login view with the
//! requested path as return target, and signed-in users never land on login.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::api::UnauthorizedHandler;
use crate::auth::SessionHandle;
use crate::models::DiaryId;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";
/// Query parameter carrying the path to return to after login.
pub const REDIRECT_PARAM: &str = "redirect";
/// Title used when a route carries none.
pub const DEFAULT_TITLE: &str = "My Diary";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteName {
    Login,
    List,
    New,
    Detail,
    Edit,
}

/// One row of the routing table. `:id` segments match diary identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDef {
    pub name: RouteName,
    pub pattern: &'static str,
    pub public: bool,
    pub title: Option<&'static str>,
}

/// The application's routes, in match order.
#[must_use]
pub fn default_routes() -> Vec<RouteDef> {
    vec![
        RouteDef {
            name: RouteName::Login,
            pattern: LOGIN_PATH,
            public: true,
            title: Some("Sign In"),
        },
        RouteDef {
            name: RouteName::List,
            pattern: HOME_PATH,
            public: false,
            title: Some("My Diary"),
        },
        RouteDef {
            name: RouteName::New,
            pattern: "/diary/new",
            public: false,
            title: Some("Write Diary"),
        },
        RouteDef {
            name: RouteName::Detail,
            pattern: "/diary/:id",
            public: false,
            title: Some("Diary Detail"),
        },
        RouteDef {
            name: RouteName::Edit,
            pattern: "/diary/:id/edit",
            public: false,
            title: Some("Edit Diary"),
        },
    ]
}

/// A resolved view location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub name: RouteName,
    pub path: String,
    pub diary_id: Option<DiaryId>,
    pub query: BTreeMap<String, String>,
    pub title: String,
}

impl Location {
    /// Path plus encoded query string.
    #[must_use]
    pub fn full_path(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let mut rendered = self.path.clone();
        for (index, (key, value)) in self.query.iter().enumerate() {
            rendered.push(if index == 0 { '?' } else { '&' });
            let _ = write!(
                rendered,
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            );
        }
        rendered
    }

    pub fn redirect_target(&self) -> Option<&str> {
        self.query.get(REDIRECT_PARAM).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Allowed(Location),
    Redirected { requested: String, location: Location },
    NotFound(String),
}

impl Navigation {
    /// The location the router ended up at, if any.
    pub const fn location(&self) -> Option<&Location> {
        match self {
            Self::Allowed(location) | Self::Redirected { location, .. } => Some(location),
            Self::NotFound(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct Router {
    routes: Arc<Vec<RouteDef>>,
    session: SessionHandle,
    current: Arc<Mutex<Option<Location>>>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Router")
            .field("routes", &self.routes.len())
            .field("current", &*self.current())
            .finish_non_exhaustive()
    }
}

impl Router {
    pub fn new(session: SessionHandle) -> Self {
        Self::with_routes(default_routes(), session)
    }

    pub fn with_routes(routes: Vec<RouteDef>, session: SessionHandle) -> Self {
        Self {
            routes: Arc::new(routes),
            session,
            current: Arc::new(Mutex::new(None)),
        }
    }

    /// Attempt to move to `target`, applying the authentication guard.
    pub fn navigate(&self, target: &str) -> Navigation {
        let Some((route, location)) = self.resolve(target) else {
            tracing::debug!("No route for {}", target);
            return Navigation::NotFound(target.to_string());
        };

        let authenticated = self.session.is_authenticated();
        let redirect_to = if !authenticated && !route.public {
            Some(login_path_for(&location.full_path()))
        } else if authenticated && route.name == RouteName::Login {
            Some(HOME_PATH.to_string())
        } else {
            None
        };

        let Some(redirect_to) = redirect_to else {
            self.set_current(location.clone());
            return Navigation::Allowed(location);
        };

        let Some((_, redirected)) = self.resolve(&redirect_to) else {
            return Navigation::NotFound(redirect_to);
        };
        tracing::debug!("Redirecting {} to {}", target, redirected.full_path());
        self.set_current(redirected.clone());
        Navigation::Redirected {
            requested: location.full_path(),
            location: redirected,
        }
    }

    /// Match `target` against the table without running the guard.
    pub fn resolve(&self, target: &str) -> Option<(RouteDef, Location)> {
        let (raw_path, raw_query) = target.split_once('?').unwrap_or((target, ""));
        let path = normalize_path(raw_path);
        let segments = path_segments(&path);

        self.routes.iter().find_map(|route| {
            let diary_id = match_pattern(route.pattern, &segments)?;
            Some((
                route.clone(),
                Location {
                    name: route.name,
                    path: path.clone(),
                    diary_id,
                    query: parse_query(raw_query),
                    title: route.title.unwrap_or(DEFAULT_TITLE).to_string(),
                },
            ))
        })
    }

    pub fn current(&self) -> MutexGuard<'_, Option<Location>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn current_location(&self) -> Option<Location> {
        self.current().clone()
    }

    /// View title of the current location.
    pub fn title(&self) -> String {
        self.current()
            .as_ref()
            .map_or_else(|| DEFAULT_TITLE.to_string(), |location| location.title.clone())
    }

    /// Where to go after a successful login: the saved return target when it
    /// is a local path, otherwise the list view.
    pub fn post_login_target(&self) -> String {
        self.current()
            .as_ref()
            .filter(|location| location.name == RouteName::Login)
            .and_then(Location::redirect_target)
            .filter(|target| is_local_path(target))
            .map_or_else(|| HOME_PATH.to_string(), ToString::to_string)
    }

    fn set_current(&self, location: Location) {
        *self.current() = Some(location);
    }
}

impl UnauthorizedHandler for Router {
    fn on_unauthorized(&self) {
        let return_to = self
            .current()
            .as_ref()
            .filter(|location| location.name != RouteName::Login)
            .map(Location::full_path);
        let target = return_to.map_or_else(|| LOGIN_PATH.to_string(), |path| login_path_for(&path));

        if let Some((_, location)) = self.resolve(&target) {
            self.set_current(location);
        }
    }
}

fn login_path_for(return_to: &str) -> String {
    format!(
        "{LOGIN_PATH}?{REDIRECT_PARAM}={}",
        urlencoding::encode(return_to)
    )
}

fn is_local_path(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//")
}

fn normalize_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        HOME_PATH.to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn path_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

/// Returns `Some(id)` on a match; the inner option is set for `:id` routes.
#[allow(clippy::option_option)]
fn match_pattern(pattern: &str, segments: &[&str]) -> Option<Option<DiaryId>> {
    let expected = path_segments(pattern);
    if expected.len() != segments.len() {
        return None;
    }

    let mut diary_id = None;
    for (want, got) in expected.iter().zip(segments) {
        if *want == ":id" {
            diary_id = Some(got.parse::<DiaryId>().ok()?);
        } else if want != got {
            return None;
        }
    }
    Some(diary_id)
}

fn parse_query(raw: &str) -> BTreeMap<String, String> {
    raw.split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = urlencoding::decode(key).ok()?.into_owned();
            let value = urlencoding::decode(value).ok()?.into_owned();
            Some((key, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthSession, AuthUser};
    use pretty_assertions::assert_eq;

    fn signed_in() -> SessionHandle {
        let session = SessionHandle::in_memory();
        session
            .establish(AuthSession {
                token: "abc".to_string(),
                user: AuthUser {
                    id: 1,
                    username: "alice".to_string(),
                },
            })
            .unwrap();
        session
    }

    #[test]
    fn new_diary_path_wins_over_detail_pattern() {
        let router = Router::new(signed_in());
        let (route, location) = router.resolve("/diary/new").unwrap();
        assert_eq!(route.name, RouteName::New);
        assert_eq!(location.diary_id, None);
    }

    #[test]
    fn detail_and_edit_capture_diary_id() {
        let router = Router::new(signed_in());
        let (_, detail) = router.resolve("/diary/42").unwrap();
        assert_eq!(detail.name, RouteName::Detail);
        assert_eq!(detail.diary_id, Some(DiaryId::new(42)));

        let (_, edit) = router.resolve("/diary/42/edit/").unwrap();
        assert_eq!(edit.name, RouteName::Edit);
        assert_eq!(edit.path, "/diary/42/edit");
    }

    #[test]
    fn non_numeric_id_is_not_found() {
        let router = Router::new(signed_in());
        assert_eq!(
            router.navigate("/diary/abc"),
            Navigation::NotFound("/diary/abc".to_string())
        );
        assert_eq!(router.current_location(), None);
    }

    #[test]
    fn anonymous_user_is_sent_to_login_with_return_target() {
        let router = Router::new(SessionHandle::in_memory());

        let navigation = router.navigate("/diary/7/edit");

        let Navigation::Redirected { requested, location } = navigation else {
            panic!("expected redirect, got {navigation:?}");
        };
        assert_eq!(requested, "/diary/7/edit");
        assert_eq!(location.name, RouteName::Login);
        assert_eq!(location.redirect_target(), Some("/diary/7/edit"));
        assert_eq!(location.full_path(), "/login?redirect=%2Fdiary%2F7%2Fedit");
        assert_eq!(router.title(), "Sign In");
        assert_eq!(router.post_login_target(), "/diary/7/edit");
    }

    #[test]
    fn anonymous_user_may_open_login() {
        let router = Router::new(SessionHandle::in_memory());
        let navigation = router.navigate("/login");
        assert!(matches!(navigation, Navigation::Allowed(_)));
        assert_eq!(router.post_login_target(), HOME_PATH);
    }

    #[test]
    fn signed_in_user_is_kept_away_from_login() {
        let router = Router::new(signed_in());

        let navigation = router.navigate("/login?redirect=%2Fdiary%2F3");

        let location = navigation.location().unwrap();
        assert_eq!(location.name, RouteName::List);
        assert!(matches!(navigation, Navigation::Redirected { .. }));
        assert_eq!(router.title(), "My Diary");
    }

    #[test]
    fn signed_in_user_reaches_protected_views() {
        let router = Router::new(signed_in());
        let navigation = router.navigate("/diary/new");
        assert!(matches!(navigation, Navigation::Allowed(_)));
        assert_eq!(router.title(), "Write Diary");
    }

    #[test]
    fn route_without_title_uses_default() {
        let routes = vec![RouteDef {
            name: RouteName::List,
            pattern: HOME_PATH,
            public: true,
            title: None,
        }];
        let router = Router::with_routes(routes, SessionHandle::in_memory());
        router.navigate("/");
        assert_eq!(router.title(), DEFAULT_TITLE);
    }

    #[test]
    fn post_login_target_ignores_foreign_hosts() {
        let router = Router::new(SessionHandle::in_memory());
        router.navigate("/login?redirect=%2F%2Fevil.example.com");
        assert_eq!(router.post_login_target(), HOME_PATH);
    }

    #[test]
    fn unauthorized_moves_to_login_remembering_current_view() {
        let session = signed_in();
        let router = Router::new(session.clone());
        router.navigate("/diary/9");

        session.clear().unwrap();
        router.on_unauthorized();

        let location = router.current_location().unwrap();
        assert_eq!(location.name, RouteName::Login);
        assert_eq!(location.redirect_target(), Some("/diary/9"));
    }
}
