//! Pages and navigation. Each page module drives one screen of the client:
//! it validates input, calls the API, and feeds the outcome into the session
//! controller, the notification channel and the navigator.

pub mod account;
pub mod activation;
pub mod confirmation;
pub mod forgot_password;
pub mod google_auth;
pub mod home;
pub mod reset_password;
pub mod sign_in;
pub mod sign_up;
pub mod users;

use crate::features::auth::{
    guards::{self, Access},
    types::Session,
};
use std::fmt;
use tokio::sync::watch;
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    Users,
    SignUp,
    SignIn,
    ForgotPassword,
    ResetPassword(String),
    GoogleAuth,
    Activate(String),
    Confirmation(String),
    NotFound(String),
}

impl Route {
    /// Every routable pattern with its access rule, in menu order.
    pub const PATTERNS: &'static [(&'static str, Access)] = &[
        ("/", Access::Always),
        ("/users", Access::Always),
        ("/sign-up", Access::AnonymousOnly),
        ("/sign-in", Access::AnonymousOnly),
        ("/forgot-password", Access::AnonymousOnly),
        ("/reset-password/:token", Access::AnonymousOnly),
        ("/google-auth", Access::AnonymousOnly),
        ("/activate/:token", Access::Always),
        ("/confirmation/:token", Access::Always),
    ];

    /// Parses a location such as `/activate/abc?x=1#y`; query and fragment are ignored.
    #[must_use]
    pub fn parse(location: &str) -> Self {
        let path = location
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Home,
            ["users"] => Route::Users,
            ["sign-up"] => Route::SignUp,
            ["sign-in"] => Route::SignIn,
            ["forgot-password"] => Route::ForgotPassword,
            ["reset-password", token] => Route::ResetPassword((*token).to_string()),
            ["google-auth"] => Route::GoogleAuth,
            ["activate", token] => Route::Activate((*token).to_string()),
            ["confirmation", token] => Route::Confirmation((*token).to_string()),
            _ => Route::NotFound(format!("/{}", segments.join("/"))),
        }
    }

    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Users => "/users".to_string(),
            Route::SignUp => "/sign-up".to_string(),
            Route::SignIn => "/sign-in".to_string(),
            Route::ForgotPassword => "/forgot-password".to_string(),
            Route::ResetPassword(token) => format!("/reset-password/{token}"),
            Route::GoogleAuth => "/google-auth".to_string(),
            Route::Activate(token) => format!("/activate/{token}"),
            Route::Confirmation(token) => format!("/confirmation/{token}"),
            Route::NotFound(path) => path.clone(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.path())
    }
}

/// Current location, resolved against the route guard on every navigation.
#[derive(Clone)]
pub struct Navigator {
    location: watch::Sender<Route>,
    session: watch::Receiver<Session>,
}

impl Navigator {
    #[must_use]
    pub fn new(session: watch::Receiver<Session>) -> Self {
        let (location, _) = watch::channel(Route::Home);
        Self { location, session }
    }

    fn authenticated(&self) -> bool {
        self.session.borrow().is_authenticated()
    }

    /// Moves to `route`, or to not-found when the guard hides it. Returns where we landed.
    pub fn navigate(&self, route: Route) -> Route {
        let resolved = guards::resolve(route, self.authenticated());
        debug!(route = %route_pattern(&resolved), "navigate");
        self.location.send_replace(resolved.clone());
        resolved
    }

    pub fn navigate_to(&self, location: &str) -> Route {
        self.navigate(Route::parse(location))
    }

    /// Re-applies the guard to the current location after a session change.
    pub fn revalidate(&self) -> Route {
        let current = self.current();
        let resolved = guards::resolve(current.clone(), self.authenticated());
        if resolved != current {
            self.location.send_replace(resolved.clone());
        }
        resolved
    }

    #[must_use]
    pub fn current(&self) -> Route {
        self.location.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.location.subscribe()
    }

    #[must_use]
    pub fn navigable_patterns(&self) -> Vec<&'static str> {
        guards::navigable_patterns(self.authenticated())
    }
}

/// Pattern form of a route, safe to log because tokens are elided.
fn route_pattern(route: &Route) -> String {
    match route {
        Route::ResetPassword(_) => "/reset-password/:token".to_string(),
        Route::Activate(_) => "/activate/:token".to_string(),
        Route::Confirmation(_) => "/confirmation/:token".to_string(),
        other => other.path(),
    }
}
