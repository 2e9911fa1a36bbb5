use crate::routes::Route;

/// Who may reach a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// Reachable in every session state.
    Always,
    /// Absent from the navigable set once a session exists.
    AnonymousOnly,
}

#[must_use]
pub fn access(route: &Route) -> Access {
    match route {
        Route::SignUp
        | Route::SignIn
        | Route::ForgotPassword
        | Route::ResetPassword(_)
        | Route::GoogleAuth => Access::AnonymousOnly,
        // Activation and confirmation links arrive by email and must work in any state.
        Route::Home
        | Route::Users
        | Route::Activate(_)
        | Route::Confirmation(_)
        | Route::NotFound(_) => Access::Always,
    }
}

/// UX-only guard; real access control must live on the API.
#[must_use]
pub fn is_reachable(route: &Route, authenticated: bool) -> bool {
    match access(route) {
        Access::Always => true,
        Access::AnonymousOnly => !authenticated,
    }
}

/// Unreachable routes are not redirected; they resolve to not-found.
#[must_use]
pub fn resolve(route: Route, authenticated: bool) -> Route {
    if is_reachable(&route, authenticated) {
        route
    } else {
        Route::NotFound(route.path())
    }
}

/// Route patterns of the navigable set for the given session state.
#[must_use]
pub fn navigable_patterns(authenticated: bool) -> Vec<&'static str> {
    Route::PATTERNS
        .iter()
        .filter(|(_, access)| *access == Access::Always || !authenticated)
        .map(|(pattern, _)| *pattern)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_routes() -> Vec<Route> {
        vec![
            Route::Home,
            Route::Users,
            Route::SignUp,
            Route::SignIn,
            Route::ForgotPassword,
            Route::ResetPassword("rt".to_string()),
            Route::GoogleAuth,
            Route::Activate("at".to_string()),
            Route::Confirmation("ct".to_string()),
        ]
    }

    #[test]
    fn anonymous_reaches_everything() {
        for route in all_routes() {
            assert!(is_reachable(&route, false), "{route:?}");
        }
    }

    #[test]
    fn authenticated_loses_anonymous_only_routes() {
        let reachable: Vec<Route> = all_routes()
            .into_iter()
            .filter(|route| is_reachable(route, true))
            .collect();

        assert_eq!(
            reachable,
            vec![
                Route::Home,
                Route::Users,
                Route::Activate("at".to_string()),
                Route::Confirmation("ct".to_string()),
            ]
        );
    }

    #[test]
    fn resolve_turns_absent_routes_into_not_found() {
        assert_eq!(
            resolve(Route::SignIn, true),
            Route::NotFound("/sign-in".to_string())
        );
        assert_eq!(resolve(Route::SignIn, false), Route::SignIn);
    }

    #[test]
    fn navigable_patterns_by_state() {
        assert_eq!(
            navigable_patterns(true),
            vec!["/", "/users", "/activate/:token", "/confirmation/:token"]
        );
        assert_eq!(navigable_patterns(false).len(), Route::PATTERNS.len());
    }
}
