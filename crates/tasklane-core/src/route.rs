//! Route table and the auth gate in front of it.
//!
//! Everything here is pure: the caller supplies the current [`AuthState`]
//! and gets back a [`Decision`]. Nothing is cached between calls, so a
//! token appearing or disappearing between two navigations is always
//! reflected in the next decision.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Root,
    Login,
    Register,
    Dashboard,
    Users,
    NotFound(String),
}

impl Route {
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Route::Root,
            "/login" => Route::Login,
            "/register" => Route::Register,
            "/dashboard" => Route::Dashboard,
            "/users" => Route::Users,
            other => Route::NotFound(other.to_string()),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Route::Root => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
            Route::Users => "/users",
            Route::NotFound(p) => p.as_str(),
        }
    }

    /// Reachable only without a session.
    pub fn is_public(&self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }

    /// Reachable only with a session.
    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Dashboard | Route::Users)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// Before the first look at the session.
    Unknown,
    Authenticated,
    Unauthenticated,
}

impl AuthState {
    pub fn from_token_present(present: bool) -> Self {
        if present {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        }
    }
}

/// A screen that can actually be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Register,
    Dashboard,
    Users,
}

impl View {
    pub fn route(&self) -> Route {
        match self {
            View::Login => Route::Login,
            View::Register => Route::Register,
            View::Dashboard => Route::Dashboard,
            View::Users => Route::Users,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Render(View),
    Redirect(Route),
    /// Auth state not known yet; render nothing.
    Pending,
}

/// The protected landing view.
pub const HOME: Route = Route::Dashboard;

pub fn decide(route: &Route, state: AuthState) -> Decision {
    if state == AuthState::Unknown {
        return Decision::Pending;
    }
    let authenticated = state == AuthState::Authenticated;
    match route {
        Route::Root if authenticated => Decision::Redirect(HOME),
        Route::Root => Decision::Redirect(Route::Login),
        Route::NotFound(_) => Decision::Redirect(Route::Root),
        r if r.is_public() && authenticated => Decision::Redirect(HOME),
        r if r.is_protected() && !authenticated => Decision::Redirect(Route::Login),
        Route::Login => Decision::Render(View::Login),
        Route::Register => Decision::Render(View::Register),
        Route::Dashboard => Decision::Render(View::Dashboard),
        Route::Users => Decision::Render(View::Users),
    }
}

/// Follow redirects until a view renders. Returns `None` while the auth
/// state is unknown.
pub fn resolve(route: &Route, state: AuthState) -> Option<View> {
    let mut current = route.clone();
    // The table never needs more than three hops (unknown -> root -> login/home).
    for _ in 0..4 {
        match decide(&current, state) {
            Decision::Render(view) => return Some(view),
            Decision::Redirect(next) => current = next,
            Decision::Pending => return None,
        }
    }
    None
}
