use tasklane_client::{Session, SessionEvents};
use tasklane_core::route::{resolve, AuthState, Route, View};
use tracing::debug;

/// Tracks the requested route and gates it on the live session.
///
/// The auth state starts out unknown and is read from the session on the
/// first [`Router::current_view`]. Every later call picks up token changes
/// made anywhere else in the process.
pub struct Router {
    requested: Route,
    state: AuthState,
    events: SessionEvents,
    notice: Option<String>,
}

impl Router {
    pub fn new(session: &Session, initial: Route) -> Self {
        Self {
            requested: initial,
            state: AuthState::Unknown,
            events: session.subscribe(),
            notice: None,
        }
    }

    pub fn navigate(&mut self, route: Route) {
        debug!(from = %self.requested, to = %route, "navigate");
        self.requested = route;
        self.notice = None;
    }

    /// Navigate and hand a one-time message to the destination.
    pub fn navigate_with_notice(&mut self, route: Route, notice: String) {
        self.navigate(route);
        self.notice = Some(notice);
    }

    pub fn requested(&self) -> &Route {
        &self.requested
    }

    pub fn auth_state(&self) -> AuthState {
        self.state
    }

    fn refresh(&mut self) {
        let authenticated = match self.events.poll_change() {
            Some(authenticated) => authenticated,
            None => self.events.is_authenticated(),
        };
        self.state = AuthState::from_token_present(authenticated);
    }

    /// Resolve what to show right now, following redirects. The requested
    /// route is rewritten to where the redirects ended up.
    pub fn current_view(&mut self) -> Option<View> {
        self.refresh();
        let view = resolve(&self.requested, self.state)?;
        let landed = view.route();
        if landed != self.requested {
            debug!(from = %self.requested, to = %landed, "redirect");
            self.requested = landed;
        }
        Some(view)
    }

    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }
}
