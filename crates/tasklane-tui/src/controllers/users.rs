use tasklane_client::ClientError;
use tasklane_core::user::User;
use tracing::{debug, warn};

use super::Effect;
use crate::dispatch::{Command, Epoch};

pub const LOAD_FAILED: &str = "Failed to load users";

/// Read-only list of every registered account.
#[derive(Debug, Default)]
pub struct UserDirectory {
    epoch: Epoch,
    mounted: bool,
    users: Vec<User>,
    loading: bool,
    error: Option<String>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(&mut self) -> Command {
        self.epoch = self.epoch.next();
        self.mounted = true;
        self.users.clear();
        self.loading = true;
        self.error = None;
        Command::LoadUsers { epoch: self.epoch }
    }

    pub fn unmount(&mut self) {
        self.epoch = self.epoch.next();
        self.mounted = false;
        self.loading = false;
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn on_loaded(&mut self, epoch: Epoch, result: Result<Vec<User>, ClientError>) -> Effect {
        if !self.mounted || epoch != self.epoch {
            debug!("dropping stale user list");
            return Effect::None;
        }
        self.loading = false;
        match result {
            Ok(users) => {
                self.users = users;
                Effect::None
            }
            Err(err) => {
                warn!(error = %err, "{LOAD_FAILED}");
                self.error = Some(err.user_message(LOAD_FAILED));
                if err.is_auth_rejected() {
                    Effect::SessionExpired
                } else {
                    Effect::None
                }
            }
        }
    }
}
