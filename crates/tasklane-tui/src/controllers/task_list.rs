use tasklane_client::ClientError;
use tasklane_core::task::{position_of, CreateTask, Task};
use tasklane_core::user::User;
use tracing::{debug, warn};

use super::Effect;
use crate::dispatch::{Command, Epoch};

pub const LOAD_FAILED: &str = "Failed to fetch data";
pub const CREATE_FAILED: &str = "Failed to add todo";
pub const TOGGLE_FAILED: &str = "Failed to toggle todo";
pub const DELETE_FAILED: &str = "Failed to delete todo";

/// Owns the signed-in user's task collection while the dashboard is
/// mounted.
///
/// Writes are confirmed, never optimistic: the collection only changes
/// when an outcome arrives, and then only with what the server returned.
#[derive(Debug, Default)]
pub struct TaskListController {
    epoch: Epoch,
    mounted: bool,
    tasks: Vec<Task>,
    user: Option<User>,
    loading: bool,
    creating: bool,
    draft: String,
    error: Option<String>,
}

impl TaskListController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh mount. Nothing survives from a previous mount.
    pub fn mount(&mut self) -> Command {
        self.epoch = self.epoch.next();
        self.mounted = true;
        self.tasks.clear();
        self.user = None;
        self.loading = true;
        self.creating = false;
        self.draft.clear();
        self.error = None;
        Command::LoadDashboard { epoch: self.epoch }
    }

    /// In-flight requests keep running; their outcomes will be dropped.
    pub fn unmount(&mut self) {
        self.epoch = self.epoch.next();
        self.mounted = false;
        self.loading = false;
        self.creating = false;
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// True while a create is in flight; further creates are refused.
    pub fn is_creating(&self) -> bool {
        self.creating
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn push_draft(&mut self, c: char) {
        self.draft.push(c);
    }

    pub fn pop_draft(&mut self) {
        self.draft.pop();
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Blank drafts and submissions during an in-flight create issue nothing.
    pub fn submit_create(&mut self) -> Option<Command> {
        if !self.mounted || self.creating {
            return None;
        }
        let request = CreateTask::new(&self.draft).ok()?;
        self.creating = true;
        self.error = None;
        Some(Command::CreateTask {
            epoch: self.epoch,
            request,
        })
    }

    pub fn request_toggle(&mut self, id: &str) -> Option<Command> {
        if !self.mounted {
            return None;
        }
        self.error = None;
        Some(Command::ToggleTask {
            epoch: self.epoch,
            id: id.to_string(),
        })
    }

    pub fn request_delete(&mut self, id: &str) -> Option<Command> {
        if !self.mounted {
            return None;
        }
        self.error = None;
        Some(Command::DeleteTask {
            epoch: self.epoch,
            id: id.to_string(),
        })
    }

    pub fn on_loaded(
        &mut self,
        epoch: Epoch,
        tasks: Result<Vec<Task>, ClientError>,
        user: Result<User, ClientError>,
    ) -> Effect {
        if !self.accepts(epoch, "load") {
            return Effect::None;
        }
        self.loading = false;
        let user_err = match user {
            Ok(user) => {
                self.user = Some(user);
                None
            }
            Err(e) => Some(e),
        };
        let err = match (tasks, user_err) {
            (Ok(tasks), None) => {
                debug!(count = tasks.len(), "tasks loaded");
                self.tasks = tasks;
                return Effect::None;
            }
            (Ok(_), Some(err)) | (Err(err), None) => err,
            // A rejected token outranks whatever else went wrong.
            (Err(tasks_err), Some(user_err)) => {
                if !tasks_err.is_auth_rejected() && user_err.is_auth_rejected() {
                    user_err
                } else {
                    tasks_err
                }
            }
        };
        self.tasks.clear();
        self.fail(err, LOAD_FAILED)
    }

    pub fn on_created(&mut self, epoch: Epoch, result: Result<Task, ClientError>) -> Effect {
        if !self.accepts(epoch, "create") {
            return Effect::None;
        }
        self.creating = false;
        match result {
            Ok(task) => {
                self.tasks.push(task);
                self.draft.clear();
                Effect::None
            }
            Err(err) => self.fail(err, CREATE_FAILED),
        }
    }

    pub fn on_toggled(&mut self, epoch: Epoch, id: &str, result: Result<Task, ClientError>) -> Effect {
        if !self.accepts(epoch, "toggle") {
            return Effect::None;
        }
        match result {
            Ok(task) => {
                match position_of(&self.tasks, id) {
                    Some(pos) => self.tasks[pos] = task,
                    None => debug!(id, "toggled task no longer in collection"),
                }
                Effect::None
            }
            Err(err) => self.fail(err, TOGGLE_FAILED),
        }
    }

    pub fn on_deleted(&mut self, epoch: Epoch, id: &str, result: Result<(), ClientError>) -> Effect {
        if !self.accepts(epoch, "delete") {
            return Effect::None;
        }
        match result {
            Ok(()) => {
                if let Some(pos) = position_of(&self.tasks, id) {
                    self.tasks.remove(pos);
                }
                Effect::None
            }
            Err(err) => self.fail(err, DELETE_FAILED),
        }
    }

    fn accepts(&self, epoch: Epoch, what: &str) -> bool {
        let current = self.mounted && epoch == self.epoch;
        if !current {
            debug!(what, "dropping stale task outcome");
        }
        current
    }

    fn fail(&mut self, err: ClientError, fallback: &str) -> Effect {
        warn!(error = %err, "{fallback}");
        self.error = Some(err.user_message(fallback));
        if err.is_auth_rejected() {
            Effect::SessionExpired
        } else {
            Effect::None
        }
    }
}
