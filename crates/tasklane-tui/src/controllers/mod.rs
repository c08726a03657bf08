//! View controllers.
//!
//! Each controller owns the state of one screen. User actions go in as
//! method calls and come out as [`Command`](crate::dispatch::Command)s;
//! request outcomes come back through `on_*` methods, which return an
//! [`Effect`] for the app to carry out.

pub mod auth_forms;
pub mod task_list;
pub mod users;

use tasklane_core::Route;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// The server refused our token. End the session.
    SessionExpired,
    Navigate {
        route: Route,
        notice: Option<String>,
    },
}

pub use auth_forms::{LoginField, LoginForm, RegisterField, RegisterForm};
pub use task_list::TaskListController;
pub use users::UserDirectory;
