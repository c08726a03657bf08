pub mod auth;
pub mod error;
pub mod route;
pub mod task;
pub mod user;
mod wire;

pub use error::CoreError;
pub use route::{AuthState, Decision, Route, View};
pub use task::{CreateTask, Task};
pub use user::User;
