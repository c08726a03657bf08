//! Request dispatch between the UI loop and the API.
//!
//! Controllers never await. A user action turns into a [`Command`], the
//! event loop hands it to the [`Dispatcher`], which runs it on the tokio
//! runtime and sends the [`Outcome`] back over a channel. Every command
//! carries the [`Epoch`] of the view instance that issued it; a controller
//! drops outcomes from an epoch that is no longer current.

use std::sync::Arc;

use tasklane_client::{ApiClient, ClientError};
use tasklane_core::auth::{LoginRequest, RegisterOutcome, RegisterRequest, TokenResponse};
use tasklane_core::task::{CreateTask, Task};
use tasklane_core::user::User;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

/// Identifies one mount of a view. Bumped on every mount and unmount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Epoch(u64);

impl Epoch {
    pub fn next(self) -> Self {
        Epoch(self.0.wrapping_add(1))
    }
}

#[derive(Debug, Clone)]
pub enum Command {
    Login { epoch: Epoch, request: LoginRequest },
    Register { epoch: Epoch, request: RegisterRequest },
    LoadDashboard { epoch: Epoch },
    CreateTask { epoch: Epoch, request: CreateTask },
    ToggleTask { epoch: Epoch, id: String },
    DeleteTask { epoch: Epoch, id: String },
    LoadUsers { epoch: Epoch },
}

#[derive(Debug, Clone)]
pub enum Outcome {
    LoggedIn {
        epoch: Epoch,
        result: Result<TokenResponse, ClientError>,
    },
    Registered {
        epoch: Epoch,
        result: Result<RegisterOutcome, ClientError>,
    },
    DashboardLoaded {
        epoch: Epoch,
        tasks: Result<Vec<Task>, ClientError>,
        user: Result<User, ClientError>,
    },
    TaskCreated {
        epoch: Epoch,
        result: Result<Task, ClientError>,
    },
    TaskToggled {
        epoch: Epoch,
        id: String,
        result: Result<Task, ClientError>,
    },
    TaskDeleted {
        epoch: Epoch,
        id: String,
        result: Result<(), ClientError>,
    },
    UsersLoaded {
        epoch: Epoch,
        result: Result<Vec<User>, ClientError>,
    },
}

/// Perform one command against the API.
pub async fn execute(api: &dyn ApiClient, command: Command) -> Outcome {
    match command {
        Command::Login { epoch, request } => Outcome::LoggedIn {
            epoch,
            result: api.login(&request).await,
        },
        Command::Register { epoch, request } => Outcome::Registered {
            epoch,
            result: api.register(&request).await,
        },
        Command::LoadDashboard { epoch } => {
            let (tasks, user) = tokio::join!(api.list_tasks(), api.current_user());
            Outcome::DashboardLoaded { epoch, tasks, user }
        }
        Command::CreateTask { epoch, request } => Outcome::TaskCreated {
            epoch,
            result: api.create_task(&request).await,
        },
        Command::ToggleTask { epoch, id } => {
            let result = api.toggle_task(&id).await;
            Outcome::TaskToggled { epoch, id, result }
        }
        Command::DeleteTask { epoch, id } => {
            let result = api.delete_task(&id).await;
            Outcome::TaskDeleted { epoch, id, result }
        }
        Command::LoadUsers { epoch } => Outcome::UsersLoaded {
            epoch,
            result: api.list_users().await,
        },
    }
}

/// Runs commands on a tokio runtime and collects their outcomes.
pub struct Dispatcher {
    api: Arc<dyn ApiClient>,
    handle: Handle,
    tx: mpsc::UnboundedSender<Outcome>,
    rx: mpsc::UnboundedReceiver<Outcome>,
}

impl Dispatcher {
    pub fn new(api: Arc<dyn ApiClient>, handle: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            api,
            handle,
            tx,
            rx,
        }
    }

    /// Start a command. Returns immediately; the outcome arrives later
    /// through [`Dispatcher::try_next`].
    pub fn submit(&self, command: Command) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            let outcome = execute(api.as_ref(), command).await;
            // The receiver only goes away at shutdown.
            let _ = tx.send(outcome);
        });
    }

    pub fn try_next(&mut self) -> Option<Outcome> {
        self.rx.try_recv().ok()
    }
}
