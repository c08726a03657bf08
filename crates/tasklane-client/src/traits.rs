use async_trait::async_trait;
use tasklane_core::auth::{LoginRequest, RegisterOutcome, RegisterRequest, TokenResponse};
use tasklane_core::task::{CreateTask, Task};
use tasklane_core::user::User;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The request never produced a response.
    #[error("network failure: {0}")]
    Network(String),

    /// 401/403: missing, expired or wrong credentials.
    #[error("authorization rejected ({status}): {}", display_message(.message))]
    AuthRejected { status: u16, message: Option<String> },

    /// Any other 4xx, e.g. a duplicate email on registration.
    #[error("request rejected ({status}): {}", display_message(.message))]
    ValidationRejected { status: u16, message: Option<String> },

    /// 5xx, undecodable bodies and everything else.
    #[error("unexpected response{}: {}", display_status(.status), display_message(.message))]
    Unknown {
        status: Option<u16>,
        message: Option<String>,
    },
}

fn display_message(message: &Option<String>) -> &str {
    message.as_deref().unwrap_or("no message")
}

fn display_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({s})")).unwrap_or_default()
}

impl ClientError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        match status {
            401 | 403 => ClientError::AuthRejected { status, message },
            400..=499 => ClientError::ValidationRejected { status, message },
            _ => ClientError::Unknown {
                status: Some(status),
                message,
            },
        }
    }

    /// The message the server put in its error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Network(_) => None,
            ClientError::AuthRejected { message, .. }
            | ClientError::ValidationRejected { message, .. }
            | ClientError::Unknown { message, .. } => message.as_deref(),
        }
    }

    /// Short text for the user: the server's message, else `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(fallback)
            .to_string()
    }

    pub fn is_auth_rejected(&self) -> bool {
        matches!(self, ClientError::AuthRejected { .. })
    }
}

/// Typed operations against the todo API.
///
/// Controllers program against this trait. `HttpClient` is the real
/// implementation; tests substitute in-memory fakes. Every call is a single
/// attempt with no retry.
#[async_trait]
pub trait ApiClient: Send + Sync {
    // -- Auth (unauthenticated) --
    async fn register(&self, input: &RegisterRequest) -> Result<RegisterOutcome, ClientError>;
    async fn login(&self, input: &LoginRequest) -> Result<TokenResponse, ClientError>;

    // -- Users --
    async fn current_user(&self) -> Result<User, ClientError>;
    async fn list_users(&self) -> Result<Vec<User>, ClientError>;

    // -- Tasks --
    async fn list_tasks(&self) -> Result<Vec<Task>, ClientError>;
    async fn create_task(&self, input: &CreateTask) -> Result<Task, ClientError>;
    async fn toggle_task(&self, id: &str) -> Result<Task, ClientError>;
    async fn delete_task(&self, id: &str) -> Result<(), ClientError>;
}
