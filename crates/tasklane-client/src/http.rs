use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tasklane_core::auth::{LoginRequest, RegisterOutcome, RegisterRequest, TokenResponse};
use tasklane_core::task::{CreateTask, Task};
use tasklane_core::user::User;
use tracing::{debug, warn};

use crate::{ApiClient, ClientError, Session};

/// Async HTTP client for the todo API.
///
/// Reads the bearer token from the shared [`Session`] at request time, so
/// a login or logout takes effect on the very next call.
pub struct HttpClient {
    base_url: String,
    client: Client,
    session: Session,
}

impl HttpClient {
    pub fn new(base_url: &str, session: Session) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Client::new(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Attach `Authorization: Bearer` when a token is present. Without one
    /// the header is left off and the server decides.
    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, method: &str, path: &str, builder: RequestBuilder) -> Result<Response, ClientError> {
        debug!(method, path, "request");
        let resp = builder.send().await.map_err(|e| {
            warn!(method, path, error = %e, "request failed");
            ClientError::Network(e.to_string())
        })?;
        debug!(method, path, status = resp.status().as_u16(), "response");
        Ok(resp)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let builder = self.with_auth(self.client.get(self.url(path)));
        let resp = self.send("GET", path, builder).await?;
        handle_response(resp).await
    }

    async fn post_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let builder = self.with_auth(self.client.post(self.url(path)).json(body));
        let resp = self.send("POST", path, builder).await?;
        handle_response(resp).await
    }

    async fn put_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let builder = self.with_auth(self.client.put(self.url(path)).json(body));
        let resp = self.send("PUT", path, builder).await?;
        handle_response(resp).await
    }

    async fn delete_req(&self, path: &str) -> Result<(), ClientError> {
        let builder = self.with_auth(self.client.delete(self.url(path)));
        let resp = self.send("DELETE", path, builder).await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(parse_error(resp).await)
        }
    }

    /// POST without credentials, for the auth endpoints.
    async fn post_public(&self, path: &str, body: &impl serde::Serialize) -> Result<Response, ClientError> {
        let builder = self.client.post(self.url(path)).json(body);
        self.send("POST", path, builder).await
    }
}

async fn handle_response<T: serde::de::DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let status = resp.status();
    if status.is_success() {
        resp.json::<T>().await.map_err(|e| {
            warn!(status = status.as_u16(), error = %e, "undecodable response body");
            ClientError::Unknown {
                status: Some(status.as_u16()),
                message: None,
            }
        })
    } else {
        Err(parse_error_with_status(status, resp).await)
    }
}

async fn parse_error(resp: Response) -> ClientError {
    let status = resp.status();
    parse_error_with_status(status, resp).await
}

async fn parse_error_with_status(status: StatusCode, resp: Response) -> ClientError {
    let body = resp.text().await.unwrap_or_default();
    ClientError::from_status(status.as_u16(), server_message(&body))
}

/// Pull a human-readable message out of an error body: JSON `message`,
/// then JSON `error`.
pub(crate) fn server_message(body: &str) -> Option<String> {
    let value = serde_json::from_str::<serde_json::Value>(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value[*key].as_str())
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
}

#[async_trait]
impl ApiClient for HttpClient {
    async fn register(&self, input: &RegisterRequest) -> Result<RegisterOutcome, ClientError> {
        let resp = self.post_public("/api/auth/register", input).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(parse_error_with_status(status, resp).await);
        }
        // Some server builds answer 201 with no body at all.
        let body = resp
            .text()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        if body.trim().is_empty() {
            return Ok(RegisterOutcome::Acknowledged(serde_json::Value::Null));
        }
        serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, "undecodable register response");
            ClientError::Unknown {
                status: Some(status.as_u16()),
                message: None,
            }
        })
    }

    async fn login(&self, input: &LoginRequest) -> Result<TokenResponse, ClientError> {
        let resp = self.post_public("/api/auth/login", input).await?;
        handle_response(resp).await
    }

    async fn current_user(&self) -> Result<User, ClientError> {
        self.get_json("/api/users/me").await
    }

    async fn list_users(&self) -> Result<Vec<User>, ClientError> {
        self.get_json("/api/users").await
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, ClientError> {
        self.get_json("/api/todos").await
    }

    async fn create_task(&self, input: &CreateTask) -> Result<Task, ClientError> {
        self.post_json("/api/todos", input).await
    }

    async fn toggle_task(&self, id: &str) -> Result<Task, ClientError> {
        self.put_json(&format!("/api/todos/{id}"), &serde_json::json!({}))
            .await
    }

    async fn delete_task(&self, id: &str) -> Result<(), ClientError> {
        self.delete_req(&format!("/api/todos/{id}")).await
    }
}
