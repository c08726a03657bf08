//! State machine tests for the TUI App.
//!
//! Each test builds an App over an in-memory session and a fake API that
//! checks the same session's token, then drives it with key events. Commands
//! the App queues are executed inline and their outcomes fed straight back.

use std::sync::Mutex;

use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tasklane_client::{ApiClient, ClientError, Session};
use tasklane_core::auth::{LoginRequest, RegisterOutcome, RegisterRequest, TokenResponse};
use tasklane_core::task::{CreateTask, Task};
use tasklane_core::user::User;
use tasklane_core::{Route, View};
use tasklane_tui::app::{App, Focus, SESSION_EXPIRED};
use tasklane_tui::controllers::auth_forms::{MISSING_FIELDS, REGISTERED_NOTICE};
use tasklane_tui::dispatch::{execute, Command};

const TOKEN: &str = "fake-token";

#[derive(Default)]
struct FakeState {
    accounts: Vec<(User, String)>,
    current: Option<User>,
    tasks: Vec<Task>,
    next_id: u64,
    fail_next: Option<ClientError>,
}

struct FakeApi {
    session: Session,
    state: Mutex<FakeState>,
}

impl FakeApi {
    fn new(session: &Session) -> Self {
        Self {
            session: session.clone(),
            state: Mutex::new(FakeState::default()),
        }
    }

    fn seed_account(&self, username: &str, email: &str, password: &str) -> User {
        let mut state = self.state.lock().unwrap();
        let user = User {
            id: format!("u{}", state.accounts.len() + 1),
            username: username.into(),
            email: email.into(),
            created_at: None,
            image: None,
        };
        state.accounts.push((user.clone(), password.into()));
        user
    }

    fn seed_task(&self, title: &str) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id.to_string();
        state.tasks.push(Task {
            id: id.clone(),
            title: title.into(),
            completed: false,
        });
        id
    }

    fn fail_next(&self, err: ClientError) {
        self.state.lock().unwrap().fail_next = Some(err);
    }

    fn task_count(&self) -> usize {
        self.state.lock().unwrap().tasks.len()
    }

    /// Mirrors the server's auth middleware.
    fn authorize(&self) -> Result<(), ClientError> {
        if let Some(err) = self.state.lock().unwrap().fail_next.take() {
            return Err(err);
        }
        if self.session.token().as_deref() == Some(TOKEN) {
            Ok(())
        } else {
            Err(ClientError::from_status(
                401,
                Some("Not authorized, token failed".into()),
            ))
        }
    }
}

#[async_trait]
impl ApiClient for FakeApi {
    async fn register(&self, input: &RegisterRequest) -> Result<RegisterOutcome, ClientError> {
        if self
            .state
            .lock()
            .unwrap()
            .accounts
            .iter()
            .any(|(u, _)| u.email == input.email)
        {
            return Err(ClientError::from_status(
                400,
                Some("User already exists".into()),
            ));
        }
        let user = self.seed_account(&input.username, &input.email, &input.password);
        Ok(RegisterOutcome::User(user))
    }

    async fn login(&self, input: &LoginRequest) -> Result<TokenResponse, ClientError> {
        let mut state = self.state.lock().unwrap();
        let found = state
            .accounts
            .iter()
            .find(|(u, pw)| u.email == input.email && *pw == input.password)
            .map(|(u, _)| u.clone());
        match found {
            Some(user) => {
                state.current = Some(user);
                Ok(TokenResponse {
                    token: TOKEN.into(),
                })
            }
            None => Err(ClientError::from_status(
                401,
                Some("Invalid credentials".into()),
            )),
        }
    }

    async fn current_user(&self) -> Result<User, ClientError> {
        self.authorize()?;
        self.state
            .lock()
            .unwrap()
            .current
            .clone()
            .ok_or_else(|| ClientError::from_status(404, Some("User not found".into())))
    }

    async fn list_users(&self) -> Result<Vec<User>, ClientError> {
        self.authorize()?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .accounts
            .iter()
            .map(|(u, _)| u.clone())
            .collect())
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, ClientError> {
        self.authorize()?;
        Ok(self.state.lock().unwrap().tasks.clone())
    }

    async fn create_task(&self, input: &CreateTask) -> Result<Task, ClientError> {
        self.authorize()?;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let task = Task {
            id: state.next_id.to_string(),
            title: input.title.clone(),
            completed: false,
        };
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn toggle_task(&self, id: &str) -> Result<Task, ClientError> {
        self.authorize()?;
        let mut state = self.state.lock().unwrap();
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| ClientError::from_status(404, Some("Todo not found".into())))?;
        task.completed = !task.completed;
        Ok(task.clone())
    }

    async fn delete_task(&self, id: &str) -> Result<(), ClientError> {
        self.authorize()?;
        let mut state = self.state.lock().unwrap();
        let before = state.tasks.len();
        state.tasks.retain(|t| t.id != id);
        if state.tasks.len() == before {
            return Err(ClientError::from_status(404, Some("Todo not found".into())));
        }
        Ok(())
    }
}

// ---- helpers ----

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn char_key(c: char) -> KeyEvent {
    key(KeyCode::Char(c))
}

fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

fn type_str(app: &mut App, text: &str) {
    for c in text.chars() {
        app.handle_key(char_key(c));
    }
}

/// Run queued commands until the app stops asking for more.
async fn settle(app: &mut App, api: &FakeApi) {
    for _ in 0..10 {
        let commands = app.take_commands();
        if commands.is_empty() {
            return;
        }
        for command in commands {
            let outcome = execute(api, command).await;
            app.apply(outcome);
        }
    }
    panic!("app kept issuing commands");
}

fn titles(app: &App) -> Vec<String> {
    app.tasks().tasks().iter().map(|t| t.title.clone()).collect()
}

/// App on the dashboard for `ada`, with the given tasks already on the server.
async fn dashboard_with(task_titles: &[&str]) -> (App, FakeApi, Session) {
    let session = Session::in_memory();
    let api = FakeApi::new(&session);
    let ada = api.seed_account("ada", "ada@example.com", "pw");
    api.state.lock().unwrap().current = Some(ada);
    for title in task_titles {
        api.seed_task(title);
    }
    session.set_token(TOKEN.into()).unwrap();
    let mut app = App::new(session.clone());
    settle(&mut app, &api).await;
    assert_eq!(app.view(), Some(View::Dashboard));
    (app, api, session)
}

// ---- routing ----

#[test]
fn starts_on_login_without_token() {
    let mut app = App::new(Session::in_memory());
    assert_eq!(app.view(), Some(View::Login));
    assert_eq!(app.route(), &Route::Login);
    assert!(app.take_commands().is_empty());
}

#[test]
fn starts_on_dashboard_with_token() {
    let session = Session::in_memory();
    session.set_token(TOKEN.into()).unwrap();
    let mut app = App::new(session);
    assert_eq!(app.view(), Some(View::Dashboard));
    let commands = app.take_commands();
    assert_eq!(commands.len(), 1);
    assert!(matches!(commands[0], Command::LoadDashboard { .. }));
    assert!(app.tasks().is_loading());
}

#[test]
fn protected_route_without_token_redirects_to_login() {
    let app = App::with_route(Session::in_memory(), Route::Users);
    assert_eq!(app.view(), Some(View::Login));
}

#[test]
fn public_route_with_token_redirects_home() {
    let session = Session::in_memory();
    session.set_token(TOKEN.into()).unwrap();
    let app = App::with_route(session, Route::from_path("/register"));
    assert_eq!(app.view(), Some(View::Dashboard));
}

#[test]
fn token_cleared_elsewhere_redirects_on_sync() {
    let session = Session::in_memory();
    session.set_token(TOKEN.into()).unwrap();
    let mut app = App::new(session.clone());
    session.clear_token().unwrap();
    app.sync();
    assert_eq!(app.view(), Some(View::Login));
}

// ---- login ----

#[tokio::test]
async fn login_success_opens_dashboard() {
    let session = Session::in_memory();
    let api = FakeApi::new(&session);
    api.seed_account("ada", "ada@example.com", "pw");
    api.seed_task("existing");
    let mut app = App::new(session.clone());

    type_str(&mut app, "ada@example.com");
    app.handle_key(key(KeyCode::Tab));
    type_str(&mut app, "pw");
    app.handle_key(key(KeyCode::Enter));
    assert!(app.login().is_submitting());
    settle(&mut app, &api).await;

    assert_eq!(session.token().as_deref(), Some(TOKEN));
    assert_eq!(app.view(), Some(View::Dashboard));
    assert_eq!(app.tasks().user().map(|u| u.username.as_str()), Some("ada"));
    assert_eq!(titles(&app), ["existing"]);
}

#[tokio::test]
async fn login_failure_shows_message_and_keeps_fields() {
    let session = Session::in_memory();
    let api = FakeApi::new(&session);
    api.seed_account("ada", "ada@example.com", "pw");
    let mut app = App::new(session.clone());

    type_str(&mut app, "ada@example.com");
    app.handle_key(key(KeyCode::Tab));
    type_str(&mut app, "nope");
    app.handle_key(key(KeyCode::Enter));
    settle(&mut app, &api).await;

    assert_eq!(app.view(), Some(View::Login));
    assert_eq!(app.login().error(), Some("Invalid credentials"));
    assert_eq!(app.login().email(), "ada@example.com");
    assert_eq!(app.login().password(), "nope");
    assert!(!app.login().is_submitting());
    assert!(!session.is_authenticated());
}

#[test]
fn login_enter_twice_sends_one_request() {
    let mut app = App::new(Session::in_memory());
    type_str(&mut app, "a@b.c");
    app.handle_key(key(KeyCode::Tab));
    type_str(&mut app, "x");
    app.handle_key(key(KeyCode::Enter));
    app.handle_key(key(KeyCode::Enter));
    assert_eq!(app.take_commands().len(), 1);
}

#[test]
fn login_with_empty_password_is_refused() {
    let mut app = App::new(Session::in_memory());
    type_str(&mut app, "a@b.c");
    app.handle_key(key(KeyCode::Enter));
    assert!(app.take_commands().is_empty());
    assert_eq!(app.login().error(), Some(MISSING_FIELDS));
}

#[test]
fn ctrl_h_toggles_password_visibility() {
    let mut app = App::new(Session::in_memory());
    app.handle_key(ctrl('h'));
    assert!(app.login().reveals_password());
    assert_eq!(app.login().email(), "");
    app.handle_key(ctrl('h'));
    assert!(!app.login().reveals_password());

    app.handle_key(ctrl('r'));
    app.handle_key(ctrl('h'));
    assert!(app.register().reveals_password());
}

// ---- register ----

#[tokio::test]
async fn register_then_login_notice_shows_once() {
    let session = Session::in_memory();
    let api = FakeApi::new(&session);
    let mut app = App::new(session.clone());

    app.handle_key(ctrl('r'));
    assert_eq!(app.view(), Some(View::Register));

    type_str(&mut app, "grace");
    app.handle_key(key(KeyCode::Tab));
    type_str(&mut app, "grace@example.com");
    app.handle_key(key(KeyCode::Tab));
    type_str(&mut app, "secret");
    app.handle_key(key(KeyCode::Enter));
    settle(&mut app, &api).await;

    assert_eq!(app.view(), Some(View::Login));
    assert_eq!(app.login().notice(), Some(REGISTERED_NOTICE));
    assert!(!session.is_authenticated());

    app.handle_key(ctrl('r'));
    app.handle_key(ctrl('l'));
    assert_eq!(app.view(), Some(View::Login));
    assert_eq!(app.login().notice(), None);
}

#[tokio::test]
async fn register_duplicate_shows_server_message() {
    let session = Session::in_memory();
    let api = FakeApi::new(&session);
    api.seed_account("ada", "ada@example.com", "pw");
    let mut app = App::with_route(session, Route::Register);

    type_str(&mut app, "ada2");
    app.handle_key(key(KeyCode::Tab));
    type_str(&mut app, "ada@example.com");
    app.handle_key(key(KeyCode::Tab));
    type_str(&mut app, "pw");
    app.handle_key(key(KeyCode::Enter));
    settle(&mut app, &api).await;

    assert_eq!(app.view(), Some(View::Register));
    assert_eq!(app.register().error(), Some("User already exists"));
}

// ---- dashboard ----

#[tokio::test]
async fn create_appends_server_task_and_clears_draft() {
    let (mut app, api, _) = dashboard_with(&["one"]).await;

    app.handle_key(char_key('n'));
    assert_eq!(app.focus(), Focus::Input);
    type_str(&mut app, "  two  ");
    app.handle_key(key(KeyCode::Enter));
    assert!(app.tasks().is_creating());
    let commands = app.take_commands();
    let [Command::CreateTask { request, .. }] = commands.as_slice() else {
        panic!("expected one create command, got {commands:?}");
    };
    // Blank check uses the trimmed draft; the title goes out as typed.
    assert_eq!(request.title, "  two  ");
    for command in commands {
        let outcome = execute(&api, command).await;
        app.apply(outcome);
    }
    settle(&mut app, &api).await;

    assert_eq!(titles(&app), ["one", "  two  "]);
    assert_eq!(app.tasks().draft(), "");
    assert!(!app.tasks().is_creating());
}

#[tokio::test]
async fn blank_create_sends_nothing() {
    let (mut app, _api, _) = dashboard_with(&[]).await;
    app.handle_key(char_key('n'));
    type_str(&mut app, "   ");
    app.handle_key(key(KeyCode::Enter));
    assert!(app.take_commands().is_empty());
    assert!(app.tasks().tasks().is_empty());
}

#[tokio::test]
async fn create_is_single_flight() {
    let (mut app, api, _) = dashboard_with(&[]).await;
    app.handle_key(char_key('n'));
    type_str(&mut app, "x");
    app.handle_key(key(KeyCode::Enter));
    app.handle_key(key(KeyCode::Enter));
    assert_eq!(app.take_commands().len(), 1);
    assert_eq!(api.task_count(), 0);
}

#[tokio::test]
async fn toggle_replaces_in_place() {
    let (mut app, api, _) = dashboard_with(&["a", "b", "c"]).await;
    app.handle_key(char_key('j'));
    app.handle_key(char_key(' '));
    settle(&mut app, &api).await;

    let tasks = app.tasks().tasks();
    assert_eq!(titles(&app), ["a", "b", "c"]);
    assert!(!tasks[0].completed);
    assert!(tasks[1].completed);
    assert!(!tasks[2].completed);
}

#[tokio::test]
async fn delete_removes_only_that_task() {
    let (mut app, api, _) = dashboard_with(&["a", "b", "c"]).await;
    app.handle_key(char_key('j'));
    app.handle_key(char_key('d'));
    settle(&mut app, &api).await;

    assert_eq!(titles(&app), ["a", "c"]);
    assert_eq!(api.task_count(), 2);
    assert_eq!(app.selected_task_index(), Some(1));
}

#[tokio::test]
async fn failed_toggle_keeps_list_and_shows_fallback() {
    let (mut app, api, session) = dashboard_with(&["a"]).await;
    api.fail_next(ClientError::Network("connection refused".into()));
    app.handle_key(char_key(' '));
    settle(&mut app, &api).await;

    assert_eq!(app.tasks().error(), Some("Failed to toggle todo"));
    assert!(!app.tasks().tasks()[0].completed);
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn outcome_after_leaving_dashboard_is_dropped() {
    let (mut app, api, _) = dashboard_with(&["a"]).await;
    app.handle_key(char_key(' '));
    let pending = app.take_commands();
    assert_eq!(pending.len(), 1);

    app.handle_key(char_key('u'));
    assert_eq!(app.view(), Some(View::Users));
    settle(&mut app, &api).await;

    for command in pending {
        let outcome = execute(&api, command).await;
        app.apply(outcome);
    }
    assert_eq!(titles(&app), ["a"]);
    assert!(!app.tasks().tasks()[0].completed);
    assert_eq!(app.view(), Some(View::Users));
}

#[tokio::test]
async fn rejected_token_forces_logout() {
    let (mut app, api, session) = dashboard_with(&["a"]).await;
    session.set_token("revoked".into()).unwrap();
    app.handle_key(char_key('r'));
    settle(&mut app, &api).await;

    assert_eq!(app.view(), Some(View::Login));
    assert_eq!(session.token(), None);
    assert_eq!(app.login().notice(), Some(SESSION_EXPIRED));
}

#[tokio::test]
async fn logout_key_clears_session() {
    let (mut app, _api, session) = dashboard_with(&["a"]).await;
    app.handle_key(char_key('L'));
    assert_eq!(app.view(), Some(View::Login));
    assert!(!session.is_authenticated());
    assert_eq!(app.login().notice(), None);
}

#[tokio::test]
async fn input_mode_tracks_focus() {
    let (mut app, _api, _) = dashboard_with(&[]).await;
    assert!(!app.is_input_mode());
    app.handle_key(char_key('n'));
    assert!(app.is_input_mode());
    // 'q' and 'L' are text while typing
    type_str(&mut app, "qL");
    assert_eq!(app.tasks().draft(), "qL");
    assert_eq!(app.view(), Some(View::Dashboard));
    app.handle_key(key(KeyCode::Esc));
    assert!(!app.is_input_mode());

    let login = App::new(Session::in_memory());
    assert!(login.is_input_mode());
}

// ---- users ----

#[tokio::test]
async fn users_view_lists_accounts_and_goes_back() {
    let (mut app, api, _) = dashboard_with(&["a"]).await;
    api.seed_account("grace", "grace@example.com", "pw");

    app.handle_key(char_key('u'));
    settle(&mut app, &api).await;
    assert_eq!(app.view(), Some(View::Users));
    let names: Vec<&str> = app.users().users().iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, ["ada", "grace"]);

    app.handle_key(key(KeyCode::Esc));
    assert_eq!(app.view(), Some(View::Dashboard));
    // Remount refetches.
    assert!(app.tasks().is_loading());
    settle(&mut app, &api).await;
    assert_eq!(titles(&app), ["a"]);
}

// ---- rendering ----

#[tokio::test]
async fn dashboard_renders_welcome_and_tasks() {
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    let (app, _api, _) = dashboard_with(&["write tests"]).await;
    let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
    terminal.draw(|f| app.render(f)).unwrap();
    let text: String = terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|c| c.symbol())
        .collect();
    assert!(text.contains("Welcome: ada"));
    assert!(text.contains("[ ] write tests"));
}
