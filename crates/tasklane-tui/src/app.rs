use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use tasklane_client::Session;
use tasklane_core::{Route, View};
use tracing::{info, warn};

use crate::components::form::{render_login, render_register};
use crate::components::task_list::TaskListView;
use crate::components::user_table::UserTable;
use crate::controllers::{Effect, LoginForm, RegisterForm, TaskListController, UserDirectory};
use crate::dispatch::{Command, Outcome};
use crate::router::Router;

pub const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";

/// Which part of the dashboard takes key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Input,
}

pub struct App {
    session: Session,
    router: Router,
    mounted: Option<View>,
    login: LoginForm,
    register: RegisterForm,
    tasks: TaskListController,
    task_view: TaskListView,
    users: UserDirectory,
    user_table: UserTable,
    focus: Focus,
    /// Requests waiting to be handed to the dispatcher.
    commands: Vec<Command>,
    status_message: Option<String>,
}

impl App {
    pub fn new(session: Session) -> Self {
        Self::with_route(session, Route::Root)
    }

    pub fn with_route(session: Session, route: Route) -> Self {
        let mut app = Self {
            router: Router::new(&session, route),
            login: LoginForm::new(session.clone()),
            session,
            mounted: None,
            register: RegisterForm::new(),
            tasks: TaskListController::new(),
            task_view: TaskListView::new(),
            users: UserDirectory::new(),
            user_table: UserTable::new(),
            focus: Focus::List,
            commands: Vec::new(),
            status_message: None,
        };
        app.sync();
        app
    }

    pub fn view(&self) -> Option<View> {
        self.mounted
    }

    pub fn route(&self) -> &Route {
        self.router.requested()
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn login(&self) -> &LoginForm {
        &self.login
    }

    pub fn register(&self) -> &RegisterForm {
        &self.register
    }

    pub fn tasks(&self) -> &TaskListController {
        &self.tasks
    }

    pub fn users(&self) -> &UserDirectory {
        &self.users
    }

    pub fn selected_task_index(&self) -> Option<usize> {
        self.task_view.selected_index()
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    /// Whether plain characters are text input rather than shortcuts.
    pub fn is_input_mode(&self) -> bool {
        match self.mounted {
            Some(View::Login | View::Register) => true,
            Some(View::Dashboard) => self.focus == Focus::Input,
            Some(View::Users) | None => false,
        }
    }

    fn queue(&mut self, command: Option<Command>) {
        if let Some(command) = command {
            self.commands.push(command);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.status_message = None;
        match self.mounted {
            Some(View::Login) => self.handle_login(key),
            Some(View::Register) => self.handle_register(key),
            Some(View::Dashboard) => match self.focus {
                Focus::List => self.handle_task_list(key),
                Focus::Input => self.handle_task_input(key),
            },
            Some(View::Users) => self.handle_users(key),
            None => {}
        }
        self.sync();
    }

    fn handle_login(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('r') if ctrl => self.router.navigate(Route::Register),
            KeyCode::Char('h') if ctrl => self.login.toggle_reveal(),
            KeyCode::Tab | KeyCode::Down => self.login.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.login.focus_prev(),
            KeyCode::Enter => {
                let cmd = self.login.submit();
                self.queue(cmd);
            }
            KeyCode::Backspace => self.login.pop_char(),
            KeyCode::Char(c) if !ctrl => self.login.push_char(c),
            _ => {}
        }
    }

    fn handle_register(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('l') if ctrl => self.router.navigate(Route::Login),
            KeyCode::Char('h') if ctrl => self.register.toggle_reveal(),
            KeyCode::Tab | KeyCode::Down => self.register.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.register.focus_prev(),
            KeyCode::Enter => {
                let cmd = self.register.submit();
                self.queue(cmd);
            }
            KeyCode::Backspace => self.register.pop_char(),
            KeyCode::Char(c) if !ctrl => self.register.push_char(c),
            _ => {}
        }
    }

    fn handle_task_list(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('n') | KeyCode::Char('i') => self.focus = Focus::Input,
            KeyCode::Char(' ') => {
                if let Some(id) = self.selected_task_id() {
                    let cmd = self.tasks.request_toggle(&id);
                    self.queue(cmd);
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_task_id() {
                    let cmd = self.tasks.request_delete(&id);
                    self.queue(cmd);
                }
            }
            KeyCode::Char('r') => {
                let cmd = self.tasks.mount();
                self.commands.push(cmd);
            }
            KeyCode::Char('u') => self.router.navigate(Route::Users),
            KeyCode::Char('L') => self.logout(),
            _ => self.task_view.handle_key(key, self.tasks.tasks().len()),
        }
    }

    fn handle_task_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.focus = Focus::List,
            KeyCode::Enter => {
                let cmd = self.tasks.submit_create();
                self.queue(cmd);
            }
            KeyCode::Backspace => self.tasks.pop_draft(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.tasks.push_draft(c)
            }
            _ => {}
        }
    }

    fn handle_users(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('b') => self.router.navigate(Route::Dashboard),
            KeyCode::Char('r') => {
                let cmd = self.users.mount();
                self.commands.push(cmd);
            }
            KeyCode::Char('L') => self.logout(),
            _ => self.user_table.handle_key(key, self.users.users().len()),
        }
    }

    fn selected_task_id(&self) -> Option<String> {
        self.task_view
            .selected(self.tasks.tasks())
            .map(|t| t.id.clone())
    }

    /// Feed a finished request back to whichever controller issued it.
    pub fn apply(&mut self, outcome: Outcome) {
        let effect = match outcome {
            Outcome::LoggedIn { epoch, result } => self.login.on_logged_in(epoch, result),
            Outcome::Registered { epoch, result } => self.register.on_registered(epoch, result),
            Outcome::DashboardLoaded { epoch, tasks, user } => {
                self.tasks.on_loaded(epoch, tasks, user)
            }
            Outcome::TaskCreated { epoch, result } => self.tasks.on_created(epoch, result),
            Outcome::TaskToggled { epoch, id, result } => self.tasks.on_toggled(epoch, &id, result),
            Outcome::TaskDeleted { epoch, id, result } => self.tasks.on_deleted(epoch, &id, result),
            Outcome::UsersLoaded { epoch, result } => self.users.on_loaded(epoch, result),
        };
        self.task_view.clamp(self.tasks.tasks().len());
        self.apply_effect(effect);
        self.sync();
    }

    fn apply_effect(&mut self, effect: Effect) {
        match effect {
            Effect::None => {}
            Effect::SessionExpired => {
                warn!("server rejected the session token");
                self.end_session();
                self.router
                    .navigate_with_notice(Route::Login, SESSION_EXPIRED.into());
            }
            Effect::Navigate { route, notice } => match notice {
                Some(notice) => self.router.navigate_with_notice(route, notice),
                None => self.router.navigate(route),
            },
        }
    }

    pub fn logout(&mut self) {
        info!("logging out");
        self.end_session();
        self.router.navigate(Route::Login);
        self.sync();
    }

    fn end_session(&mut self) {
        if let Err(e) = self.session.clear_token() {
            warn!(error = %e, "could not remove stored token");
            self.status_message = Some(format!("Could not remove stored token: {e}"));
        }
    }

    /// Re-run the route guard and swap views if the answer changed. Called
    /// after every key and outcome, and by the event loop on each tick so
    /// session changes made elsewhere are picked up.
    pub fn sync(&mut self) {
        let next = self.router.current_view();
        if next == self.mounted {
            return;
        }
        match self.mounted.take() {
            Some(View::Login) => self.login.unmount(),
            Some(View::Register) => self.register.unmount(),
            Some(View::Dashboard) => self.tasks.unmount(),
            Some(View::Users) => self.users.unmount(),
            None => {}
        }
        match next {
            Some(View::Login) => {
                let notice = self.router.take_notice();
                self.login.mount(notice);
            }
            Some(View::Register) => self.register.mount(),
            Some(View::Dashboard) => {
                self.focus = Focus::List;
                self.task_view = TaskListView::new();
                let cmd = self.tasks.mount();
                self.commands.push(cmd);
            }
            Some(View::Users) => {
                self.user_table = UserTable::new();
                let cmd = self.users.mount();
                self.commands.push(cmd);
            }
            None => {}
        }
        self.mounted = next;
    }

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        self.render_title_bar(frame, layout[0]);
        match self.mounted {
            Some(View::Login) => render_login(frame, &self.login, layout[1]),
            Some(View::Register) => render_register(frame, &self.register, layout[1]),
            Some(View::Dashboard) => self.render_dashboard(frame, layout[1]),
            Some(View::Users) => self.render_users(frame, layout[1]),
            None => frame.render_widget(
                Paragraph::new("Loading...").style(Style::default().fg(Color::DarkGray)),
                layout[1],
            ),
        }
        self.render_status_bar(frame, layout[2]);
    }

    fn render_title_bar(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled(" tasklane ", Style::default().bold().fg(Color::Cyan)),
            Span::raw("| "),
            Span::styled(self.router.requested().path(), Style::default().fg(Color::DarkGray)),
        ];
        if self.mounted == Some(View::Dashboard) {
            if let Some(user) = self.tasks.user() {
                spans.push(Span::raw(" | "));
                spans.push(Span::styled(
                    format!("Welcome: {}", user.username),
                    Style::default().fg(Color::Yellow),
                ));
            }
        }
        frame.render_widget(Line::from(spans), area);
    }

    fn render_error(&self, frame: &mut Frame, error: Option<&str>, area: Rect) {
        if let Some(error) = error {
            let line = Line::from(Span::styled(
                format!(" {error}"),
                Style::default().fg(Color::Red),
            ));
            frame.render_widget(line, area);
        }
    }

    fn render_dashboard(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(area);

        self.render_error(frame, self.tasks.error(), chunks[0]);
        self.task_view.render(
            frame,
            self.tasks.tasks(),
            self.tasks.is_loading(),
            self.focus == Focus::List,
            chunks[1],
        );

        let label = if self.tasks.is_creating() {
            " Adding... "
        } else {
            " New todo "
        };
        let border = if self.focus == Focus::Input {
            Color::Cyan
        } else {
            Color::DarkGray
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(label);
        frame.render_widget(Paragraph::new(self.tasks.draft()).block(block), chunks[2]);
    }

    fn render_users(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(area);
        self.render_error(frame, self.users.error(), chunks[0]);
        self.user_table
            .render(frame, self.users.users(), self.users.is_loading(), chunks[1]);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        if let Some(ref msg) = self.status_message {
            let line = Line::from(Span::styled(
                format!(" {msg}"),
                Style::default().fg(Color::Yellow),
            ));
            frame.render_widget(line, area);
            return;
        }

        let hints = match (self.mounted, self.focus) {
            (Some(View::Login), _) => vec![
                ("Tab", "next field"),
                ("Enter", "login"),
                ("Ctrl+H", "show password"),
                ("Ctrl+R", "register"),
                ("Ctrl+C", "quit"),
            ],
            (Some(View::Register), _) => vec![
                ("Tab", "next field"),
                ("Enter", "register"),
                ("Ctrl+H", "show password"),
                ("Ctrl+L", "login"),
                ("Ctrl+C", "quit"),
            ],
            (Some(View::Dashboard), Focus::List) => vec![
                ("q", "quit"),
                ("j/k", "nav"),
                ("Space", "toggle"),
                ("d", "del"),
                ("n", "new"),
                ("r", "reload"),
                ("u", "users"),
                ("L", "logout"),
            ],
            (Some(View::Dashboard), Focus::Input) => vec![("Enter", "add"), ("Esc", "done")],
            (Some(View::Users), _) => vec![
                ("q", "quit"),
                ("j/k", "nav"),
                ("r", "reload"),
                ("Esc", "back"),
                ("L", "logout"),
            ],
            (None, _) => vec![("Ctrl+C", "quit")],
        };

        let spans: Vec<Span> = hints
            .into_iter()
            .flat_map(|(key, desc)| {
                vec![
                    Span::styled(format!(" {key}"), Style::default().fg(Color::Yellow).bold()),
                    Span::raw(format!(" {desc} ")),
                ]
            })
            .collect();

        frame.render_widget(Line::from(spans), area);
    }
}
