use tasklane_client::{ClientError, Session};
use tasklane_core::auth::{LoginRequest, RegisterOutcome, RegisterRequest, TokenResponse};
use tasklane_core::Route;
use tracing::{debug, info, warn};

use super::Effect;
use crate::dispatch::{Command, Epoch};

pub const LOGIN_FAILED: &str = "Invalid email or password";
pub const REGISTER_FAILED: &str = "Something went wrong";
pub const MISSING_FIELDS: &str = "Please fill in all required fields";
pub const REGISTERED_NOTICE: &str = "Registration successful. Please log in.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Email,
    Password,
}

impl LoginField {
    pub fn next(self) -> Self {
        match self {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        }
    }

    pub fn prev(self) -> Self {
        self.next()
    }
}

/// Email/password login.
///
/// On success the token goes into the session and the form asks to
/// navigate home. On failure the inputs are kept for correction.
pub struct LoginForm {
    session: Session,
    epoch: Epoch,
    mounted: bool,
    email: String,
    password: String,
    focus: LoginField,
    reveal_password: bool,
    submitting: bool,
    error: Option<String>,
    notice: Option<String>,
}

impl LoginForm {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            epoch: Epoch::default(),
            mounted: false,
            email: String::new(),
            password: String::new(),
            focus: LoginField::default(),
            reveal_password: false,
            submitting: false,
            error: None,
            notice: None,
        }
    }

    /// Fresh, empty form. `notice` is a one-time message handed over by
    /// whoever navigated here.
    pub fn mount(&mut self, notice: Option<String>) {
        self.epoch = self.epoch.next();
        self.mounted = true;
        self.email.clear();
        self.password.clear();
        self.focus = LoginField::Email;
        self.reveal_password = false;
        self.submitting = false;
        self.error = None;
        self.notice = notice;
    }

    pub fn unmount(&mut self) {
        self.epoch = self.epoch.next();
        self.mounted = false;
        self.submitting = false;
        self.notice = None;
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn focus(&self) -> LoginField {
        self.focus
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn reveals_password(&self) -> bool {
        self.reveal_password
    }

    /// Show or hide the password as typed.
    pub fn toggle_reveal(&mut self) {
        self.reveal_password = !self.reveal_password;
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.focused_mut().push(c);
    }

    pub fn pop_char(&mut self) {
        self.focused_mut().pop();
    }

    pub fn set_fields(&mut self, email: &str, password: &str) {
        self.email = email.to_string();
        self.password = password.to_string();
    }

    pub fn submit(&mut self) -> Option<Command> {
        if !self.mounted || self.submitting {
            return None;
        }
        if self.email.trim().is_empty() || self.password.is_empty() {
            self.error = Some(MISSING_FIELDS.into());
            return None;
        }
        self.error = None;
        self.submitting = true;
        Some(Command::Login {
            epoch: self.epoch,
            request: LoginRequest {
                email: self.email.trim().to_string(),
                password: self.password.clone(),
            },
        })
    }

    pub fn on_logged_in(&mut self, epoch: Epoch, result: Result<TokenResponse, ClientError>) -> Effect {
        if !self.mounted || epoch != self.epoch {
            debug!("dropping stale login outcome");
            return Effect::None;
        }
        self.submitting = false;
        match result {
            Ok(resp) => match self.session.set_token(resp.token) {
                Ok(()) => {
                    info!(email = %self.email.trim(), "logged in");
                    Effect::Navigate {
                        route: Route::Dashboard,
                        notice: None,
                    }
                }
                Err(e) => {
                    warn!(error = %e, "could not persist session");
                    self.error = Some(format!("Could not save session: {e}"));
                    Effect::None
                }
            },
            Err(err) => {
                warn!(error = %err, "login failed");
                self.error = Some(err.user_message(LOGIN_FAILED));
                Effect::None
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegisterField {
    #[default]
    Username,
    Email,
    Password,
    Image,
}

impl RegisterField {
    pub const ALL: [RegisterField; 4] = [
        RegisterField::Username,
        RegisterField::Email,
        RegisterField::Password,
        RegisterField::Image,
    ];

    pub fn next(self) -> Self {
        match self {
            RegisterField::Username => RegisterField::Email,
            RegisterField::Email => RegisterField::Password,
            RegisterField::Password => RegisterField::Image,
            RegisterField::Image => RegisterField::Username,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            RegisterField::Username => RegisterField::Image,
            RegisterField::Email => RegisterField::Username,
            RegisterField::Password => RegisterField::Email,
            RegisterField::Image => RegisterField::Password,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RegisterField::Username => "Username",
            RegisterField::Email => "Email",
            RegisterField::Password => "Password",
            RegisterField::Image => "Profile image (optional)",
        }
    }
}

/// Account creation. Success sends the user to login with a notice.
#[derive(Default)]
pub struct RegisterForm {
    epoch: Epoch,
    mounted: bool,
    username: String,
    email: String,
    password: String,
    image: String,
    focus: RegisterField,
    reveal_password: bool,
    submitting: bool,
    error: Option<String>,
}

impl RegisterForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(&mut self) {
        let epoch = self.epoch.next();
        *self = Self {
            epoch,
            mounted: true,
            ..Self::default()
        };
    }

    pub fn unmount(&mut self) {
        self.epoch = self.epoch.next();
        self.mounted = false;
        self.submitting = false;
    }

    pub fn value(&self, field: RegisterField) -> &str {
        match field {
            RegisterField::Username => &self.username,
            RegisterField::Email => &self.email,
            RegisterField::Password => &self.password,
            RegisterField::Image => &self.image,
        }
    }

    fn value_mut(&mut self, field: RegisterField) -> &mut String {
        match field {
            RegisterField::Username => &mut self.username,
            RegisterField::Email => &mut self.email,
            RegisterField::Password => &mut self.password,
            RegisterField::Image => &mut self.image,
        }
    }

    pub fn set_value(&mut self, field: RegisterField, value: &str) {
        *self.value_mut(field) = value.to_string();
    }

    pub fn focus(&self) -> RegisterField {
        self.focus
    }

    pub fn reveals_password(&self) -> bool {
        self.reveal_password
    }

    /// Show or hide the password as typed.
    pub fn toggle_reveal(&mut self) {
        self.reveal_password = !self.reveal_password;
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn push_char(&mut self, c: char) {
        let focus = self.focus;
        self.value_mut(focus).push(c);
    }

    pub fn pop_char(&mut self) {
        let focus = self.focus;
        self.value_mut(focus).pop();
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn submit(&mut self) -> Option<Command> {
        if !self.mounted || self.submitting {
            return None;
        }
        if self.username.trim().is_empty() || self.email.trim().is_empty() || self.password.is_empty() {
            self.error = Some(MISSING_FIELDS.into());
            return None;
        }
        self.error = None;
        self.submitting = true;
        let image = self.image.trim();
        Some(Command::Register {
            epoch: self.epoch,
            request: RegisterRequest {
                username: self.username.trim().to_string(),
                email: self.email.trim().to_string(),
                password: self.password.clone(),
                image: (!image.is_empty()).then(|| image.to_string()),
            },
        })
    }

    pub fn on_registered(&mut self, epoch: Epoch, result: Result<RegisterOutcome, ClientError>) -> Effect {
        if !self.mounted || epoch != self.epoch {
            debug!("dropping stale register outcome");
            return Effect::None;
        }
        self.submitting = false;
        match result {
            Ok(_) => {
                info!(username = %self.username.trim(), "registered");
                Effect::Navigate {
                    route: Route::Login,
                    notice: Some(REGISTERED_NOTICE.into()),
                }
            }
            Err(err) => {
                warn!(error = %err, "registration failed");
                self.error = Some(err.user_message(REGISTER_FAILED));
                Effect::None
            }
        }
    }
}
