//! Session token storage and change notification.
//!
//! A [`Session`] is the one place the bearer token lives. It is cloned into
//! the HTTP client and whichever controllers need it; nothing reads the
//! token from ambient state. Login and logout are the only writers, and each
//! write is broadcast on a `watch` channel so the router can react without
//! polling storage.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::sync::watch;

/// Storage key, and file name under the data directory.
pub const TOKEN_KEY: &str = "token";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("token storage: {0}")]
    Storage(#[from] io::Error),
}

/// Persistent backing for the token.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, SessionError>;
    fn save(&self, token: &str) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

/// Keeps the token in `<dir>/token` so it survives restarts.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(TOKEN_KEY),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;
        // `mode` only applies on creation; tighten a file left by an older run.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(token.as_bytes())?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Non-persistent store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        Ok(self.token.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        *self.token.lock().unwrap_or_else(|e| e.into_inner()) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.token.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

/// Shared handle to the current session. Cheap to clone.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    store: Box<dyn TokenStore>,
    token: watch::Sender<Option<String>>,
}

impl Session {
    /// Open a session over `store`, picking up any persisted token.
    pub fn open(store: impl TokenStore + 'static) -> Result<Self, SessionError> {
        let initial = store.load()?;
        let (token, _) = watch::channel(initial);
        Ok(Self {
            inner: Arc::new(SessionInner {
                store: Box::new(store),
                token,
            }),
        })
    }

    pub fn in_memory() -> Self {
        let (token, _) = watch::channel(None);
        Self {
            inner: Arc::new(SessionInner {
                store: Box::new(MemoryTokenStore::new()),
                token,
            }),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.inner.token.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.token.borrow().is_some()
    }

    /// Persist and publish a freshly issued token.
    pub fn set_token(&self, token: String) -> Result<(), SessionError> {
        self.inner.store.save(&token)?;
        self.inner.token.send_replace(Some(token));
        tracing::info!("session started");
        Ok(())
    }

    /// Drop the token. The in-memory session is cleared even if the
    /// backing store fails, so the user is never left half logged in.
    pub fn clear_token(&self) -> Result<(), SessionError> {
        let had_token = self.inner.token.send_replace(None).is_some();
        if had_token {
            tracing::info!("session ended");
        }
        self.inner.store.clear()
    }

    pub fn subscribe(&self) -> SessionEvents {
        SessionEvents {
            rx: self.inner.token.subscribe(),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

/// Receiving side of session changes. Exposes presence only, never the
/// token itself.
pub struct SessionEvents {
    rx: watch::Receiver<Option<String>>,
}

impl SessionEvents {
    pub fn is_authenticated(&self) -> bool {
        self.rx.borrow().is_some()
    }

    /// `Some(authenticated)` if the session changed since the last call,
    /// `None` otherwise.
    pub fn poll_change(&mut self) -> Option<bool> {
        match self.rx.has_changed() {
            Ok(true) => Some(self.rx.borrow_and_update().is_some()),
            _ => None,
        }
    }

}
