use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{SessionState, SessionUpdate};
use crate::auth::AuthError;

const SESSION_FILE_VERSION: u32 = 1;

/// Storage abstraction for the current session.
///
/// Reads and writes are synchronous; a `set` is visible to the next `get`.
pub trait SessionStore: Send + Sync {
    fn get(&self) -> SessionState;
    fn set(&self, update: SessionUpdate);
}

/// Process-local session store.
///
/// # Example
/// ```
/// use authgate::session::{InMemorySessionStore, SessionStore, SessionUpdate};
///
/// let store = InMemorySessionStore::new();
/// store.set(SessionUpdate::login("access", Some("refresh".to_string())));
/// assert_eq!(store.get().access_token.as_deref(), Some("access"));
/// ```
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    state: RwLock<SessionState>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: SessionState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self) -> SessionState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, update: SessionUpdate) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .apply(update);
    }
}

/// Session store backed by a TOML file.
///
/// State is cached in memory and written through on every `set`. Write
/// failures are logged; the in-memory state stays authoritative for the
/// running process.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    state: RwLock<SessionState>,
}

impl FileSessionStore {
    /// Open (or lazily create) the session file at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AuthError> {
        let path = path.into();
        let state = read_session_file(&path)?.unwrap_or_default();
        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    /// Open the session file for a named profile under `base_dir`.
    pub fn for_profile(base_dir: &Path, profile: &str) -> Result<Self, AuthError> {
        Self::open(session_path(base_dir, profile))
    }

    /// Open the default profile under `~/.authgate`.
    pub fn open_default() -> Result<Self, AuthError> {
        Self::for_profile(&default_dir(), "default")
    }

    pub fn default_dir() -> PathBuf {
        default_dir()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the backing file and reset the cached state.
    pub fn purge(&self) -> Result<(), AuthError> {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = SessionState::default();
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn persist(&self, state: &SessionState) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = SessionFile {
            version: SESSION_FILE_VERSION,
            session: state.clone(),
            saved_at: Utc::now(),
        };
        fs::write(&self.path, toml::to_string(&file)?)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> SessionState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, update: SessionUpdate) {
        let snapshot = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.apply(update);
            state.clone()
        };
        if let Err(error) = self.persist(&snapshot) {
            tracing::warn!(path = %self.path.display(), %error, "failed to persist session");
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionFile {
    version: u32,
    session: SessionState,
    saved_at: DateTime<Utc>,
}

fn read_session_file(path: &Path) -> Result<Option<SessionState>, AuthError> {
    let raw = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let file: SessionFile = toml::from_str(&raw)?;
    if file.version != SESSION_FILE_VERSION {
        return Err(AuthError::Serialization(format!(
            "unsupported session file version {}",
            file.version
        )));
    }
    Ok(Some(file.session))
}

fn session_path(base_dir: &Path, profile: &str) -> PathBuf {
    let profile = normalize_profile(profile);
    let name = if profile == "default" {
        "session.toml".to_string()
    } else {
        format!("session.{profile}.toml")
    };
    base_dir.join(name)
}

fn default_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".authgate"))
        .unwrap_or_else(|| PathBuf::from(".authgate"))
}

fn normalize_profile(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "default".to_string();
    }
    let out: String = trimmed
        .chars()
        .map(|ch| {
            let lower = ch.to_ascii_lowercase();
            if lower.is_ascii_alphanumeric() || lower == '-' {
                lower
            } else {
                '-'
            }
        })
        .collect();
    if out.trim_matches('-').is_empty() {
        "default".to_string()
    } else {
        out
    }
}
