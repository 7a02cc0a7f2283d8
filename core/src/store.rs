use std::fmt;
use std::fs::File;
use std::fs::OpenOptions;
use std::io::Read;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use std::path::PathBuf;

use parking_lot::Mutex;
use serde::Deserialize;
use serde::Serialize;

use crate::error::StoreError;
use crate::session::AuthToken;
use crate::session::Identity;

pub const SESSION_FILE: &str = "session.json";

/// Credentials kept across restarts. Impersonation and navigation state are
/// deliberately not part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub token: AuthToken,
    pub user: Identity,
}

/// Opaque key/value persistence for the authenticated session.
pub trait SessionStore: fmt::Debug + Send + Sync {
    fn load(&self) -> Result<Option<PersistedSession>, StoreError>;

    fn save(&self, session: &PersistedSession) -> Result<(), StoreError>;

    /// Returns `Ok(true)` if something was removed.
    fn clear(&self) -> Result<bool, StoreError>;
}

/// Stores the session as `session.json` inside the EOEX home directory.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(eoex_home: &Path) -> Self {
        Self {
            path: eoex_home.join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<PersistedSession>, StoreError> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        if contents.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn save(&self, session: &PersistedSession) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json_data = serde_json::to_string_pretty(session)?;
        let mut options = OpenOptions::new();
        options.truncate(true).write(true).create(true);
        #[cfg(unix)]
        {
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;
        file.write_all(json_data.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    fn clear(&self) -> Result<bool, StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-memory store for tests and ephemeral shells.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Mutex<Option<PersistedSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: PersistedSession) -> Self {
        Self {
            inner: Mutex::new(Some(session)),
        }
    }

    pub fn current(&self) -> Option<PersistedSession> {
        self.inner.lock().clone()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<PersistedSession>, StoreError> {
        Ok(self.current())
    }

    fn save(&self, session: &PersistedSession) -> Result<(), StoreError> {
        *self.inner.lock() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<bool, StoreError> {
        Ok(self.inner.lock().take().is_some())
    }
}
