use anyhow::{anyhow, Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::domain::user::Session;

pub const KEY_ID: &str = "id";
pub const KEY_USERNAME: &str = "username";
pub const KEY_EMAIL: &str = "email";

/// String key-value storage holding the signed-in identity.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Reads the three identity keys; a missing or malformed key means no session.
pub fn load_session(store: &dyn SessionStore) -> Result<Option<Session>> {
    let id = store.get(KEY_ID)?;
    let username = store.get(KEY_USERNAME)?;
    let email = store.get(KEY_EMAIL)?;

    let (Some(id), Some(username), Some(email)) = (id, username, email) else {
        return Ok(None);
    };
    let Ok(user_id) = id.parse() else {
        tracing::warn!(id = %id, "ignoring stored session with malformed user id");
        return Ok(None);
    };

    Ok(Some(Session {
        user_id,
        username,
        email,
    }))
}

pub fn save_session(store: &dyn SessionStore, session: &Session) -> Result<()> {
    store.set(KEY_ID, &session.user_id.to_string())?;
    store.set(KEY_USERNAME, &session.username)?;
    store.set(KEY_EMAIL, &session.email)?;
    Ok(())
}

pub fn clear_session(store: &dyn SessionStore) -> Result<()> {
    store.remove(KEY_ID)?;
    store.remove(KEY_USERNAME)?;
    store.remove(KEY_EMAIL)?;
    Ok(())
}

/// JSON object on disk, rewritten on every change. Concurrent writers are not
/// coordinated; the last write wins.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<BTreeMap<String, String>> {
        match std::fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("corrupt session file {}", self.path.display())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(anyhow!("failed to read {}: {}", self.path.display(), err)),
        }
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        let payload = serde_json::to_vec_pretty(entries)?;
        std::fs::write(&self.path, payload)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.read()?;
        entries.insert(key.to_string(), value.to_string());
        self.write(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.read()?;
        if entries.remove(key).is_some() {
            self.write(&entries)?;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow!("session store lock poisoned"))
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries()?.remove(key);
        Ok(())
    }
}
