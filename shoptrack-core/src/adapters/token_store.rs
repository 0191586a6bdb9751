//! Token store implementations
//!
//! The file store keeps a small JSON document in the data directory:
//! ```json
//! { "authToken": "..." }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{Map, Value as JsonValue};

use crate::domain::result::{Error, Result};
use crate::ports::{TokenStore, TOKEN_KEY};

const SESSION_FILE: &str = "session.json";

/// Token persisted to `<data dir>/session.json`, surviving restarts
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Map<String, JsonValue>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        // A corrupt session file is the same as no session
        Ok(serde_json::from_str(&content).unwrap_or_default())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>> {
        let doc = self.read_document()?;
        Ok(doc
            .get(TOKEN_KEY)
            .and_then(|v| v.as_str())
            .filter(|t| !t.is_empty())
            .map(str::to_string))
    }

    fn save(&self, token: &str) -> Result<()> {
        if token.is_empty() {
            return Err(Error::validation("Session token cannot be empty"));
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut doc = Map::new();
        doc.insert(TOKEN_KEY.to_string(), JsonValue::String(token.to_string()));
        std::fs::write(&self.path, serde_json::to_string_pretty(&doc)?)?;
        restrict_permissions(&self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

/// In-process token store; nothing survives the process
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.token.lock().map_err(poisoned)?.clone())
    }

    fn save(&self, token: &str) -> Result<()> {
        if token.is_empty() {
            return Err(Error::validation("Session token cannot be empty"));
        }
        *self.token.lock().map_err(poisoned)? = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.token.lock().map_err(poisoned)? = None;
        Ok(())
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> Error {
    Error::Config("token store lock poisoned".to_string())
}
