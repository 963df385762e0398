// Key-value storage backends for the gallery
// Author: kelexine (https://github.com/kelexine)

use crate::error::{GatewayError, Result};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Local persisted key-value storage holding JSON values.
///
/// Every `set` replaces the whole value under its key, so one read-modify-write
/// by the caller is the unit of atomicity. Writers in other processes are not
/// coordinated with: the last writer wins.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&self, key: &str, value: Value) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Storage backed by a single JSON object file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_object(&self) -> Result<Map<String, Value>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                return Err(GatewayError::Cache(format!(
                    "{} is not valid UTF-8",
                    self.path.display()
                )))
            }
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str(&raw)? {
            Value::Object(map) => Ok(map),
            _ => Err(GatewayError::Cache(format!(
                "{} does not hold a JSON object",
                self.path.display()
            ))),
        }
    }

    /// Object to mutate before a write, and whether the file on disk was
    /// unreadable. A corrupt file is replaced rather than blocking every later
    /// write.
    fn read_object_for_write(&self) -> Result<(Map<String, Value>, bool)> {
        match self.read_object() {
            Ok(object) => Ok((object, false)),
            Err(GatewayError::Io(e)) => Err(GatewayError::Io(e)),
            Err(e) => {
                warn!("Discarding unreadable {}: {}", self.path.display(), e);
                Ok((Map::new(), true))
            }
        }
    }

    fn write_object(&self, object: Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        // Write then rename so a crash never leaves a truncated file behind
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&Value::Object(object))?)?;
        fs::rename(&tmp, &self.path)?;
        debug!("Wrote {}", self.path.display());
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.read_object()?.remove(key))
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let (mut object, _) = self.read_object_for_write()?;
        object.insert(key.to_string(), value);
        self.write_object(object)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let (mut object, corrupt) = self.read_object_for_write()?;
        if object.remove(key).is_some() || corrupt {
            self.write_object(object)?;
        }
        Ok(())
    }
}

/// In-process storage, used by tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<Map<String, Value>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.values.lock().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.lock().remove(key);
        Ok(())
    }
}
