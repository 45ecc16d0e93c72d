use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde_json::{Map, Value};

/// Best-effort key-value persistence, last write wins.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, String>;
    fn set(&self, entries: Map<String, Value>) -> Result<(), String>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<Map<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, String> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(select(&values, keys))
    }

    fn set(&self, entries: Map<String, Value>) -> Result<(), String> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.extend(entries);
        Ok(())
    }
}

/// One JSON object on disk, rewritten through a temp file and rename.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>, String> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let raw = std::fs::read_to_string(&self.path).map_err(|err| err.to_string())?;
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&raw).map_err(|err| err.to_string())? {
            Value::Object(map) => Ok(map),
            _ => Err(format!("{} does not hold a JSON object", self.path.display())),
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, String> {
        Ok(select(&self.read_all()?, keys))
    }

    fn set(&self, entries: Map<String, Value>) -> Result<(), String> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut values = self.read_all()?;
        values.extend(entries);
        let contents =
            serde_json::to_string_pretty(&Value::Object(values)).map_err(|err| err.to_string())?;
        let temp = self.path.with_extension("json.tmp");
        std::fs::write(&temp, contents).map_err(|err| err.to_string())?;
        std::fs::rename(&temp, &self.path).map_err(|err| err.to_string())
    }
}

fn select(values: &Map<String, Value>, keys: &[&str]) -> Map<String, Value> {
    keys.iter()
        .filter_map(|key| values.get(*key).map(|value| (key.to_string(), value.clone())))
        .collect()
}
