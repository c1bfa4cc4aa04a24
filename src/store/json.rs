use std::fs;
use std::io::Write;
use std::path::PathBuf;

use serde_json::{Map, Value};

use super::{KeyValueStore, StoreError};

/// All keys live in one JSON object on disk. Every `set` rewrites the file
/// through a temporary sibling and a rename so a crash never leaves a torn
/// document behind.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl JsonFileStore {
    /// Open (or create) the store at `path`.
    ///
    /// A file that is not a JSON object is moved aside to `<path>.corrupt`
    /// and the store starts empty. If it cannot be moved, opening fails and
    /// the file is left untouched.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let values = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Object(map)) => map,
                Ok(_) | Err(_) => {
                    let aside = path.with_extension("json.corrupt");
                    log::warn!(
                        "state file {} is unreadable, moving it to {}",
                        path.display(),
                        aside.display()
                    );
                    // Never start empty on top of a file we could not save.
                    if let Err(e) = fs::rename(&path, &aside) {
                        log::error!("cannot move {} aside: {e}", path.display());
                        return Err(e.into());
                    }
                    Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self { path, values })
    }

    fn write_out(&self) -> Result<(), StoreError> {
        let tmp = self.path.with_extension("json.tmp");
        let data = serde_json::to_vec_pretty(&self.values)?;
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&data)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        self.write_out()
    }
}
