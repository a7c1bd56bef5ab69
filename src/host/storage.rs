/*
 *  host/storage.rs
 *
 *  sparkface - spark watchface
 *  (c) 2020-26 Stuart Hunter
 *
 *  Persistent key -> bool storage
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use dirs_next::data_dir;
use log::{debug, info};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::host::error::StorageError;
use crate::host::traits::PersistentStorage;

/// Where preferences live when nothing is configured
pub fn default_storage_path() -> PathBuf {
    data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sparkface")
        .join("preferences.yaml")
}

/// In-process storage, gone when the process exits
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: Arc<Mutex<HashMap<u32, bool>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared view of the stored values (survives boxing the storage)
    pub fn shared(&self) -> Arc<Mutex<HashMap<u32, bool>>> {
        Arc::clone(&self.values)
    }
}

impl PersistentStorage for MemoryStorage {
    fn read_bool(&self, key: u32) -> Option<bool> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.get(&key).copied()
    }

    fn write_bool(&mut self, key: u32, value: bool) -> Result<(), StorageError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key, value);
        Ok(())
    }
}

/// YAML file of `key: bool` pairs, rewritten on every write
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    values: BTreeMap<u32, bool>,
}

impl FileStorage {
    /// Open (or start) the store at `path`; a missing file is an empty store
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let values = if path.exists() {
            let s = fs::read_to_string(&path)?;
            if s.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_yaml::from_str(&s)?
            }
        } else {
            BTreeMap::new()
        };
        info!("Preferences at {} ({} stored)", path.display(), values.len());
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, values: &BTreeMap<u32, bool>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        // write-then-rename so a crash never leaves half a file
        let tmp = self.path.with_extension("yaml.tmp");
        fs::write(&tmp, serde_yaml::to_string(values)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl PersistentStorage for FileStorage {
    fn read_bool(&self, key: u32) -> Option<bool> {
        self.values.get(&key).copied()
    }

    fn write_bool(&mut self, key: u32, value: bool) -> Result<(), StorageError> {
        // memory only moves once the file has
        let mut values = self.values.clone();
        values.insert(key, value);
        self.flush(&values)?;
        self.values = values;
        debug!("persisted {} = {}", key, value);
        Ok(())
    }
}
