/*
 *  preferences.rs
 *
 *  sparkface - spark watchface
 *  (c) 2020-26 Stuart Hunter
 *
 *  Persisted theme preference
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

use log::{debug, info};

use crate::constants::THEME_PERSIST_KEY;
use crate::display::theme::Theme;
use crate::host::error::StorageError;
use crate::host::traits::PersistentStorage;

/// The one setting that survives a restart: light (true) or dark (false)
pub struct PreferenceStore {
    storage: Box<dyn PersistentStorage>,
}

impl PreferenceStore {
    pub fn new(storage: Box<dyn PersistentStorage>) -> Self {
        Self { storage }
    }

    /// Stored flag, `false` when never written
    pub fn read(&self) -> bool {
        match self.storage.read_bool(THEME_PERSIST_KEY) {
            Some(value) => value,
            None => {
                debug!("no stored theme, using dark");
                false
            }
        }
    }

    pub fn write(&mut self, value: bool) -> Result<(), StorageError> {
        self.storage.write_bool(THEME_PERSIST_KEY, value)?;
        info!("Theme preference saved: {}", if value { "light" } else { "dark" });
        Ok(())
    }

    pub fn theme(&self) -> Theme {
        Theme::from_flag(self.read())
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<(), StorageError> {
        self.write(theme.as_flag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::storage::{FileStorage, MemoryStorage};

    #[test]
    fn test_default_is_dark() {
        let store = PreferenceStore::new(Box::new(MemoryStorage::new()));
        assert!(!store.read());
        assert_eq!(store.theme(), Theme::Dark);
    }

    #[test]
    fn test_write_then_read() {
        let storage = MemoryStorage::new();
        let shared = storage.shared();
        let mut store = PreferenceStore::new(Box::new(storage));

        store.write(true).unwrap();
        assert!(store.read());
        assert_eq!(shared.lock().unwrap().get(&THEME_PERSIST_KEY), Some(&true));

        store.set_theme(Theme::Dark).unwrap();
        assert!(!store.read());
    }

    #[test]
    fn test_survives_reopen() {
        let path = std::env::temp_dir().join(format!("sparkface-prefs-{}.yaml", std::process::id()));
        std::fs::remove_file(&path).ok();

        {
            let mut store = PreferenceStore::new(Box::new(FileStorage::open(&path).unwrap()));
            store.set_theme(Theme::Light).unwrap();
        }
        let store = PreferenceStore::new(Box::new(FileStorage::open(&path).unwrap()));
        assert_eq!(store.theme(), Theme::Light);

        std::fs::remove_file(&path).ok();
    }
}
