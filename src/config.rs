use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::filter::Selection;

/// Settings remembered between runs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub technology: Selection,
    pub category: Selection,
    /// Deck to load instead of the bundled one
    pub deck_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            technology: Selection::All,
            category: Selection::All,
            deck_path: None,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => log::warn!("ignoring unreadable config {}: {e}", self.path.display()),
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).map_err(std::io::Error::other)?;
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_store_uses_app_config_path() {
        let store = FileConfigStore::default();
        assert_eq!(store.path, AppDirs::config_path());
        assert_eq!(FileConfigStore::new().path, store.path);
    }

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            technology: "react".into(),
            category: "Hooks".into(),
            deck_path: Some(PathBuf::from("/tmp/deck.json")),
        };
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn missing_or_corrupt_config_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), Config::default());

        fs::write(&path, b"{ broken").unwrap();
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{"technology":"css"}"#).unwrap();
        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.technology, Selection::Only("css".into()));
        assert!(cfg.category.is_all());
        assert!(cfg.deck_path.is_none());
    }
}
