use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "flashdeck";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Key-value store under `$HOME/.local/state/flashdeck`
    pub fn db_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join(APP_NAME);
            Some(state_dir.join("store.db"))
        } else {
            ProjectDirs::from("", "", APP_NAME)
                .map(|proj_dirs| proj_dirs.data_local_dir().join("store.db"))
        }
    }

    pub fn config_path() -> PathBuf {
        ProjectDirs::from("", "", APP_NAME)
            .map(|pd| pd.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("flashdeck_config.json"))
    }
}
