use std::{
    env,
    path::{Path, PathBuf},
};

use dirs::home_dir;

pub const HOME_ENV: &str = "BOOKKEEP_HOME";

const DEFAULT_DIR_NAME: &str = ".bookkeep";
const BOOKS_DIR: &str = "books";
const CONFIG_DIR: &str = "config";

/// Application data directory, `~/.bookkeep` unless `BOOKKEEP_HOME` is set.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Managed books under `base` unless the settings name another root;
/// backups go to `books/backups`.
pub fn books_dir(base: &Path) -> PathBuf {
    base.join(BOOKS_DIR)
}

pub fn config_dir(base: &Path) -> PathBuf {
    base.join(CONFIG_DIR)
}
