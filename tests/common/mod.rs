#![allow(dead_code)]

use std::path::Path;
use std::sync::Mutex;

use assert_cmd::Command;
use once_cell::sync::Lazy;

/// Output preferences are process-wide; tests that change them take this.
pub static PREFERENCES_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// The CLI in script mode, isolated under `home` with a pinned date.
pub fn script_command(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("bookkeep_cli").expect("bookkeep_cli binary");
    cmd.env("BOOKKEEP_CLI_SCRIPT", "1")
        .env("BOOKKEEP_HOME", home)
        .env("BOOKKEEP_TODAY", "06/15/2024")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}
