use std::{path::PathBuf, sync::Arc};

use bookkeep_config::{Config, ConfigManager};
use bookkeep_core::{time::Clock, ExpressionRegistry};
use bookkeep_domain::Book;
use bookkeep_storage_json::JsonBookStorage;
use dialoguer::theme::ColorfulTheme;

use super::registry::CommandRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

/// Everything a command handler can touch.
pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub theme: ColorfulTheme,
    pub storage: JsonBookStorage,
    /// Root for settings and, by default, books.
    pub data_dir: PathBuf,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub expressions: ExpressionRegistry,
    pub clock: Arc<dyn Clock>,
    pub book: Option<Book>,
    /// Managed name under the storage root.
    pub book_name: Option<String>,
    /// Set when the book was opened from, or saved to, an explicit file.
    pub book_path: Option<PathBuf>,
    pub dirty: bool,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn has_book(&self) -> bool {
        self.book.is_some()
    }

    pub fn status(&self) -> String {
        format!(
            "ShellContext {{ running: {}, last_command: {:?}, book: {:?}, dirty: {} }}",
            self.running,
            self.last_command,
            self.book.as_ref().map(|book| book.name.as_str()),
            self.dirty
        )
    }
}
