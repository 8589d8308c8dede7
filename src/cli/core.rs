//! Shell context construction, dispatch and the helpers command handlers share.

use std::{
    env,
    path::{Path, PathBuf},
    sync::Arc,
};

use bookkeep_config::{Config, ConfigManager, NegativeDisplay};
use bookkeep_core::{
    dates::parse_date,
    money::{parse_shares, MoneyFormatter, NegativeStyle},
    storage::{book_warnings, BookFileFilter, BookStorage},
    time::{Clock, FixedClock, SystemClock},
    views::{CellRenderer, EditContext},
    AccountService, ExpressionRegistry, SecurityService,
};
use bookkeep_domain::{Account, Book, Security};
use bookkeep_storage_json::{JsonBookStorage, StoragePaths};
use chrono::NaiveDate;
use dialoguer::{theme::ColorfulTheme, Confirm};
use strsim::levenshtein;
use tracing::{debug, info};

use super::commands;
use super::output::{self, OutputPreferences};
use super::registry::{CommandEntry, CommandRegistry};
use crate::utils::paths;

pub use super::errors::{CliError, CommandError};
pub use super::shell_context::{CliMode, ShellContext};

/// Pins "today" for scripted runs, `mm/dd/yyyy`.
pub const TODAY_ENV: &str = "BOOKKEEP_TODAY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_base_dir(mode, &paths::app_data_dir())
    }

    /// Settings under `<base>/config`, books under `<base>/books` unless
    /// the settings name another root.
    pub fn with_base_dir(mode: CliMode, base: &Path) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let config_manager = ConfigManager::with_base_dir(paths::config_dir(base))?;
        let config = config_manager.load()?;
        let storage = build_storage(&config, base)?;

        let mut app = ShellContext {
            mode,
            registry,
            theme: ColorfulTheme::default(),
            storage,
            data_dir: base.to_path_buf(),
            config_manager,
            config,
            expressions: ExpressionRegistry::with_builtins(),
            clock: clock_from_env(),
            book: None,
            book_name: None,
            book_path: None,
            dirty: false,
            last_command: None,
            running: true,
        };
        app.apply_output_preferences();
        app.auto_load_last();
        Ok(app)
    }

    fn auto_load_last(&mut self) {
        if self.mode != CliMode::Interactive {
            return;
        }
        let Some(name) = self.config.last_opened_book.clone() else {
            return;
        };
        match self.storage.load_book(&name) {
            Ok(book) => {
                self.set_book(book, Some(name.clone()), None);
                output::success(format!("Automatically opened last book `{name}`."));
            }
            Err(err) => debug!(book = %name, error = %err, "last book not reopened"),
        }
    }

    pub(crate) fn apply_output_preferences(&self) {
        output::set_preferences(OutputPreferences {
            plain_mode: self.config.plain_output,
            color_enabled: self.config.ui_color_enabled,
        });
    }

    pub(crate) fn persist_config(&self) -> CommandResult {
        self.config_manager.save(&self.config)?;
        Ok(())
    }

    /// Rebuilds storage after the book root or retention changed.
    pub(crate) fn reload_storage(&mut self) -> CommandResult {
        self.storage = build_storage(&self.config, &self.data_dir).map_err(|err| match err {
            CliError::Core(core) => CommandError::Core(core),
            other => CommandError::Message(other.to_string()),
        })?;
        Ok(())
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn prompt(&self) -> String {
        match &self.book {
            Some(book) if self.dirty => format!("bookkeep [{}*]> ", book.name),
            Some(book) => format!("bookkeep [{}]> ", book.name),
            None => "bookkeep> ".to_string(),
        }
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let needle = input.to_ascii_lowercase();
        let best = self
            .registry
            .names()
            .map(|key| (levenshtein(key, &needle), key))
            .min_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = best {
            if distance <= 3 {
                output::hint(format!("Did you mean `{}`?", best));
            }
        }
    }

    pub(crate) fn confirm(&self, prompt: &str, default: bool) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        let prompt = if self.dirty {
            "Exit and discard unsaved changes?"
        } else {
            "Exit shell?"
        };
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(!self.dirty)
            .interact()?)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                output::error(&message);
                output::hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::BookNotLoaded => {
                output::error(CommandError::BookNotLoaded);
                output::hint("Try `book new Household` to get started.");
                Ok(())
            }
            other => {
                output::error(&other);
                Ok(())
            }
        }
    }

    pub(crate) fn book(&self) -> Result<&Book, CommandError> {
        self.book.as_ref().ok_or(CommandError::BookNotLoaded)
    }

    /// Runs `action` on the open book and marks it dirty when it succeeds.
    pub(crate) fn with_book_mut<T>(
        &mut self,
        action: impl FnOnce(&mut Book) -> Result<T, CommandError>,
    ) -> Result<T, CommandError> {
        let book = self.book.as_mut().ok_or(CommandError::BookNotLoaded)?;
        let value = action(book)?;
        self.dirty = true;
        Ok(value)
    }

    pub(crate) fn set_book(&mut self, book: Book, name: Option<String>, path: Option<PathBuf>) {
        for warning in book_warnings(&book) {
            output::warning(warning);
        }
        info!(book = %book.name, "book active");
        self.book = Some(book);
        self.book_name = name;
        self.book_path = path;
        self.dirty = false;
    }

    pub(crate) fn clear_book(&mut self) {
        self.book = None;
        self.book_name = None;
        self.book_path = None;
        self.dirty = false;
    }

    /// Saves to the file the book came from, or under its managed name.
    pub(crate) fn save_current(&mut self) -> Result<String, CommandError> {
        let book = self.book.as_ref().ok_or(CommandError::BookNotLoaded)?;
        let target = if let Some(path) = &self.book_path {
            self.storage.save_book_to_path(book, path)?;
            path.display().to_string()
        } else {
            let name = self
                .book_name
                .clone()
                .unwrap_or_else(|| book.name.clone());
            self.storage.save_book(&name, book)?;
            let location = self.storage.book_path(&name).display().to_string();
            self.book_name = Some(name);
            location
        };
        self.dirty = false;
        Ok(target)
    }

    pub(crate) fn remember_last_opened(&mut self, name: Option<&str>) -> CommandResult {
        self.config.last_opened_book = name.map(str::to_string);
        self.persist_config()
    }

    pub(crate) fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub(crate) fn money(&self) -> MoneyFormatter {
        let style = match self.config.negative_style {
            NegativeDisplay::Sign => NegativeStyle::Sign,
            NegativeDisplay::Parentheses => NegativeStyle::Parentheses,
        };
        let (grouping, decimal) = self.config.number_separators();
        let formatter = MoneyFormatter::default()
            .with_negative_style(style)
            .with_separators(grouping, decimal);
        match self.config.currency_symbol() {
            Some(symbol) => formatter.with_symbol(symbol),
            None => formatter,
        }
    }

    pub(crate) fn renderer(&self) -> CellRenderer {
        CellRenderer::new(self.money())
    }

    pub(crate) fn edit_context(&self) -> EditContext {
        EditContext::new(Arc::clone(&self.clock), self.money())
    }

    pub(crate) fn parse_date(&self, input: &str) -> Result<NaiveDate, CommandError> {
        Ok(parse_date(input, self.clock.as_ref())?)
    }

    /// Optional date argument, today when absent.
    pub(crate) fn date_or_today(&self, input: Option<&&str>) -> Result<NaiveDate, CommandError> {
        match input {
            Some(value) => self.parse_date(value),
            None => Ok(self.today()),
        }
    }

    pub(crate) fn parse_amount(&self, input: &str) -> Result<f64, CommandError> {
        Ok(self.money().parse(input)?)
    }

    pub(crate) fn parse_price(&self, input: &str) -> Result<f64, CommandError> {
        Ok(self.money().parse_price(input)?)
    }

    pub(crate) fn parse_shares(&self, input: &str) -> Result<f64, CommandError> {
        Ok(parse_shares(input)?)
    }

    pub(crate) fn find_account<'a>(book: &'a Book, name: &str) -> Result<&'a Account, CommandError> {
        Ok(AccountService::find(book, name)?)
    }

    pub(crate) fn find_security<'a>(
        book: &'a Book,
        name: &str,
    ) -> Result<&'a Security, CommandError> {
        Ok(SecurityService::find(book, name)?)
    }
}

/// Treats arguments carrying the book extension or a path separator as files.
pub(crate) fn looks_like_path(arg: &str) -> bool {
    BookFileFilter::has_book_extension(Path::new(arg))
        || arg.contains(std::path::MAIN_SEPARATOR)
        || arg.contains('/')
}

fn build_storage(config: &Config, base: &Path) -> Result<JsonBookStorage, CliError> {
    let root = config
        .default_book_root
        .clone()
        .unwrap_or_else(|| paths::books_dir(base));
    Ok(JsonBookStorage::with_retention(
        StoragePaths::under(root),
        config.backup_retention,
    )?)
}

fn clock_from_env() -> Arc<dyn Clock> {
    if let Ok(value) = env::var(TODAY_ENV) {
        match parse_date(&value, &SystemClock) {
            Ok(date) => return Arc::new(FixedClock::on(date)),
            Err(err) => output::warning(format!("Ignoring {TODAY_ENV}: {err}")),
        }
    }
    Arc::new(SystemClock)
}
