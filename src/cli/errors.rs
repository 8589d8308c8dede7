use std::io;

use bookkeep_config::ConfigError;
use bookkeep_core::{dates::DateParseError, CoreError, EditError};
use rustyline::error::ReadlineError;
use thiserror::Error;

/// Failures that end the shell.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Readline(#[from] ReadlineError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
}

/// Failures of a single command; reported and the shell keeps going.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("No book open. Use `book new` or `book open` first.")]
    BookNotLoaded,
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<EditError> for CommandError {
    fn from(err: EditError) -> Self {
        CommandError::Core(CoreError::Edit(err))
    }
}

impl From<DateParseError> for CommandError {
    fn from(err: DateParseError) -> Self {
        CommandError::Core(CoreError::from(err))
    }
}

impl CommandError {
    pub(crate) fn usage(usage: &str) -> Self {
        CommandError::InvalidArguments(format!("usage: {usage}"))
    }
}
