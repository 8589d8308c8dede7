use std::{error::Error as StdError, io};

use thiserror::Error;
use uuid::Uuid;

use crate::dates::DateParseError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Account not found: {0}")]
    AccountNotFound(String),
    #[error("Security not found: {0}")]
    SecurityNotFound(String),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),
    #[error("Scheduled transaction not found: {0}")]
    ScheduleNotFound(String),
    #[error("Name already in use: {0}")]
    DuplicateName(String),
    #[error("Unknown report expression: {0}")]
    UnknownExpression(String),
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl From<io::Error> for CoreError {
    fn from(err: io::Error) -> Self {
        CoreError::Persistence(PersistenceError::with_source("I/O failure", err))
    }
}

impl From<DateParseError> for CoreError {
    fn from(err: DateParseError) -> Self {
        CoreError::Edit(EditError::Date(err))
    }
}

/// Failure raised by the persistence layer, optionally wrapping the
/// lower-level cause.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct PersistenceError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl PersistenceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn has_cause(&self) -> bool {
        self.source.is_some()
    }
}

/// Rejection of a value typed into an editable cell.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error(transparent)]
    Date(#[from] DateParseError),
    #[error("invalid number `{input}` at offset {offset}")]
    Number { input: String, offset: usize },
    #[error("invalid split ratio `{0}`")]
    Ratio(String),
    #[error("column {0} is read-only")]
    ReadOnly(usize),
    #[error("row {0} is out of range")]
    RowOutOfRange(usize),
    #[error("{0}")]
    Rejected(String),
}

impl EditError {
    /// Character offset of the offending input, when known.
    pub fn offset(&self) -> Option<usize> {
        match self {
            EditError::Date(err) => Some(err.offset),
            EditError::Number { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}
