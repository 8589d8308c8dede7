use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use bookkeep_domain::Book;

use crate::CoreError;

/// Extension of persisted books, without the dot.
pub const BOOK_EXTENSION: &str = "bkb";

/// Describes a persisted backup artifact for a book.
#[derive(Debug, Clone)]
pub struct BookBackupInfo {
    pub book: String,
    pub id: String,
    pub created_at: String,
    pub path: PathBuf,
}

/// Abstraction over persistence backends capable of storing books and backups.
pub trait BookStorage: Send + Sync {
    fn save_book(&self, name: &str, book: &Book) -> Result<(), CoreError>;
    fn load_book(&self, name: &str) -> Result<Book, CoreError>;
    fn list_books(&self) -> Result<Vec<String>, CoreError>;
    fn delete_book(&self, name: &str) -> Result<(), CoreError>;
    fn save_book_to_path(&self, book: &Book, path: &Path) -> Result<(), CoreError>;
    fn load_book_from_path(&self, path: &Path) -> Result<Book, CoreError>;
    fn backup_book(
        &self,
        name: &str,
        book: &Book,
        note: Option<&str>,
    ) -> Result<BookBackupInfo, CoreError>;
    fn list_backups(&self, name: &str) -> Result<Vec<BookBackupInfo>, CoreError>;
    fn restore_backup(&self, backup: &BookBackupInfo) -> Result<Book, CoreError>;
}

/// File-picker filter accepting only book files. Directories always pass so
/// the picker can navigate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BookFileFilter;

impl BookFileFilter {
    pub fn accept(&self, path: &Path) -> bool {
        if path.is_dir() {
            return true;
        }
        Self::has_book_extension(path)
    }

    pub fn has_book_extension(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(BOOK_EXTENSION))
    }

    pub fn description(&self) -> String {
        format!("Bookkeep files (*.{BOOK_EXTENSION})")
    }

    /// Appends the book extension unless `path` already carries it.
    pub fn ensure_extension(path: &Path) -> PathBuf {
        if Self::has_book_extension(path) {
            path.to_path_buf()
        } else {
            let mut name = path.as_os_str().to_os_string();
            name.push(".");
            name.push(BOOK_EXTENSION);
            PathBuf::from(name)
        }
    }
}

/// Detects dangling references and other anomalies within a book snapshot.
pub fn book_warnings(book: &Book) -> Vec<String> {
    let account_ids: HashSet<_> = book.accounts.iter().map(|a| a.id).collect();
    let security_ids: HashSet<_> = book.securities.iter().map(|s| s.id).collect();
    let mut warnings = Vec::new();

    for account in &book.accounts {
        if let Some(link) = account.linked_account {
            if !account_ids.contains(&link) {
                warnings.push(format!(
                    "account {} links to unknown account {}",
                    account.name, link
                ));
            }
        }
    }
    for txn in &book.transactions {
        if !account_ids.contains(&txn.account_id) {
            warnings.push(format!(
                "transaction {} references unknown account {}",
                txn.id, txn.account_id
            ));
        }
        if let Some(transfer) = txn.transfer_account {
            if !account_ids.contains(&transfer) {
                warnings.push(format!(
                    "transaction {} transfers to unknown account {}",
                    txn.id, transfer
                ));
            }
        }
        if let Some(detail) = &txn.investment {
            if !security_ids.contains(&detail.security_id) {
                warnings.push(format!(
                    "transaction {} references missing security {}",
                    txn.id, detail.security_id
                ));
            }
        }
    }
    for schedule in &book.scheduled {
        if !account_ids.contains(&schedule.account_id) {
            warnings.push(format!(
                "schedule {} references unknown account {}",
                schedule.name, schedule.account_id
            ));
        }
        if !schedule.enabled && schedule.end_date.is_none() {
            warnings.push(format!(
                "schedule {} disabled with no end date",
                schedule.name
            ));
        }
    }
    warnings
}
