//! bookkeep-storage-json
//!
//! Stores books as pretty-printed JSON in `.bkb` files, with rotating
//! backups kept beside them.

use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use bookkeep_core::{
    storage::{book_warnings, BookBackupInfo, BookStorage, BOOK_EXTENSION},
    CoreError, PersistenceError,
};
use bookkeep_domain::Book;
use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{debug, info, warn};

const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const BACKUP_TIMESTAMP_LEN: usize = 15;
const TMP_SUFFIX: &str = "tmp";
pub const DEFAULT_RETENTION: usize = 5;

/// Where books and their backups live.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    pub book_root: PathBuf,
    pub backup_root: PathBuf,
}

impl StoragePaths {
    /// Books in `root`, backups in `root/backups`.
    pub fn under(root: impl Into<PathBuf>) -> Self {
        let book_root = root.into();
        Self {
            backup_root: book_root.join("backups"),
            book_root,
        }
    }
}

/// Filesystem-backed JSON persistence for books and their backups.
#[derive(Debug, Clone)]
pub struct JsonBookStorage {
    paths: StoragePaths,
    retention: usize,
}

impl JsonBookStorage {
    pub fn new(paths: StoragePaths) -> Result<Self, CoreError> {
        Self::with_retention(paths, DEFAULT_RETENTION)
    }

    pub fn with_retention(paths: StoragePaths, retention: usize) -> Result<Self, CoreError> {
        fs::create_dir_all(&paths.book_root)?;
        fs::create_dir_all(&paths.backup_root)?;
        Ok(Self {
            paths,
            retention: retention.max(1),
        })
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    pub fn book_path(&self, name: &str) -> PathBuf {
        self.paths
            .book_root
            .join(format!("{}.{}", canonical_name(name), BOOK_EXTENSION))
    }

    pub fn backup_dir(&self, name: &str) -> PathBuf {
        self.paths
            .backup_root
            .join(format!("{}-backups", canonical_name(name)))
    }

    pub fn delete_backup(&self, backup: &BookBackupInfo) -> Result<(), CoreError> {
        if backup.path.exists() {
            fs::remove_file(&backup.path)?;
        }
        Ok(())
    }

    fn write_backup(
        &self,
        name: &str,
        note: Option<&str>,
        contents: BackupSource<'_>,
    ) -> Result<BookBackupInfo, CoreError> {
        let slug = canonical_name(name);
        let dir = self.backup_dir(name);
        fs::create_dir_all(&dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut stem = format!("{slug}_{timestamp}");
        if let Some(label) = sanitize_backup_note(note) {
            stem.push('_');
            stem.push_str(&label);
        }
        let path = unique_path(&dir, &stem);
        match contents {
            BackupSource::Book(book) => write_file(&path, &serialize_book(book)?)?,
            BackupSource::File(source) => {
                fs::copy(source, &path)?;
            }
        }
        debug!(backup = %path.display(), "backup written");
        self.prune_backups(name)?;
        Ok(BookBackupInfo {
            book: slug,
            id: file_name(&path),
            created_at: timestamp,
            path,
        })
    }

    fn prune_backups(&self, name: &str) -> Result<(), CoreError> {
        for stale in self.list_backups(name)?.into_iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(&stale.path) {
                warn!(backup = %stale.id, error = %err, "could not prune backup");
            }
        }
        Ok(())
    }
}

enum BackupSource<'a> {
    Book(&'a Book),
    File(&'a Path),
}

impl BookStorage for JsonBookStorage {
    /// Backs up the current file, then replaces it atomically.
    fn save_book(&self, name: &str, book: &Book) -> Result<(), CoreError> {
        let path = self.book_path(name);
        if path.exists() {
            self.write_backup(name, None, BackupSource::File(&path))?;
        }
        save_book_to_path(book, &path)?;
        info!(book = %book.name, path = %path.display(), "book saved");
        Ok(())
    }

    fn load_book(&self, name: &str) -> Result<Book, CoreError> {
        let path = self.book_path(name);
        if !path.exists() {
            return Err(PersistenceError::new(format!("book `{name}` not found")).into());
        }
        load_book_from_path(&path)
    }

    fn list_books(&self) -> Result<Vec<String>, CoreError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.paths.book_root)? {
            let path = entry?.path();
            if !path.is_file() || !has_book_extension(&path) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn delete_book(&self, name: &str) -> Result<(), CoreError> {
        let path = self.book_path(name);
        if path.exists() {
            fs::remove_file(&path)?;
            info!(path = %path.display(), "book deleted");
        }
        Ok(())
    }

    /// Saves outside the managed directory. Files inside it still get a
    /// backup of their previous contents.
    fn save_book_to_path(&self, book: &Book, path: &Path) -> Result<(), CoreError> {
        if path.starts_with(&self.paths.book_root) && path.exists() {
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                self.write_backup(stem, None, BackupSource::File(path))?;
            }
        }
        save_book_to_path(book, path)
    }

    fn load_book_from_path(&self, path: &Path) -> Result<Book, CoreError> {
        load_book_from_path(path)
    }

    fn backup_book(
        &self,
        name: &str,
        book: &Book,
        note: Option<&str>,
    ) -> Result<BookBackupInfo, CoreError> {
        self.write_backup(name, note, BackupSource::Book(book))
    }

    /// Newest first.
    fn list_backups(&self, name: &str) -> Result<Vec<BookBackupInfo>, CoreError> {
        let dir = self.backup_dir(name);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let slug = canonical_name(name);
        let mut entries = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if !has_book_extension(&path) {
                continue;
            }
            let id = file_name(&path);
            let created_at = parse_backup_timestamp(&slug, &id)
                .map(|ts| ts.format(BACKUP_TIMESTAMP_FORMAT).to_string())
                .unwrap_or_default();
            entries.push(BookBackupInfo {
                book: slug.clone(),
                id,
                created_at,
                path,
            });
        }
        entries.sort_by_key(|info| {
            Reverse((parse_backup_timestamp(&info.book, &info.id), info.id.clone()))
        });
        Ok(entries)
    }

    /// Copies the backup over the live book and loads it.
    fn restore_backup(&self, backup: &BookBackupInfo) -> Result<Book, CoreError> {
        if !backup.path.exists() {
            return Err(PersistenceError::new(format!("backup `{}` not found", backup.id)).into());
        }
        let book = load_book_from_path(&backup.path)?;
        let target = self.book_path(&backup.book);
        let tmp = tmp_path(&target);
        fs::copy(&backup.path, &tmp)?;
        fs::rename(&tmp, &target)?;
        info!(backup = %backup.id, "backup restored");
        Ok(book)
    }
}

/// Saves a book to an arbitrary path on disk.
pub fn save_book_to_path(book: &Book, path: &Path) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    write_file(&tmp, &serialize_book(book)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Loads a book and logs any dangling references it contains.
pub fn load_book_from_path(path: &Path) -> Result<Book, CoreError> {
    let data = fs::read_to_string(path)?;
    let book: Book = serde_json::from_str(&data).map_err(|err| {
        PersistenceError::with_source(format!("could not read book {}", path.display()), err)
    })?;
    for warning in book_warnings(&book) {
        warn!(path = %path.display(), "{warning}");
    }
    info!(book = %book.name, path = %path.display(), "book loaded");
    Ok(book)
}

fn canonical_name(name: &str) -> String {
    let trimmed = name.trim();
    let trimmed = trimmed
        .strip_suffix(&format!(".{BOOK_EXTENSION}"))
        .unwrap_or(trimmed);
    let sanitized: String = trimmed
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches(|c| c == '_' || c == '-').is_empty() {
        "book".into()
    } else {
        sanitized
    }
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let words: Vec<String> = note?
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_lowercase)
        .collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join("-"))
    }
}

/// Reads the timestamp that follows `<slug>_` in a backup file name.
fn parse_backup_timestamp(slug: &str, file_name: &str) -> Option<DateTime<Utc>> {
    let rest = file_name.strip_prefix(slug)?.strip_prefix('_')?;
    let raw = rest.get(..BACKUP_TIMESTAMP_LEN)?;
    NaiveDateTime::parse_from_str(raw, BACKUP_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn has_book_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(BOOK_EXTENSION))
}

fn unique_path(dir: &Path, stem: &str) -> PathBuf {
    let mut path = dir.join(format!("{stem}.{BOOK_EXTENSION}"));
    let mut counter = 1;
    while path.exists() {
        path = dir.join(format!("{stem}-{counter}.{BOOK_EXTENSION}"));
        counter += 1;
    }
    path
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_string()
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".");
    tmp.push(TMP_SUFFIX);
    PathBuf::from(tmp)
}

fn write_file(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

fn serialize_book(book: &Book) -> Result<String, CoreError> {
    serde_json::to_string_pretty(book)
        .map_err(|err| PersistenceError::with_source("could not serialize book", err).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names_are_file_safe() {
        assert_eq!(canonical_name("Household 2024"), "household_2024");
        assert_eq!(canonical_name("taxes.bkb"), "taxes");
        assert_eq!(canonical_name("  //  "), "book");
    }

    #[test]
    fn backup_timestamp_follows_slug() {
        let ts = parse_backup_timestamp("home_base", "home_base_20240102_030405_note.bkb")
            .expect("timestamp");
        assert_eq!(ts.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-01-02 03:04:05");
        assert!(parse_backup_timestamp("home", "other_20240102_030405.bkb").is_none());
        assert_eq!(sanitize_backup_note(Some(" Year End! ")), Some("year-end".into()));
    }
}
