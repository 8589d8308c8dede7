//! `book` command: create, open, save and back up book files.

use std::path::{Path, PathBuf};

use bookkeep_core::storage::{BookFileFilter, BookStorage};
use bookkeep_domain::Book;

use crate::cli::commands::split_subcommand;
use crate::cli::core::{looks_like_path, CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;

const USAGE: &str =
    "book <new <name>|open <name|file.bkb>|save [name|file.bkb]|list|backup [note]|backups|restore <number>|close>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "book",
        "Create, open, save and back up books",
        USAGE,
        cmd_book,
    )]
}

fn cmd_book(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (sub, rest) = split_subcommand(args, USAGE)?;
    match sub.as_str() {
        "new" => handle_new(context, rest),
        "open" | "load" => handle_open(context, rest),
        "save" => handle_save(context, rest),
        "list" => handle_list(context),
        "backup" => handle_backup(context, rest),
        "backups" => handle_backups(context),
        "restore" => handle_restore(context, rest),
        "close" => handle_close(context),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown book subcommand `{other}`. Available: new, open, save, list, backup, backups, restore, close"
        ))),
    }
}

fn ensure_can_replace(context: &ShellContext) -> CommandResult {
    if context.dirty && !context.confirm("Discard unsaved changes?", false)? {
        return Err(CommandError::Message("Operation cancelled.".into()));
    }
    Ok(())
}

fn handle_new(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = args.join(" ");
    let name = name.trim();
    if name.is_empty() {
        return Err(CommandError::usage("book new <name>"));
    }
    ensure_can_replace(context)?;
    context.set_book(Book::new(name), Some(name.to_string()), None);
    output::success(format!("New book `{name}` created."));
    Ok(())
}

fn handle_open(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let target = args
        .first()
        .ok_or_else(|| CommandError::usage("book open <name|file.bkb>"))?;
    ensure_can_replace(context)?;

    if looks_like_path(target) {
        let path = PathBuf::from(target);
        if !BookFileFilter.accept(&path) {
            return Err(CommandError::InvalidArguments(format!(
                "`{}` is not a book file; expected {}",
                path.display(),
                BookFileFilter.description()
            )));
        }
        let book = context.storage.load_book_from_path(&path)?;
        let name = book.name.clone();
        context.set_book(book, None, Some(path.clone()));
        output::success(format!("Opened `{name}` from {}.", path.display()));
    } else {
        let book = context.storage.load_book(target)?;
        let name = book.name.clone();
        context.set_book(book, Some(target.to_string()), None);
        context.remember_last_opened(Some(target))?;
        output::success(format!("Opened book `{name}`."));
    }
    Ok(())
}

fn handle_save(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.book()?;
    if let Some(target) = args.first() {
        if looks_like_path(target) {
            let path = BookFileFilter::ensure_extension(Path::new(target));
            context.book_path = Some(path);
            context.book_name = None;
        } else {
            context.book_path = None;
            context.book_name = Some(target.to_string());
        }
    }
    let location = context.save_current()?;
    if let Some(name) = context.book_name.clone() {
        context.remember_last_opened(Some(&name))?;
    }
    output::success(format!("Book saved to {location}."));
    Ok(())
}

fn handle_list(context: &mut ShellContext) -> CommandResult {
    let names = context.storage.list_books()?;
    output::section("Books");
    if names.is_empty() {
        output::info("No saved books yet.");
        return Ok(());
    }
    for name in names {
        let current = context
            .book_name
            .as_deref()
            .is_some_and(|open| open.eq_ignore_ascii_case(&name));
        let marker = if current {
            "*"
        } else {
            " "
        };
        output::info(format!(" {marker} {name}"));
    }
    Ok(())
}

fn managed_name(context: &ShellContext) -> Result<String, CommandError> {
    context.book()?;
    context.book_name.clone().ok_or_else(|| {
        CommandError::InvalidArguments(
            "backups need a named book; save it with `book save <name>` first".into(),
        )
    })
}

fn handle_backup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = managed_name(context)?;
    let note = (!args.is_empty()).then(|| args.join(" "));
    let book = context.book()?;
    let info = context.storage.backup_book(&name, book, note.as_deref())?;
    output::success(format!("Backup `{}` created.", info.id));
    Ok(())
}

fn handle_backups(context: &mut ShellContext) -> CommandResult {
    let name = managed_name(context)?;
    let backups = context.storage.list_backups(&name)?;
    output::section(format!("Backups of {name}"));
    if backups.is_empty() {
        output::info("No backups yet.");
    }
    for (idx, backup) in backups.iter().enumerate() {
        output::info(format!("  {:>2}. {} ({})", idx + 1, backup.id, backup.created_at));
    }
    Ok(())
}

fn handle_restore(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = managed_name(context)?;
    let reference = args
        .first()
        .ok_or_else(|| CommandError::usage("book restore <number|backup-id>"))?;
    let backups = context.storage.list_backups(&name)?;
    let backup = match reference.parse::<usize>() {
        Ok(n) if n >= 1 => backups.get(n - 1),
        _ => backups.iter().find(|b| b.id == *reference),
    }
    .cloned()
    .ok_or_else(|| CommandError::InvalidArguments(format!("no backup `{reference}`")))?;

    if !context.confirm(&format!("Restore `{}`?", backup.id), false)? {
        output::info("Operation cancelled.");
        return Ok(());
    }
    let book = context.storage.restore_backup(&backup)?;
    context.set_book(book, Some(name), None);
    output::success(format!("Restored backup `{}`.", backup.id));
    Ok(())
}

fn handle_close(context: &mut ShellContext) -> CommandResult {
    context.book()?;
    ensure_can_replace(context)?;
    context.clear_book();
    output::info("Book closed.");
    Ok(())
}
