use std::path::PathBuf;

use bookkeep_config::NegativeDisplay;

use crate::cli::commands::split_subcommand;
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;

const USAGE: &str = "config [show|set <key> <value>|backup [note]|backups|restore <name>]";
const KEYS: &str = "locale, currency, negative-style, currency-symbol, color, plain, book-root, backup-retention";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "View and manage preferences",
        USAGE,
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return show(context);
    }
    let (sub, rest) = split_subcommand(args, USAGE)?;
    match sub.as_str() {
        "show" => show(context),
        "set" => {
            if rest.len() < 2 {
                return Err(CommandError::InvalidArguments(format!(
                    "usage: config set <key> <value> (keys: {KEYS})"
                )));
            }
            set_value(context, rest[0], rest[1..].join(" ").trim())
        }
        "backup" => {
            let note = (!rest.is_empty()).then(|| rest.join(" "));
            let name = context
                .config_manager
                .backup(&context.config, note.as_deref())?;
            context
                .config_manager
                .prune_backups(context.config.backup_retention)?;
            output::success(format!("Settings backed up as `{name}`."));
            Ok(())
        }
        "backups" => {
            let names = context.config_manager.list_backups()?;
            if names.is_empty() {
                output::info("No settings backups yet.");
            }
            for (idx, name) in names.iter().enumerate() {
                output::info(format!("  {:>2}. {}", idx + 1, name));
            }
            Ok(())
        }
        "restore" => {
            let reference = rest.first().ok_or_else(|| CommandError::usage("config restore <name|number>"))?;
            let names = context.config_manager.list_backups()?;
            let name = match reference.parse::<usize>() {
                Ok(n) if n >= 1 && n <= names.len() => names[n - 1].clone(),
                _ => reference.to_string(),
            };
            context.config = context.config_manager.restore(&name)?;
            context.persist_config()?;
            context.apply_output_preferences();
            context.reload_storage()?;
            output::success(format!("Settings restored from `{name}`."));
            Ok(())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown config subcommand `{other}`. {USAGE}"
        ))),
    }
}

fn show(context: &ShellContext) -> CommandResult {
    let cfg = &context.config;
    output::section("Settings");
    output::info(format!("  locale           : {}", cfg.locale));
    output::info(format!("  currency         : {}", cfg.currency));
    output::info(format!("  negative-style   : {}", cfg.negative_style));
    output::info(format!("  currency-symbol  : {}", on_off(cfg.show_currency_symbol)));
    output::info(format!("  color            : {}", on_off(cfg.ui_color_enabled)));
    output::info(format!("  plain            : {}", on_off(cfg.plain_output)));
    output::info(format!(
        "  book-root        : {}",
        context.storage.paths().book_root.display()
    ));
    output::info(format!("  backup-retention : {}", cfg.backup_retention));
    output::info(format!(
        "  last book        : {}",
        cfg.last_opened_book.as_deref().unwrap_or("-")
    ));
    output::info(format!(
        "  settings file    : {}",
        context.config_manager.config_path().display()
    ));
    Ok(())
}

fn set_value(context: &mut ShellContext, key: &str, value: &str) -> CommandResult {
    let mut storage_changed = false;
    match key.to_ascii_lowercase().as_str() {
        "locale" => context.config.locale = value.to_string(),
        "currency" => context.config.currency = value.to_ascii_uppercase(),
        "negative-style" | "negative_style" => {
            context.config.negative_style = NegativeDisplay::parse(value).ok_or_else(|| {
                CommandError::InvalidArguments(format!(
                    "unknown negative style `{value}` (sign|parentheses)"
                ))
            })?;
        }
        "currency-symbol" | "symbol" => context.config.show_currency_symbol = parse_flag(value)?,
        "color" | "colour" => context.config.ui_color_enabled = parse_flag(value)?,
        "plain" => context.config.plain_output = parse_flag(value)?,
        "book-root" | "book_root" => {
            context.config.default_book_root = match value {
                "" | "default" => None,
                path => Some(PathBuf::from(path)),
            };
            storage_changed = true;
        }
        "backup-retention" | "backup_retention" => {
            context.config.backup_retention = value.parse().map_err(|_| {
                CommandError::InvalidArguments(format!("retention must be a number, got `{value}`"))
            })?;
            storage_changed = true;
        }
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown setting `{other}` (keys: {KEYS})"
            )))
        }
    }

    context.persist_config()?;
    context.apply_output_preferences();
    if storage_changed {
        context.reload_storage()?;
    }
    output::success(format!("Setting `{key}` updated."));
    Ok(())
}

fn parse_flag(value: &str) -> Result<bool, CommandError> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => Err(CommandError::InvalidArguments(format!(
            "expected on/off, got `{other}`"
        ))),
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}
