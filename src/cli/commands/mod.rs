pub mod account;
pub mod book;
pub mod config;
pub mod report;
pub mod schedule;
pub mod security;
pub mod system;
pub mod transaction;

use crate::cli::core::CommandError;
use crate::cli::registry::CommandRegistry;

pub fn register_all(registry: &mut CommandRegistry) {
    for entry in system::definitions()
        .into_iter()
        .chain(book::definitions())
        .chain(config::definitions())
        .chain(account::definitions())
        .chain(transaction::definitions())
        .chain(security::definitions())
        .chain(schedule::definitions())
        .chain(report::definitions())
    {
        registry.register(entry);
    }
}

/// Splits `args` into a lowercased subcommand and the rest.
pub(crate) fn split_subcommand<'a, 'b>(
    args: &'a [&'b str],
    usage: &str,
) -> Result<(String, &'a [&'b str]), CommandError> {
    match args.split_first() {
        Some((sub, rest)) => Ok((sub.to_ascii_lowercase(), rest)),
        None => Err(CommandError::usage(usage)),
    }
}

/// Pulls `--flag value` pairs out of `args`, leaving positional arguments.
pub(crate) fn take_option<'b>(args: &mut Vec<&'b str>, flag: &str) -> Result<Option<&'b str>, CommandError> {
    let Some(idx) = args.iter().position(|arg| arg.eq_ignore_ascii_case(flag)) else {
        return Ok(None);
    };
    if idx + 1 >= args.len() {
        return Err(CommandError::InvalidArguments(format!("{flag} needs a value")));
    }
    let value = args.remove(idx + 1);
    args.remove(idx);
    Ok(Some(value))
}

/// 1-based row argument to a 0-based index.
pub(crate) fn parse_row(arg: &str) -> Result<usize, CommandError> {
    match arg.parse::<usize>() {
        Ok(row) if row > 0 => Ok(row - 1),
        _ => Err(CommandError::InvalidArguments(format!(
            "row must be a positive number, got `{arg}`"
        ))),
    }
}
