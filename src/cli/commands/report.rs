//! Named report expressions and the type-ahead lookup behind completion.

use bookkeep_core::{ReportContext, TypeAhead, TypeAheadField};

use crate::cli::commands::{split_subcommand, take_option};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;

const REPORT_USAGE: &str = "report <list|<expression> [argument] [--as-of <date>]>";
const SUGGEST_USAGE: &str = "suggest <accounts|securities> <text>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "report",
            "Evaluate a named report expression",
            REPORT_USAGE,
            cmd_report,
        ),
        CommandEntry::new(
            "suggest",
            "Show the type-ahead completion for partial text",
            SUGGEST_USAGE,
            cmd_suggest,
        ),
    ]
}

fn cmd_report(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let mut args = args.to_vec();
    let as_of = take_option(&mut args, "--as-of")?;
    let Some((name, rest)) = args.split_first() else {
        return Err(CommandError::usage(REPORT_USAGE));
    };

    if name.eq_ignore_ascii_case("list") {
        output::section("Report expressions");
        for name in context.expressions.names() {
            output::info(format!("  {name}"));
        }
        return Ok(());
    }

    let as_of = match as_of {
        Some(value) => context.parse_date(value)?,
        None => context.today(),
    };
    let argument = rest.join(" ");
    let book = context.book()?;
    let report = ReportContext::new(book, as_of, context.money());
    let value = context.expressions.evaluate(&report, name, &argument)?;
    if value.is_empty() {
        output::warning(format!("`{name}` has no value for `{argument}`."));
    } else {
        output::info(format!("{name}({argument}) = {value}"));
    }
    Ok(())
}

fn cmd_suggest(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (sub, rest) = split_subcommand(args, SUGGEST_USAGE)?;
    let book = context.book()?;
    let names: Vec<String> = match sub.as_str() {
        "accounts" | "account" => book
            .accounts
            .iter()
            .filter(|account| !account.closed)
            .map(|account| account.name.clone())
            .collect(),
        "securities" | "security" => book.securities.iter().map(|s| s.name.clone()).collect(),
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "cannot suggest `{other}`. Use accounts or securities"
            )))
        }
    };
    let typed = rest.join(" ");
    if typed.is_empty() {
        return Err(CommandError::usage(SUGGEST_USAGE));
    }

    // Feed the text one keystroke at a time, as an input field would.
    let mut field = TypeAheadField::new(TypeAhead::new(names));
    for ch in typed.chars() {
        field.type_text(&ch.to_string());
        field.dispatch_pending();
    }

    match field.selection() {
        Some(range) => {
            let text = field.text();
            let head: String = text.chars().take(range.start).collect();
            let tail: String = text.chars().skip(range.start).collect();
            output::info(format!("{head}[{tail}]"));
        }
        None if field.text() == typed => output::info(format!("{typed} (no match)")),
        None => output::info(field.text()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::cli::core::tests::{run, script_context};
    use crate::cli::core::CommandError;

    #[test]
    fn expressions_evaluate_against_the_open_book() {
        let (_dir, mut context) = script_context();
        run(&mut context, "book new Reports").unwrap();
        run(&mut context, "account add Brokerage investment 5000").unwrap();
        run(&mut context, r#"security add "Acme Corp" ACME"#).unwrap();
        run(&mut context, "buy Brokerage ACME 01/05/2024 12.5 1234.50").unwrap();
        run(&mut context, "report list").unwrap();
        run(&mut context, "report holding.cost Acme Corp").unwrap();
        run(&mut context, "report account.balance Brokerage --as-of 12/31/2024").unwrap();

        assert!(matches!(
            run(&mut context, "report holding.price Acme Corp").unwrap_err(),
            CommandError::Core(_)
        ));
    }

    #[test]
    fn suggest_needs_a_known_list() {
        let (_dir, mut context) = script_context();
        run(&mut context, "book new Names").unwrap();
        run(&mut context, "account add Checking bank").unwrap();
        run(&mut context, "suggest accounts Che").unwrap();
        run(&mut context, "suggest accounts zzz").unwrap();
        assert!(run(&mut context, "suggest payees Che").is_err());
        assert!(run(&mut context, "suggest accounts").is_err());
    }
}
