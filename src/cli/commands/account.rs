use bookkeep_core::{
    views::{AccountModel, TableModel},
    AccountLinkModel, AccountService,
};
use bookkeep_domain::{Account, AccountKind};
use dialoguer::Select;

use crate::cli::commands::split_subcommand;
use crate::cli::core::{CliMode, CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::ui::Table;

const USAGE: &str = "account <add <name> <kind> [opening]|list [--all]|rename <name> <new>|close <name>|link <name> [target|None]>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "account",
        "Add, list, rename, close and link accounts",
        USAGE,
        cmd_account,
    )]
}

fn cmd_account(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (sub, rest) = split_subcommand(args, USAGE)?;
    match sub.as_str() {
        "add" => add(context, rest),
        "list" => list(context, rest),
        "rename" => rename(context, rest),
        "close" => close(context, rest),
        "link" => link(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown account subcommand `{other}`. Available: add, list, rename, close, link"
        ))),
    }
}

fn add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [name, kind, rest @ ..] = args else {
        return Err(CommandError::usage(
            "account add <name> <bank|cash|credit|investment|asset|liability> [opening]",
        ));
    };
    let kind = AccountKind::parse(kind)
        .ok_or_else(|| CommandError::InvalidArguments(format!("unknown account kind `{kind}`")))?;
    let opening = match rest.first() {
        Some(amount) => context.parse_amount(amount)?,
        None => 0.0,
    };
    let account = Account::new(*name, kind).with_opening_balance(opening);
    context.with_book_mut(|book| Ok(AccountService::add(book, account)?))?;
    output::success(format!("Account `{name}` added."));
    Ok(())
}

fn list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let include_closed = args.iter().any(|arg| arg.eq_ignore_ascii_case("--all"));
    let book = context.book()?;
    let model = AccountModel::new(book, include_closed);
    output::section("Accounts");
    if model.row_count() == 0 {
        output::info("No accounts yet. Use `account add` to create one.");
        return Ok(());
    }
    output::block(&Table::from_model(&model, &context.renderer()).render());
    Ok(())
}

fn rename(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [name, new_name] = args else {
        return Err(CommandError::usage("account rename <name> <new name>"));
    };
    context.with_book_mut(|book| {
        let id = ShellContext::find_account(book, name)?.id;
        Ok(AccountService::rename(book, id, new_name)?)
    })?;
    output::success(format!("Account `{name}` renamed to `{new_name}`."));
    Ok(())
}

fn close(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = args
        .first()
        .ok_or_else(|| CommandError::usage("account close <name>"))?;
    let id = ShellContext::find_account(context.book()?, name)?.id;
    if !context.confirm(&format!("Close account `{name}`?"), false)? {
        output::info("Operation cancelled.");
        return Ok(());
    }
    context.with_book_mut(|book| Ok(AccountService::close(book, id)?))?;
    output::success(format!("Account `{name}` closed."));
    Ok(())
}

/// Picks the linked account through [`AccountLinkModel`]: by label when one
/// is given, with a menu in interactive mode, otherwise lists the choices.
fn link(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = args
        .first()
        .ok_or_else(|| CommandError::usage("account link <name> [target|None]"))?;
    let book = context.book()?;
    let owner = ShellContext::find_account(book, name)?.id;
    let mut model = AccountLinkModel::new(book, owner)?;

    match args.get(1) {
        Some(target) => {
            if !model.select_label(target) {
                return Err(CommandError::InvalidArguments(format!(
                    "`{target}` is not a linkable account. Choices: {}",
                    model.labels().join(", ")
                )));
            }
        }
        None if context.mode == CliMode::Interactive => {
            let labels = model.labels();
            let choice = Select::with_theme(&context.theme)
                .with_prompt(format!("Link `{name}` to"))
                .items(&labels)
                .default(model.selected_index())
                .interact_opt()?;
            match choice {
                Some(index) => {
                    model.select_index(index);
                }
                None => {
                    output::info("Operation cancelled.");
                    return Ok(());
                }
            }
        }
        None => {
            output::section(format!("Link choices for {name}"));
            for (idx, label) in model.labels().iter().enumerate() {
                let marker = if idx == model.selected_index() { "*" } else { " " };
                output::info(format!(" {marker} {label}"));
            }
            return Ok(());
        }
    }

    let label = model.selected_item().label.clone();
    context.with_book_mut(|book| Ok(model.apply(book)?))?;
    output::success(format!("Account `{name}` linked to {label}."));
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::cli::core::tests::{run, script_context};

    #[test]
    fn add_rename_and_close() {
        let (_dir, mut context) = script_context();
        run(&mut context, "book new Accounts").unwrap();
        run(&mut context, "account add Checking bank 1,000.50").unwrap();
        run(&mut context, r#"account add "Credit Card" credit"#).unwrap();
        run(&mut context, "account rename checking Everyday").unwrap();
        run(&mut context, r#"account close "Credit Card""#).unwrap();

        let book = context.book().unwrap();
        let everyday = book.account_by_name("Everyday").unwrap();
        assert_eq!(everyday.opening_balance, 1000.5);
        assert!(book.account_by_name("Credit Card").unwrap().closed);
        assert!(run(&mut context, "account add Broken nonsense").is_err());
        assert!(run(&mut context, "account add Everyday bank").is_err());
    }

    #[test]
    fn link_by_label_and_clear() {
        let (_dir, mut context) = script_context();
        run(&mut context, "book new Links").unwrap();
        run(&mut context, "account add Brokerage investment").unwrap();
        run(&mut context, "account add Cash cash").unwrap();
        run(&mut context, "account link Brokerage cash").unwrap();

        let book = context.book().unwrap();
        let cash = book.account_by_name("Cash").unwrap().id;
        assert_eq!(
            book.account_by_name("Brokerage").unwrap().linked_account,
            Some(cash)
        );

        run(&mut context, "account link Brokerage None").unwrap();
        let book = context.book().unwrap();
        assert_eq!(book.account_by_name("Brokerage").unwrap().linked_account, None);
        assert!(run(&mut context, "account link Brokerage Brokerage").is_err());
        run(&mut context, "account link Brokerage").unwrap();
    }
}
