use bookkeep_core::{
    views::{edit_cell, RegisterModel, TableModel},
    TransactionService,
};
use bookkeep_domain::{Book, Transaction};
use uuid::Uuid;

use crate::cli::commands::{parse_row, split_subcommand, take_option};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::ui::Table;

const TXN_USAGE: &str = "txn <add <account> <date> <payee> <amount> [--to <account>] [--memo <text>]|remove <account> <row>|remove <id>>";
const REGISTER_USAGE: &str = "register <account> | register edit <account> <row> <column> <value>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("txn", "Add or remove transactions", TXN_USAGE, cmd_txn),
        CommandEntry::new(
            "register",
            "Show or edit an account register with running balances",
            REGISTER_USAGE,
            cmd_register,
        ),
    ]
}

fn cmd_txn(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (sub, rest) = split_subcommand(args, TXN_USAGE)?;
    match sub.as_str() {
        "add" => add(context, rest),
        "remove" | "rm" => remove(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown txn subcommand `{other}`. Available: add, remove"
        ))),
    }
}

fn add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let mut args = args.to_vec();
    let transfer = take_option(&mut args, "--to")?;
    let memo = take_option(&mut args, "--memo")?;
    let [account, date, payee, amount] = args.as_slice() else {
        return Err(CommandError::usage(TXN_USAGE));
    };

    let date = context.parse_date(date)?;
    let amount = context.parse_amount(amount)?;
    let book = context.book()?;
    let account_id = ShellContext::find_account(book, account)?.id;
    let mut transaction = Transaction::new(account_id, date, *payee, amount);
    if let Some(target) = transfer {
        transaction = transaction.with_transfer(ShellContext::find_account(book, target)?.id);
    }
    if let Some(memo) = memo {
        transaction = transaction.with_memo(memo);
    }

    let id = context.with_book_mut(|book| Ok(TransactionService::add(book, transaction)?))?;
    output::success(format!(
        "Transaction {} added to `{account}`.",
        short_id(id)
    ));
    Ok(())
}

fn remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let book = context.book()?;
    let id = match args {
        [account, row] => {
            let account_id = ShellContext::find_account(book, account)?.id;
            let model = RegisterModel::new(book, account_id)?;
            let row = parse_row(row)?;
            model
                .rows()
                .get(row)
                .map(|entry| entry.transaction.id)
                .ok_or_else(|| CommandError::InvalidArguments(format!("no row {}", row + 1)))?
        }
        [prefix] => find_by_prefix(book, prefix)?,
        _ => return Err(CommandError::usage(TXN_USAGE)),
    };

    let removed = context.with_book_mut(|book| Ok(TransactionService::remove(book, id)?))?;
    output::success(format!(
        "Removed {} `{}` on {}.",
        short_id(removed.id),
        removed.payee,
        bookkeep_core::dates::format_date(removed.date)
    ));
    Ok(())
}

fn find_by_prefix(book: &Book, prefix: &str) -> Result<Uuid, CommandError> {
    let needle = prefix.to_ascii_lowercase();
    let mut matches = book
        .transactions
        .iter()
        .filter(|txn| txn.id.to_string().starts_with(&needle));
    match (matches.next(), matches.next()) {
        (Some(txn), None) => Ok(txn.id),
        (Some(_), Some(_)) => Err(CommandError::InvalidArguments(format!(
            "transaction id `{prefix}` is ambiguous"
        ))),
        (None, _) => Err(CommandError::InvalidArguments(format!(
            "no transaction with id `{prefix}`"
        ))),
    }
}

fn short_id(id: Uuid) -> String {
    id.to_string().chars().take(8).collect()
}

fn cmd_register(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => Err(CommandError::usage(REGISTER_USAGE)),
        [sub, rest @ ..] if sub.eq_ignore_ascii_case("edit") => edit(context, rest),
        [account, ..] => show(context, account),
    }
}

fn show(context: &ShellContext, account: &str) -> CommandResult {
    let book = context.book()?;
    let found = ShellContext::find_account(book, account)?;
    let model = RegisterModel::new(book, found.id)?;
    let money = context.money();

    output::section(format!("Register: {}", found.name));
    output::info(format!(
        "Opening balance: {}",
        money.format(found.opening_balance)
    ));
    if model.row_count() == 0 {
        output::info("No transactions.");
        return Ok(());
    }
    let mut footer = vec![String::new(); model.column_count()];
    footer[0] = "Ending".to_string();
    footer[model.column_count() - 1] = money.format(model.ending_balance());
    let table = Table::from_model(&model, &context.renderer()).with_footer(footer);
    output::block(&table.render());
    Ok(())
}

/// Edits one register cell and writes every changed transaction back.
fn edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [account, row, column, value @ ..] = args else {
        return Err(CommandError::usage(
            "register edit <account> <row> <column> <value>",
        ));
    };
    let value = value.join(" ");
    let book = context.book()?;
    let account_id = ShellContext::find_account(book, account)?.id;
    let mut model = RegisterModel::new(book, account_id)?;
    let row = parse_row(row)?;
    let col = resolve_column(&model, column)?;

    edit_cell(&mut model, &context.edit_context(), row, col, &value)?;
    let changed: Vec<Transaction> = model.changed_transactions().into_iter().cloned().collect();
    let count = changed.len();
    context.with_book_mut(|book| {
        for transaction in changed {
            TransactionService::replace(book, transaction)?;
        }
        Ok(())
    })?;
    output::success(format!(
        "Updated {} in row {} ({count} transaction(s) changed).",
        model.column_name(col),
        row + 1
    ));
    Ok(())
}

/// Column by header name (case-insensitive) or 1-based position.
pub(crate) fn resolve_column(model: &dyn TableModel, column: &str) -> Result<usize, CommandError> {
    if let Ok(position) = column.parse::<usize>() {
        if (1..=model.column_count()).contains(&position) {
            return Ok(position - 1);
        }
    }
    (0..model.column_count())
        .find(|&idx| model.column_name(idx).eq_ignore_ascii_case(column))
        .ok_or_else(|| {
            let names: Vec<&str> = (0..model.column_count())
                .map(|idx| model.column_name(idx))
                .collect();
            CommandError::InvalidArguments(format!(
                "unknown column `{column}`. Columns: {}",
                names.join(", ")
            ))
        })
}

#[cfg(test)]
mod tests {
    use bookkeep_core::AccountService;

    use crate::cli::core::tests::{run, script_context};
    use crate::cli::core::CommandError;

    #[test]
    fn transfers_move_money_between_accounts() {
        let (_dir, mut context) = script_context();
        run(&mut context, "book new Ledger").unwrap();
        run(&mut context, "account add Checking bank 500").unwrap();
        run(&mut context, "account add Savings bank").unwrap();
        run(
            &mut context,
            r#"txn add Checking 06/01 "To savings" -200 --to Savings --memo monthly"#,
        )
        .unwrap();

        let book = context.book().unwrap();
        let checking = book.account_by_name("Checking").unwrap().id;
        let savings = book.account_by_name("Savings").unwrap().id;
        assert_eq!(AccountService::balance(book, checking), 300.0);
        assert_eq!(AccountService::balance(book, savings), 200.0);
        assert_eq!(book.transactions[0].memo, "monthly");
        assert_eq!(
            book.transactions[0].date,
            chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );
    }

    #[test]
    fn malformed_input_is_rejected() {
        let (_dir, mut context) = script_context();
        run(&mut context, "book new Ledger").unwrap();
        run(&mut context, "account add Checking bank").unwrap();
        assert!(matches!(
            run(&mut context, "txn add Checking 13/01/2024 Shop 10").unwrap_err(),
            CommandError::Core(_)
        ));
        assert!(run(&mut context, "txn add Checking 01/02/2024 Shop 1x0").is_err());
        assert!(run(&mut context, "txn add Nowhere 01/02/2024 Shop 10").is_err());
    }

    #[test]
    fn register_edit_writes_back_and_remove_by_row() {
        let (_dir, mut context) = script_context();
        run(&mut context, "book new Ledger").unwrap();
        run(&mut context, "account add Checking bank 100").unwrap();
        run(&mut context, "txn add Checking 06/02/2024 Grocer -40").unwrap();
        run(&mut context, "txn add Checking 06/01/2024 Employer 500").unwrap();
        run(&mut context, "register Checking").unwrap();

        // Row 2 is the grocer once sorted by date.
        run(&mut context, "register edit Checking 2 payment 45.00").unwrap();
        run(&mut context, "register edit Checking 2 memo weekly shop").unwrap();
        let book = context.book().unwrap();
        let grocer = book.transactions.iter().find(|t| t.payee == "Grocer").unwrap();
        assert_eq!(grocer.amount, -45.0);
        assert_eq!(grocer.memo, "weekly shop");
        assert!(run(&mut context, "register edit Checking 2 balance 1").is_err());
        assert!(run(&mut context, "register edit Checking 9 memo x").is_err());

        run(&mut context, "txn remove Checking 1").unwrap();
        let book = context.book().unwrap();
        assert_eq!(book.transactions.len(), 1);
        assert_eq!(book.transactions[0].payee, "Grocer");
    }

    #[test]
    fn remove_by_id_prefix() {
        let (_dir, mut context) = script_context();
        run(&mut context, "book new Ledger").unwrap();
        run(&mut context, "account add Checking bank").unwrap();
        run(&mut context, "txn add Checking 06/02/2024 Cafe -4.5").unwrap();
        let id = context.book().unwrap().transactions[0].id.to_string();
        run(&mut context, &format!("txn remove {}", &id[..8])).unwrap();
        assert!(context.book().unwrap().transactions.is_empty());
    }
}
