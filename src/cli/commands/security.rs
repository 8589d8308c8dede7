//! Securities, price histories and investment activity.

use bookkeep_core::{
    money::parse_split_ratio,
    views::{edit_cell, CapitalGainModel, HoldingsModel, PriceHistoryModel, TableModel},
    PortfolioService, SecurityService, TransactionService,
};
use bookkeep_domain::{
    InvestmentAction, InvestmentDetail, PriceEntry, Security, SplitRatio, Transaction,
};

use crate::cli::commands::{parse_row, split_subcommand, transaction::resolve_column};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::ui::{Alignment, Table, TableColumn};

const SECURITY_USAGE: &str = "security <add <name> <symbol>|list>";
const PRICE_USAGE: &str = "price <add <security> <date> <price> [split]|list <security>|edit <security> <row> <column> <value>|remove <security> <date>>";
const BUY_USAGE: &str = "buy <account> <security> <date> <shares> <amount>";
const SELL_USAGE: &str = "sell <account> <security> <date> <shares> <amount>";
const DIVIDEND_USAGE: &str = "dividend <account> <security> <date> <amount>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("security", "Add or list securities", SECURITY_USAGE, cmd_security),
        CommandEntry::new("price", "Maintain security price histories", PRICE_USAGE, cmd_price),
        CommandEntry::new("buy", "Record a purchase of shares", BUY_USAGE, cmd_buy),
        CommandEntry::new("sell", "Record a sale of shares", SELL_USAGE, cmd_sell),
        CommandEntry::new("dividend", "Record a dividend payment", DIVIDEND_USAGE, cmd_dividend),
        CommandEntry::new("holdings", "Show current holdings", "holdings [date]", cmd_holdings),
        CommandEntry::new("gains", "Show realized capital gains", "gains [date]", cmd_gains),
    ]
}

fn cmd_security(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (sub, rest) = split_subcommand(args, SECURITY_USAGE)?;
    match sub.as_str() {
        "add" => {
            let [name, symbol] = rest else {
                return Err(CommandError::usage("security add <name> <symbol>"));
            };
            let security = Security::new(*name, *symbol);
            context.with_book_mut(|book| Ok(SecurityService::add(book, security)?))?;
            output::success(format!("Security `{name}` added."));
            Ok(())
        }
        "list" => list_securities(context),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown security subcommand `{other}`. Available: add, list"
        ))),
    }
}

fn list_securities(context: &ShellContext) -> CommandResult {
    let book = context.book()?;
    output::section("Securities");
    if book.securities.is_empty() {
        output::info("No securities yet. Use `security add` to create one.");
        return Ok(());
    }
    let money = context.money();
    let mut securities: Vec<&Security> = book.securities.iter().collect();
    securities.sort_by_key(|security| security.name.to_lowercase());

    let mut table = Table::new(vec![
        TableColumn::new("Name", Alignment::Left),
        TableColumn::new("Symbol", Alignment::Left),
        TableColumn::new("Latest", Alignment::Right),
        TableColumn::new("As of", Alignment::Left),
    ]);
    table.rows = securities
        .into_iter()
        .map(|security| {
            let latest = security.latest_price();
            vec![
                security.name.clone(),
                security.symbol.clone(),
                latest.map(|p| money.format_price(p.price)).unwrap_or_default(),
                latest
                    .map(|p| bookkeep_core::dates::format_date(p.date))
                    .unwrap_or_default(),
            ]
        })
        .collect();
    output::block(&table.render());
    Ok(())
}

fn cmd_price(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (sub, rest) = split_subcommand(args, PRICE_USAGE)?;
    match sub.as_str() {
        "add" => price_add(context, rest),
        "list" => price_list(context, rest),
        "edit" => price_edit(context, rest),
        "remove" | "rm" => price_remove(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown price subcommand `{other}`. Available: add, list, edit, remove"
        ))),
    }
}

fn price_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [security, date, price, rest @ ..] = args else {
        return Err(CommandError::usage("price add <security> <date> <price> [split]"));
    };
    let date = context.parse_date(date)?;
    let price = context.parse_price(price)?;
    let split = match rest.first() {
        Some(ratio) => parse_split_ratio(ratio)?,
        None => SplitRatio::NONE,
    };
    let id = ShellContext::find_security(context.book()?, security)?.id;
    let entry = PriceEntry::new(date, price).with_split(split);
    context.with_book_mut(|book| Ok(SecurityService::record_price(book, id, entry)?))?;
    output::success(format!(
        "Price for `{security}` on {} recorded.",
        bookkeep_core::dates::format_date(date)
    ));
    Ok(())
}

fn price_list(context: &ShellContext, args: &[&str]) -> CommandResult {
    let name = args
        .first()
        .ok_or_else(|| CommandError::usage("price list <security>"))?;
    let security = ShellContext::find_security(context.book()?, name)?;
    let model = PriceHistoryModel::new(security);
    output::section(format!("Prices: {} ({})", security.name, security.symbol));
    if model.row_count() == 0 {
        output::info("No prices recorded.");
        return Ok(());
    }
    output::block(&Table::from_model(&model, &context.renderer()).render());
    Ok(())
}

/// Edits one cell of the price-history view and stores the whole history.
fn price_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [security, row, column, value @ ..] = args else {
        return Err(CommandError::usage(
            "price edit <security> <row> <Date|Price|Split> <value>",
        ));
    };
    let value = value.join(" ");
    let found = ShellContext::find_security(context.book()?, security)?;
    let mut model = PriceHistoryModel::new(found);
    let row = parse_row(row)?;
    let col = resolve_column(&model, column)?;
    edit_cell(&mut model, &context.edit_context(), row, col, &value)?;

    if !model.is_modified() {
        output::info("Nothing changed.");
        return Ok(());
    }
    let id = model.security_id();
    context.with_book_mut(|book| Ok(SecurityService::replace_history(book, id, model.into_entries())?))?;
    output::success(format!("Price history for `{security}` updated."));
    Ok(())
}

fn price_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [security, date] = args else {
        return Err(CommandError::usage("price remove <security> <date>"));
    };
    let date = context.parse_date(date)?;
    let id = ShellContext::find_security(context.book()?, security)?.id;
    let removed = context.with_book_mut(|book| Ok(SecurityService::remove_price(book, id, date)?))?;
    output::success(format!(
        "Removed price {} on {}.",
        context.money().format_price(removed.price),
        bookkeep_core::dates::format_date(removed.date)
    ));
    Ok(())
}

fn cmd_buy(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    record_trade(context, args, InvestmentAction::Buy, BUY_USAGE)
}

fn cmd_sell(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    record_trade(context, args, InvestmentAction::Sell, SELL_USAGE)
}

fn cmd_dividend(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [account, security, date, amount] = args else {
        return Err(CommandError::usage(DIVIDEND_USAGE));
    };
    let date = context.parse_date(date)?;
    let amount = context.parse_amount(amount)?.abs();
    post_investment(context, account, security, date, amount, InvestmentAction::Dividend, 0.0)
}

/// Buys take cash out of the account (negative amount); sells put it back.
fn record_trade(
    context: &mut ShellContext,
    args: &[&str],
    action: InvestmentAction,
    usage: &str,
) -> CommandResult {
    let [account, security, date, shares, amount] = args else {
        return Err(CommandError::usage(usage));
    };
    let date = context.parse_date(date)?;
    let shares = context.parse_shares(shares)?;
    let amount = context.parse_amount(amount)?.abs();
    let signed = match action {
        InvestmentAction::Buy => -amount,
        _ => amount,
    };
    post_investment(context, account, security, date, signed, action, shares)
}

fn post_investment(
    context: &mut ShellContext,
    account: &str,
    security: &str,
    date: chrono::NaiveDate,
    amount: f64,
    action: InvestmentAction,
    shares: f64,
) -> CommandResult {
    let book = context.book()?;
    let found = ShellContext::find_account(book, account)?;
    if !found.is_investment() {
        return Err(CommandError::InvalidArguments(format!(
            "`{}` is not an investment account",
            found.name
        )));
    }
    let account_id = found.id;
    let security = ShellContext::find_security(book, security)?;
    let payee = format!("{action} {}", security.name);
    let transaction = Transaction::new(account_id, date, payee, amount)
        .with_investment(InvestmentDetail::new(security.id, action, shares));

    context.with_book_mut(|book| Ok(TransactionService::add(book, transaction)?))?;
    output::success(format!("{action} recorded."));
    Ok(())
}

fn cmd_holdings(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let as_of = context.date_or_today(args.first())?;
    let book = context.book()?;
    let model = HoldingsModel::new(PortfolioService::holdings(book, as_of));
    output::section(format!(
        "Holdings as of {}",
        bookkeep_core::dates::format_date(as_of)
    ));
    if model.row_count() == 0 {
        output::info("No open positions.");
        return Ok(());
    }
    let mut footer = vec![String::new(); model.column_count()];
    footer[0] = "Total".to_string();
    footer[4] = context.money().format(model.total_market_value());
    let table = Table::from_model(&model, &context.renderer()).with_footer(footer);
    output::block(&table.render());
    Ok(())
}

fn cmd_gains(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let as_of = context.date_or_today(args.first())?;
    let book = context.book()?;
    let model = CapitalGainModel::new(PortfolioService::capital_gains(book, as_of));
    output::section(format!(
        "Capital gains through {}",
        bookkeep_core::dates::format_date(as_of)
    ));
    if model.row_count() == 0 {
        output::info("No realized gains.");
        return Ok(());
    }
    let money = context.money();
    let totals = model.totals();
    let mut footer = vec![String::new(); model.column_count()];
    footer[0] = "Total".to_string();
    footer[4] = money.format(totals.cost_basis);
    footer[5] = money.format(totals.sell_amount);
    footer[6] = money.format(totals.gain);
    let table = Table::from_model(&model, &context.renderer()).with_footer(footer);
    output::block(&table.render());
    output::info(format!(
        "Short term: {}   Long term: {}",
        money.format(totals.short_term),
        money.format(totals.long_term)
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use bookkeep_core::PortfolioService;
    use chrono::NaiveDate;

    use crate::cli::core::tests::{run, script_context};

    fn setup() -> (tempfile::TempDir, crate::cli::core::ShellContext) {
        let (dir, mut context) = script_context();
        run(&mut context, "book new Portfolio").unwrap();
        run(&mut context, "account add Brokerage investment 10000").unwrap();
        run(&mut context, r#"security add "Acme Corp" acme"#).unwrap();
        (dir, context)
    }

    #[test]
    fn trades_feed_fifo_holdings_and_gains() {
        let (_dir, mut context) = setup();
        run(&mut context, "buy Brokerage ACME 01/10/2023 10 1,000").unwrap();
        run(&mut context, "buy Brokerage ACME 03/10/2023 10 1,200").unwrap();
        run(&mut context, "sell Brokerage ACME 02/01/2024 15 2,250").unwrap();
        run(&mut context, "holdings").unwrap();
        run(&mut context, "gains").unwrap();

        let book = context.book().unwrap();
        let as_of = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let holdings = PortfolioService::holdings(book, as_of);
        assert_eq!(holdings.len(), 1);
        assert!((holdings[0].total_shares - 5.0).abs() < 1e-9);
        assert_eq!(holdings[0].total_cost, 600.0);

        let gains = PortfolioService::capital_gains(book, as_of);
        let total: f64 = gains.iter().map(|g| g.gain()).sum();
        assert!((total - 650.0).abs() < 0.005);
    }

    #[test]
    fn trades_need_an_investment_account() {
        let (_dir, mut context) = setup();
        run(&mut context, "account add Checking bank").unwrap();
        assert!(run(&mut context, "buy Checking ACME 01/10/2024 1 10").is_err());
        assert!(run(&mut context, "buy Brokerage ACME 01/10/2024 0 10").is_err());
        assert!(run(&mut context, "dividend Brokerage Missing 01/10/2024 10").is_err());
    }

    #[test]
    fn price_history_edit_and_remove() {
        let (_dir, mut context) = setup();
        run(&mut context, "price add ACME 01/02/2024 10.00").unwrap();
        run(&mut context, "price add ACME 02/01/2024 12.50 2:1").unwrap();
        run(&mut context, "price edit ACME 1 price 11").unwrap();
        run(&mut context, "price list ACME").unwrap();

        let book = context.book().unwrap();
        let history = book.securities[0].price_history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].price, 11.0);
        assert_eq!(history[1].split_ratio.multiplier(), 2.0);

        // Moving the first entry onto the second's date is refused.
        assert!(run(&mut context, "price edit ACME 1 date 02/01/2024").is_err());
        assert!(run(&mut context, "price add ACME 03/01/2024 -1").is_err());

        run(&mut context, "price remove ACME 01/02/2024").unwrap();
        assert_eq!(context.book().unwrap().securities[0].price_history().len(), 1);
        assert!(run(&mut context, "price remove ACME 01/02/2024").is_err());
    }

    #[test]
    fn fund_prices_keep_four_decimals() {
        let (_dir, mut context) = setup();
        run(&mut context, "price add ACME 01/02/2024 12.3456").unwrap();
        run(&mut context, "price add ACME 02/01/2024 0.0042").unwrap();
        run(&mut context, "price edit ACME 2 price 0.0043").unwrap();
        run(&mut context, "security list").unwrap();

        let history = context.book().unwrap().securities[0].price_history().to_vec();
        assert_eq!(history[0].price, 12.3456);
        assert_eq!(history[1].price, 0.0043);
        assert_eq!(context.money().format_price(history[0].price), "12.3456");
    }
}
