use bookkeep_core::{
    views::{ScheduledModel, TableModel},
    ScheduleService,
};
use bookkeep_domain::{ScheduledTransaction, TimeInterval, TimeUnit};

use crate::cli::commands::{split_subcommand, take_option};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::ui::Table;

const USAGE: &str = "schedule <add <name> <account> <amount> <every> <unit> <next-date> [--payee <text>] [--to <account>] [--end <date>]|list|due [date]|post [date]|remove <name>>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "schedule",
        "Manage repeating transactions and post the ones that are due",
        USAGE,
        cmd_schedule,
    )]
}

fn cmd_schedule(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (sub, rest) = split_subcommand(args, USAGE)?;
    match sub.as_str() {
        "add" => add(context, rest),
        "list" => list(context),
        "due" => due(context, rest),
        "post" => post(context, rest),
        "remove" | "rm" => remove(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown schedule subcommand `{other}`. Available: add, list, due, post, remove"
        ))),
    }
}

fn add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let mut args = args.to_vec();
    let payee = take_option(&mut args, "--payee")?;
    let transfer = take_option(&mut args, "--to")?;
    let end = take_option(&mut args, "--end")?;
    let [name, account, amount, every, unit, next] = args.as_slice() else {
        return Err(CommandError::usage(USAGE));
    };

    let amount = context.parse_amount(amount)?;
    let every = every
        .parse::<u32>()
        .ok()
        .filter(|n| *n >= 1)
        .ok_or_else(|| {
            CommandError::InvalidArguments(format!("interval must be a whole number above 0, got `{every}`"))
        })?;
    let unit = TimeUnit::parse(unit).ok_or_else(|| {
        CommandError::InvalidArguments(format!("unknown time unit `{unit}` (day|week|month|year)"))
    })?;
    let next_date = context.parse_date(next)?;
    let end_date = end.map(|value| context.parse_date(value)).transpose()?;

    let book = context.book()?;
    let account_id = ShellContext::find_account(book, account)?.id;
    let mut schedule = ScheduledTransaction::new(
        *name,
        account_id,
        amount,
        TimeInterval::new(every, unit),
        next_date,
    );
    if let Some(target) = transfer {
        schedule.transfer_account = Some(ShellContext::find_account(book, target)?.id);
    }
    if let Some(payee) = payee {
        schedule.payee = payee.to_string();
    }
    schedule.end_date = end_date;

    let interval = schedule.interval;
    context.with_book_mut(|book| Ok(ScheduleService::add(book, schedule)?))?;
    output::success(format!("Schedule `{name}` added ({interval})."));
    Ok(())
}

fn list(context: &ShellContext) -> CommandResult {
    let model = ScheduledModel::new(context.book()?);
    output::section("Scheduled transactions");
    if model.row_count() == 0 {
        output::info("Nothing scheduled.");
        return Ok(());
    }
    output::block(&Table::from_model(&model, &context.renderer()).render());
    Ok(())
}

fn due(context: &ShellContext, args: &[&str]) -> CommandResult {
    let through = context.date_or_today(args.first())?;
    let book = context.book()?;
    let occurrences = ScheduleService::due(book, through);
    output::section(format!(
        "Due through {}",
        bookkeep_core::dates::format_date(through)
    ));
    if occurrences.is_empty() {
        output::info("Nothing due.");
        return Ok(());
    }
    let money = context.money();
    for occurrence in &occurrences {
        let amount = book
            .scheduled_transaction(occurrence.schedule_id)
            .map(|s| money.format(s.amount))
            .unwrap_or_default();
        output::info(format!(
            "  {}  {:<24} {amount:>12}",
            bookkeep_core::dates::format_date(occurrence.date),
            occurrence.name
        ));
    }
    Ok(())
}

fn post(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let through = context.date_or_today(args.first())?;
    if ScheduleService::due(context.book()?, through).is_empty() {
        output::info("Nothing due.");
        return Ok(());
    }
    let posted = context.with_book_mut(|book| Ok(ScheduleService::post_due(book, through)?))?;
    output::success(format!("Posted {} scheduled transaction(s).", posted.len()));
    Ok(())
}

fn remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = args.join(" ");
    if name.trim().is_empty() {
        return Err(CommandError::usage("schedule remove <name>"));
    }
    let id = context
        .book()?
        .scheduled_by_name(&name)
        .map(|s| s.id)
        .ok_or_else(|| CommandError::InvalidArguments(format!("no schedule named `{name}`")))?;
    if !context.confirm(&format!("Remove schedule `{name}`?"), false)? {
        output::info("Operation cancelled.");
        return Ok(());
    }
    let removed = context.with_book_mut(|book| Ok(ScheduleService::remove(book, id)?))?;
    output::success(format!("Schedule `{}` removed.", removed.name));
    Ok(())
}

#[cfg(test)]
mod tests {
    use bookkeep_core::{AccountService, ScheduleService};
    use chrono::NaiveDate;

    use crate::cli::core::tests::{run, script_context};

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn monthly_rent_posts_every_due_occurrence() {
        let (_dir, mut context) = script_context();
        run(&mut context, "book new Home").unwrap();
        run(&mut context, "account add Checking bank 5000").unwrap();
        run(
            &mut context,
            "schedule add Rent Checking -1200 1 month 04/01/2024 --payee Landlord --end 12/01/2024",
        )
        .unwrap();
        run(&mut context, "schedule list").unwrap();
        run(&mut context, "schedule due").unwrap();

        assert_eq!(ScheduleService::due(context.book().unwrap(), date(6, 15)).len(), 3);
        run(&mut context, "schedule post").unwrap();

        let book = context.book().unwrap();
        let checking = book.account_by_name("Checking").unwrap().id;
        assert_eq!(book.transactions.len(), 3);
        assert!(book.transactions.iter().all(|t| t.payee == "Landlord"));
        assert_eq!(AccountService::balance(book, checking), 1400.0);
        assert_eq!(book.scheduled[0].next_date, date(7, 1));
        assert!(ScheduleService::due(book, date(6, 15)).is_empty());
    }

    #[test]
    fn invalid_schedules_are_rejected_and_remove_works() {
        let (_dir, mut context) = script_context();
        run(&mut context, "book new Home").unwrap();
        run(&mut context, "account add Checking bank").unwrap();
        assert!(run(&mut context, "schedule add Gym Checking -30 0 month 07/01/2024").is_err());
        assert!(run(&mut context, "schedule add Gym Checking -30 1 fortnight 07/01/2024").is_err());
        assert!(run(
            &mut context,
            "schedule add Gym Checking -30 1 month 07/01/2024 --end 06/01/2024"
        )
        .is_err());

        run(&mut context, "schedule add Gym Checking -30 2 weeks 07/01/2024").unwrap();
        assert!(run(&mut context, "schedule add gym Checking -30 1 week 07/01/2024").is_err());
        run(&mut context, "schedule remove Gym").unwrap();
        assert!(context.book().unwrap().scheduled.is_empty());
        assert!(run(&mut context, "schedule remove Gym").is_err());
    }
}
