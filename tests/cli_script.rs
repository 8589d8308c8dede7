mod common;

use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

use common::script_command;

#[test]
fn script_mode_runs_basic_flow() {
    let home = TempDir::new().unwrap();
    let input = "\
# household books
book new Household
account add Checking bank 1,000
account add Savings bank
txn add Checking 06/01/2024 \"Corner Grocer\" -42.10
txn add Checking 06/03/2024 Transfer -200 --to Savings
register Checking
book save
exit
";

    script_command(home.path())
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("New book `Household` created"))
        .stdout(contains("Register: Checking"))
        .stdout(contains("Ending"))
        .stdout(contains("757.90"))
        .stdout(contains("Book saved"));

    let saved = home.path().join("books").join("household.bkb");
    let json = std::fs::read_to_string(saved).unwrap();
    assert!(json.contains("\"Household\""));
    assert!(json.contains("Corner Grocer"));
}

#[test]
fn saved_book_reopens_in_a_later_session() {
    let home = TempDir::new().unwrap();
    script_command(home.path())
        .write_stdin("book new Later\naccount add Wallet cash 20\nbook save\n")
        .assert()
        .success();

    script_command(home.path())
        .write_stdin("book list\nbook open Later\naccount list\n")
        .assert()
        .success()
        .stdout(contains("Opened book `Later`"))
        .stdout(contains("Wallet"));
}

#[test]
fn unknown_commands_get_a_suggestion() {
    let home = TempDir::new().unwrap();
    script_command(home.path())
        .write_stdin("acount list\n")
        .assert()
        .success()
        .stdout(contains("Unknown command `acount`"))
        .stdout(contains("Did you mean `account`?"));
}

#[test]
fn command_errors_are_reported_and_the_script_continues() {
    let home = TempDir::new().unwrap();
    let input = "\
account list
book new Errors
account add Checking bank
txn add Checking 13/45/2024 Shop 10
account list
";
    script_command(home.path())
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("No book open"))
        .stdout(contains("[x] "))
        .stdout(contains("Checking"))
        .stderr(contains("panicked").not());
}

#[test]
fn investments_show_up_in_holdings_and_reports() {
    let home = TempDir::new().unwrap();
    let input = "\
book new Portfolio
account add Brokerage investment 10000
security add \"Acme Corp\" ACME
price add ACME 06/01/2024 130
buy Brokerage ACME 01/10/2023 10 1000
buy Brokerage ACME 03/10/2023 10 1200
sell Brokerage ACME 02/01/2024 15 2250
holdings
gains
report holding.cost Acme Corp
report gains.total
";
    script_command(home.path())
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Holdings as of 06/15/2024"))
        .stdout(contains("Acme Corp"))
        .stdout(contains("650.00"))
        .stdout(contains("holding.cost(Acme Corp) = 600.00"))
        .stdout(contains("gains.total() = 650.00"));
}

#[test]
fn schedules_post_through_the_pinned_date() {
    let home = TempDir::new().unwrap();
    let input = "\
book new Bills
account add Checking bank 3000
schedule add Rent Checking -1000 1 month 04/01/2024 --payee Landlord
schedule due
schedule post
report account.balance Checking
";
    script_command(home.path())
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Posted 3 scheduled transaction(s)"))
        .stdout(contains("account.balance(Checking) = 0.00"));
}
