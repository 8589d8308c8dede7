mod common;

use bookkeep::cli::output::{set_preferences, OutputPreferences};
use bookkeep::cli::ui::table_renderer::{horizontal_rule, render_cell, visible_width};
use bookkeep::cli::ui::{Alignment, Table, TableColumn};
use bookkeep_core::views::{AccountModel, CellRenderer};
use bookkeep_domain::{Account, AccountKind, Book};

use common::PREFERENCES_LOCK;

fn plain() -> OutputPreferences {
    OutputPreferences {
        plain_mode: true,
        color_enabled: false,
    }
}

#[test]
fn width_calculation_respects_constraints() {
    let columns = vec![
        TableColumn {
            header: "Account".into(),
            min_width: 4,
            max_width: Some(8),
            alignment: Alignment::Left,
        },
        TableColumn {
            header: "Notes".into(),
            min_width: 10,
            max_width: None,
            alignment: Alignment::Left,
        },
    ];
    let mut table = Table::new(columns);
    table.rows = vec![
        vec!["AlphaBetaGamma".into(), "Short".into()],
        vec!["BB".into(), "Detailed overview entry".into()],
    ];

    assert_eq!(table.compute_widths(), vec![8, 23]);
}

#[test]
fn render_cell_respects_alignment() {
    assert_eq!(render_cell("AB", 4, &Alignment::Left, 1), " AB   ");
    assert_eq!(render_cell("AB", 4, &Alignment::Right, 1), "   AB ");
    assert_eq!(render_cell("X", 5, &Alignment::Center, 1), "   X   ");
}

#[test]
fn truncation_adds_ellipsis_and_resets_styles() {
    let styled = "\u{1b}[31mOverdrawn\u{1b}[0m";
    assert_eq!(visible_width(styled), 9);

    let cell = render_cell(styled, 5, &Alignment::Left, 0);
    assert_eq!(visible_width(&cell), 5);
    assert!(cell.contains('…'));
    assert!(cell.ends_with("\u{1b}[0m"));
}

#[test]
fn footer_sits_under_its_own_rule() {
    let _guard = PREFERENCES_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    set_preferences(plain());

    let mut table = Table::new(vec![
        TableColumn::new("Payee", Alignment::Left),
        TableColumn::new("Amount", Alignment::Right),
    ]);
    table.rows = vec![vec!["Grocer".into(), "-42.10".into()]];
    let rendered = table
        .with_footer(vec!["Ending".into(), "957.90".into()])
        .render();

    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[1], horizontal_rule(&[6, 6], 1));
    assert!(lines[1].chars().all(|c| c == '-'));
    assert_eq!(lines[3], lines[1]);
    assert_eq!(lines[4], " Ending   957.90");

    set_preferences(OutputPreferences::default());
}

#[test]
fn model_tables_right_align_money() {
    let _guard = PREFERENCES_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    set_preferences(plain());

    let mut book = Book::new("Render");
    book.accounts
        .push(Account::new("Checking", AccountKind::Bank).with_opening_balance(1234.5));
    let model = AccountModel::new(&book, false);
    let table = Table::from_model(&model, &CellRenderer::default());

    let numeric: Vec<_> = table
        .columns
        .iter()
        .filter(|c| c.alignment == Alignment::Right)
        .collect();
    assert!(!numeric.is_empty());
    let rendered = table.render();
    assert!(rendered.contains("Checking"));
    assert!(rendered.contains("1,234.50"));
    assert!(!rendered.contains('\u{1b}'));

    set_preferences(OutputPreferences::default());
}
