use bookkeep_domain::{Account, Book};

use super::{CellValue, Column, ColumnKind, TableModel};
use crate::account_service::AccountService;

const COLUMNS: [Column; 4] = [
    Column::read_only("Name", ColumnKind::Text),
    Column::read_only("Kind", ColumnKind::Text),
    Column::read_only("Linked", ColumnKind::Text),
    Column::read_only("Balance", ColumnKind::Money),
];

struct AccountRow {
    account: Account,
    linked_name: String,
    balance: f64,
}

/// Account list with current balances. Closed accounts are hidden unless
/// requested.
pub struct AccountModel {
    rows: Vec<AccountRow>,
}

impl AccountModel {
    pub fn new(book: &Book, include_closed: bool) -> Self {
        let mut rows: Vec<_> = book
            .accounts
            .iter()
            .filter(|account| include_closed || !account.closed)
            .map(|account| AccountRow {
                linked_name: account
                    .linked_account
                    .and_then(|id| book.account_name(id))
                    .unwrap_or_default()
                    .to_string(),
                balance: AccountService::balance(book, account.id),
                account: account.clone(),
            })
            .collect();
        rows.sort_by_key(|row| row.account.name.to_lowercase());
        Self { rows }
    }

    pub fn account(&self, row: usize) -> Option<&Account> {
        self.rows.get(row).map(|r| &r.account)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.account.name.as_str())
    }
}

impl TableModel for AccountModel {
    fn columns(&self) -> &[Column] {
        &COLUMNS
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn value_at(&self, row: usize, col: usize) -> CellValue {
        let Some(entry) = self.rows.get(row) else {
            return CellValue::Empty;
        };
        match col {
            0 if entry.account.closed => CellValue::Text(format!("{} (closed)", entry.account.name)),
            0 => CellValue::text(entry.account.name.clone()),
            1 => CellValue::Text(entry.account.kind.to_string()),
            2 => CellValue::text(entry.linked_name.clone()),
            3 => CellValue::Money(entry.balance),
            _ => CellValue::Empty,
        }
    }
}
