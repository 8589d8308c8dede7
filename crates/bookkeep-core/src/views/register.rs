//! Account register: transactions with a running balance.

use std::collections::{HashMap, HashSet};

use bookkeep_domain::{round_cents, Book, Transaction, TransactionBalance};
use tracing::debug;
use uuid::Uuid;

use super::{text_of, CellValue, Column, ColumnKind, TableModel};
use crate::{error::EditError, CoreError};

pub const COL_DATE: usize = 0;
pub const COL_PAYEE: usize = 1;
pub const COL_TRANSFER: usize = 2;
pub const COL_MEMO: usize = 3;
pub const COL_PAYMENT: usize = 4;
pub const COL_DEPOSIT: usize = 5;
pub const COL_BALANCE: usize = 6;

const COLUMNS: [Column; 7] = [
    Column::editable("Date", ColumnKind::Date),
    Column::editable("Payee", ColumnKind::Text),
    Column::read_only("Transfer", ColumnKind::Text),
    Column::editable("Memo", ColumnKind::Text),
    Column::editable("Payment", ColumnKind::Money),
    Column::editable("Deposit", ColumnKind::Money),
    Column::read_only("Balance", ColumnKind::Money),
];

pub struct RegisterModel {
    account_id: Uuid,
    opening_balance: f64,
    account_names: HashMap<Uuid, String>,
    rows: Vec<TransactionBalance>,
    dirty: HashSet<Uuid>,
}

impl RegisterModel {
    pub fn new(book: &Book, account_id: Uuid) -> Result<Self, CoreError> {
        let account = book
            .account(account_id)
            .ok_or_else(|| CoreError::AccountNotFound(account_id.to_string()))?;
        let account_names = book
            .accounts
            .iter()
            .map(|a| (a.id, a.name.clone()))
            .collect();
        let mut model = Self {
            account_id,
            opening_balance: account.opening_balance,
            account_names,
            rows: book
                .transactions_for(account_id)
                .cloned()
                .map(|txn| TransactionBalance::new(txn, 0.0))
                .collect(),
            dirty: HashSet::new(),
        };
        model.recompute();
        debug!(account = %account.name, rows = model.rows.len(), "register built");
        Ok(model)
    }

    pub fn account_id(&self) -> Uuid {
        self.account_id
    }

    pub fn rows(&self) -> &[TransactionBalance] {
        &self.rows
    }

    pub fn ending_balance(&self) -> f64 {
        self.rows
            .last()
            .map(|row| row.balance)
            .unwrap_or(self.opening_balance)
    }

    /// Transactions edited through the grid, ready to be written back.
    pub fn changed_transactions(&self) -> Vec<&Transaction> {
        self.rows
            .iter()
            .map(|row| &row.transaction)
            .filter(|txn| self.dirty.contains(&txn.id))
            .collect()
    }

    fn amount(&self, txn: &Transaction) -> f64 {
        txn.amount_for(self.account_id).unwrap_or(0.0)
    }

    fn set_amount(&mut self, row: usize, amount: f64) {
        let account = self.account_id;
        let txn = &mut self.rows[row].transaction;
        txn.amount = if txn.account_id == account {
            round_cents(amount)
        } else {
            round_cents(-amount)
        };
    }

    fn transfer_label(&self, txn: &Transaction) -> String {
        let other = if txn.account_id == self.account_id {
            txn.transfer_account
        } else {
            Some(txn.account_id)
        };
        other
            .map(|id| {
                self.account_names
                    .get(&id)
                    .cloned()
                    .unwrap_or_else(|| "<missing>".into())
            })
            .unwrap_or_default()
    }

    /// Sorts by date (stable) and rebuilds balances from the opening balance.
    fn recompute(&mut self) {
        self.rows.sort_by_key(|row| row.transaction.date);
        let mut balance = self.opening_balance;
        for idx in 0..self.rows.len() {
            balance += self.amount(&self.rows[idx].transaction);
            self.rows[idx].balance = round_cents(balance);
        }
    }
}

impl TableModel for RegisterModel {
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
        let txn = &entry.transaction;
        let amount = self.amount(txn);
        match col {
            COL_DATE => CellValue::Date(txn.date),
            COL_PAYEE => CellValue::text(txn.payee.clone()),
            COL_TRANSFER => CellValue::Text(self.transfer_label(txn)),
            COL_MEMO => CellValue::text(txn.memo.clone()),
            COL_PAYMENT if amount < 0.0 => CellValue::Money(-amount),
            COL_DEPOSIT if amount > 0.0 => CellValue::Money(amount),
            COL_BALANCE => CellValue::Money(entry.balance),
            _ => CellValue::Empty,
        }
    }

    fn set_value_at(&mut self, row: usize, col: usize, value: CellValue) -> Result<(), EditError> {
        if row >= self.rows.len() {
            return Err(EditError::RowOutOfRange(row));
        }
        match (col, value) {
            (COL_DATE, CellValue::Date(date)) => self.rows[row].transaction.date = date,
            (COL_PAYEE, value) => self.rows[row].transaction.payee = text_of(value)?,
            (COL_MEMO, value) => self.rows[row].transaction.memo = text_of(value)?,
            (COL_PAYMENT, CellValue::Money(v)) => self.set_amount(row, -v.abs()),
            (COL_DEPOSIT, CellValue::Money(v)) => self.set_amount(row, v.abs()),
            (COL_PAYMENT | COL_DEPOSIT, CellValue::Empty) => {
                let current = self.amount(&self.rows[row].transaction);
                let clears = (col == COL_PAYMENT && current < 0.0)
                    || (col == COL_DEPOSIT && current > 0.0);
                if clears {
                    self.set_amount(row, 0.0);
                }
            }
            (COL_TRANSFER | COL_BALANCE, _) => return Err(EditError::ReadOnly(col)),
            (_, other) => {
                return Err(EditError::Rejected(format!(
                    "value {other:?} does not fit column {col}"
                )))
            }
        }
        let id = self.rows[row].transaction.id;
        self.dirty.insert(id);
        self.recompute();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bookkeep_domain::{Account, AccountKind};
    use chrono::NaiveDate;

    use super::*;
    use crate::views::{edit_cell, EditContext};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
    }

    fn book() -> (Book, Uuid, Uuid) {
        let mut book = Book::new("Register");
        let checking = Account::new("Checking", AccountKind::Bank).with_opening_balance(100.0);
        let savings = Account::new("Savings", AccountKind::Bank);
        let (c, s) = (checking.id, savings.id);
        book.accounts.push(checking);
        book.accounts.push(savings);
        book.transactions
            .push(Transaction::new(c, day(10), "Grocer", -40.0));
        book.transactions
            .push(Transaction::new(c, day(2), "Employer", 500.0));
        book.transactions
            .push(Transaction::new(s, day(5), "To checking", -60.0).with_transfer(c));
        (book, c, s)
    }

    #[test]
    fn balances_run_in_date_order_from_opening_balance() {
        let (book, checking, _) = book();
        let model = RegisterModel::new(&book, checking).unwrap();

        let payees: Vec<_> = model.rows().iter().map(|r| r.transaction.payee.as_str()).collect();
        assert_eq!(payees, vec!["Employer", "To checking", "Grocer"]);
        let balances: Vec<_> = model.rows().iter().map(|r| r.balance).collect();
        assert_eq!(balances, vec![600.0, 660.0, 620.0]);
        assert_eq!(model.ending_balance(), 620.0);

        assert_eq!(model.value_at(1, COL_TRANSFER), CellValue::text("Savings"));
        assert_eq!(model.value_at(1, COL_DEPOSIT), CellValue::Money(60.0));
        assert_eq!(model.value_at(1, COL_PAYMENT), CellValue::Empty);
        assert_eq!(model.value_at(2, COL_PAYMENT), CellValue::Money(40.0));
    }

    #[test]
    fn editing_amount_and_date_recomputes_balances() {
        let (book, checking, _) = book();
        let mut model = RegisterModel::new(&book, checking).unwrap();
        let ctx = EditContext::default();

        edit_cell(&mut model, &ctx, 2, COL_PAYMENT, "45.00").unwrap();
        assert_eq!(model.ending_balance(), 615.0);

        edit_cell(&mut model, &ctx, 2, COL_DATE, "04/01/2024").unwrap();
        assert_eq!(model.rows()[0].transaction.payee, "Grocer");
        assert_eq!(model.rows()[0].balance, 55.0);
        assert_eq!(model.changed_transactions().len(), 1);
    }

    #[test]
    fn transfer_side_edits_flip_sign_on_source_transaction() {
        let (book, checking, _) = book();
        let mut model = RegisterModel::new(&book, checking).unwrap();
        let ctx = EditContext::default();

        edit_cell(&mut model, &ctx, 1, COL_DEPOSIT, "80").unwrap();
        let changed = model.changed_transactions();
        assert_eq!(changed[0].amount, -80.0);
        assert_eq!(model.ending_balance(), 640.0);
    }

    #[test]
    fn read_only_columns_reject_edits() {
        let (book, checking, _) = book();
        let mut model = RegisterModel::new(&book, checking).unwrap();
        let ctx = EditContext::default();
        assert_eq!(
            edit_cell(&mut model, &ctx, 0, COL_BALANCE, "1"),
            Err(EditError::ReadOnly(COL_BALANCE))
        );
        assert_eq!(
            edit_cell(&mut model, &ctx, 9, COL_PAYEE, "x"),
            Err(EditError::RowOutOfRange(9))
        );
    }
}
