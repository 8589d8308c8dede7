use bookkeep_domain::{round_cents, Book, InvestmentAction, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use crate::CoreError;

pub struct TransactionService;

impl TransactionService {
    pub fn add(book: &mut Book, mut transaction: Transaction) -> Result<Uuid, CoreError> {
        Self::validate(book, &transaction)?;
        transaction.amount = round_cents(transaction.amount);
        let id = transaction.id;
        info!(
            transaction = %id,
            payee = %transaction.payee,
            amount = transaction.amount,
            "transaction added"
        );
        book.transactions.push(transaction);
        book.touch();
        Ok(id)
    }

    /// Applies `mutator` to a copy and stores it only when it still validates.
    pub fn update<F>(book: &mut Book, id: Uuid, mutator: F) -> Result<(), CoreError>
    where
        F: FnOnce(&mut Transaction),
    {
        let mut updated = book
            .transaction(id)
            .cloned()
            .ok_or(CoreError::TransactionNotFound(id))?;
        mutator(&mut updated);
        updated.id = id;
        Self::replace(book, updated)
    }

    /// Stores an edited copy, e.g. from a register view.
    pub fn replace(book: &mut Book, mut transaction: Transaction) -> Result<(), CoreError> {
        Self::validate(book, &transaction)?;
        transaction.amount = round_cents(transaction.amount);
        let slot = book
            .transaction_mut(transaction.id)
            .ok_or(CoreError::TransactionNotFound(transaction.id))?;
        debug!(transaction = %transaction.id, "transaction replaced");
        *slot = transaction;
        book.touch();
        Ok(())
    }

    pub fn remove(book: &mut Book, id: Uuid) -> Result<Transaction, CoreError> {
        let index = book
            .transactions
            .iter()
            .position(|txn| txn.id == id)
            .ok_or(CoreError::TransactionNotFound(id))?;
        let removed = book.transactions.remove(index);
        info!(transaction = %id, "transaction removed");
        book.touch();
        Ok(removed)
    }

    fn validate(book: &Book, txn: &Transaction) -> Result<(), CoreError> {
        if book.account(txn.account_id).is_none() {
            return Err(CoreError::AccountNotFound(txn.account_id.to_string()));
        }
        if !txn.amount.is_finite() {
            return Err(CoreError::Validation("amount must be a finite number".into()));
        }
        if let Some(transfer) = txn.transfer_account {
            if transfer == txn.account_id {
                return Err(CoreError::Validation(
                    "transfer account must differ from the account".into(),
                ));
            }
            if book.account(transfer).is_none() {
                return Err(CoreError::AccountNotFound(transfer.to_string()));
            }
        }
        if let Some(detail) = &txn.investment {
            if book.security(detail.security_id).is_none() {
                return Err(CoreError::SecurityNotFound(detail.security_id.to_string()));
            }
            let needs_shares = matches!(detail.action, InvestmentAction::Buy | InvestmentAction::Sell);
            if needs_shares && detail.shares <= 0.0 {
                return Err(CoreError::Validation(
                    "buy and sell transactions need a positive share count".into(),
                ));
            }
        }
        Ok(())
    }
}
