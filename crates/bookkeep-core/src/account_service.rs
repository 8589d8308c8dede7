use bookkeep_domain::{round_cents, Account, Book};
use tracing::{debug, info};
use uuid::Uuid;

use crate::CoreError;

pub struct AccountService;

impl AccountService {
    /// Adds an account; names must be non-empty and unique ignoring case.
    pub fn add(book: &mut Book, account: Account) -> Result<Uuid, CoreError> {
        let name = account.name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("account name cannot be empty".into()));
        }
        if book.account_by_name(name).is_some() {
            return Err(CoreError::DuplicateName(name.to_string()));
        }
        if let Some(link) = account.linked_account {
            if book.account(link).is_none() {
                return Err(CoreError::AccountNotFound(link.to_string()));
            }
        }
        let id = account.id;
        info!(account = %account.name, kind = %account.kind, "account added");
        book.accounts.push(account);
        book.touch();
        Ok(id)
    }

    pub fn rename(book: &mut Book, id: Uuid, name: &str) -> Result<(), CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("account name cannot be empty".into()));
        }
        if book
            .account_by_name(name)
            .is_some_and(|existing| existing.id != id)
        {
            return Err(CoreError::DuplicateName(name.to_string()));
        }
        let account = book
            .account_mut(id)
            .ok_or_else(|| CoreError::AccountNotFound(id.to_string()))?;
        account.name = name.to_string();
        book.touch();
        Ok(())
    }

    /// Closes an account and drops links that point at it.
    pub fn close(book: &mut Book, id: Uuid) -> Result<(), CoreError> {
        let account = book
            .account_mut(id)
            .ok_or_else(|| CoreError::AccountNotFound(id.to_string()))?;
        account.closed = true;
        for other in book.accounts.iter_mut() {
            if other.linked_account == Some(id) {
                other.linked_account = None;
            }
        }
        book.touch();
        Ok(())
    }

    pub fn link(book: &mut Book, id: Uuid, target: Option<Uuid>) -> Result<(), CoreError> {
        if let Some(target) = target {
            if target == id {
                return Err(CoreError::InvalidOperation(
                    "an account cannot link to itself".into(),
                ));
            }
            match book.account(target) {
                None => return Err(CoreError::AccountNotFound(target.to_string())),
                Some(account) if account.closed => {
                    return Err(CoreError::InvalidOperation(format!(
                        "account '{}' is closed",
                        account.name
                    )))
                }
                Some(_) => {}
            }
        }
        let account = book
            .account_mut(id)
            .ok_or_else(|| CoreError::AccountNotFound(id.to_string()))?;
        account.linked_account = target;
        debug!(account = %id, ?target, "account link updated");
        book.touch();
        Ok(())
    }

    /// Opening balance plus every transaction that touches the account.
    pub fn balance(book: &Book, id: Uuid) -> f64 {
        let opening = book.account(id).map_or(0.0, |a| a.opening_balance);
        let movement: f64 = book
            .transactions
            .iter()
            .filter_map(|txn| txn.amount_for(id))
            .sum();
        round_cents(opening + movement)
    }

    pub fn find<'a>(book: &'a Book, name: &str) -> Result<&'a Account, CoreError> {
        debug!(name, "account lookup");
        book.account_by_name(name)
            .ok_or_else(|| CoreError::AccountNotFound(name.to_string()))
    }
}
