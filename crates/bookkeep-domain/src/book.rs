//! The persisted container for every record in a bookkeeping file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    account::Account, schedule::ScheduledTransaction, security::Security,
    transaction::Transaction,
};

pub const BOOK_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    #[serde(default = "Book::schema_version_default")]
    pub schema_version: u32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub securities: Vec<Security>,
    #[serde(default)]
    pub scheduled: Vec<ScheduledTransaction>,
}

impl Book {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            schema_version: BOOK_SCHEMA_VERSION,
            name: name.into(),
            created_at: now,
            updated_at: now,
            accounts: Vec::new(),
            transactions: Vec::new(),
            securities: Vec::new(),
            scheduled: Vec::new(),
        }
    }

    fn schema_version_default() -> u32 {
        BOOK_SCHEMA_VERSION
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn account(&self, id: Uuid) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == id)
    }

    pub fn account_mut(&mut self, id: Uuid) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|account| account.id == id)
    }

    /// Case-insensitive lookup by account name.
    pub fn account_by_name(&self, name: &str) -> Option<&Account> {
        let needle = name.trim();
        self.accounts
            .iter()
            .find(|account| account.name.eq_ignore_ascii_case(needle))
    }

    pub fn account_name(&self, id: Uuid) -> Option<&str> {
        self.account(id).map(|account| account.name.as_str())
    }

    pub fn transaction(&self, id: Uuid) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    pub fn transaction_mut(&mut self, id: Uuid) -> Option<&mut Transaction> {
        self.transactions.iter_mut().find(|txn| txn.id == id)
    }

    pub fn security(&self, id: Uuid) -> Option<&Security> {
        self.securities.iter().find(|security| security.id == id)
    }

    pub fn security_mut(&mut self, id: Uuid) -> Option<&mut Security> {
        self.securities.iter_mut().find(|security| security.id == id)
    }

    /// Matches by name or symbol, ignoring ASCII case.
    pub fn security_by_name(&self, name: &str) -> Option<&Security> {
        let needle = name.trim();
        self.securities.iter().find(|security| {
            security.name.eq_ignore_ascii_case(needle)
                || security.symbol.eq_ignore_ascii_case(needle)
        })
    }

    pub fn scheduled_transaction(&self, id: Uuid) -> Option<&ScheduledTransaction> {
        self.scheduled.iter().find(|sched| sched.id == id)
    }

    pub fn scheduled_by_name(&self, name: &str) -> Option<&ScheduledTransaction> {
        let needle = name.trim();
        self.scheduled
            .iter()
            .find(|sched| sched.name.eq_ignore_ascii_case(needle))
    }

    /// Transactions that post to or transfer into `account`.
    pub fn transactions_for(&self, account: Uuid) -> impl Iterator<Item = &Transaction> {
        self.transactions
            .iter()
            .filter(move |txn| txn.touches(account))
    }
}
