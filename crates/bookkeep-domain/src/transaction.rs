//! Transactions, investment details, and the register's balance pairing.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub account_id: Uuid,
    pub date: NaiveDate,
    #[serde(default)]
    pub payee: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub memo: String,
    /// Signed from the owning account's point of view; deposits are positive.
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_account: Option<Uuid>,
    #[serde(default)]
    pub cleared: ClearedState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investment: Option<InvestmentDetail>,
}

impl Transaction {
    pub fn new(account_id: Uuid, date: NaiveDate, payee: impl Into<String>, amount: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            date,
            payee: payee.into(),
            memo: String::new(),
            amount: round_cents(amount),
            transfer_account: None,
            cleared: ClearedState::Uncleared,
            investment: None,
        }
    }

    pub fn with_transfer(mut self, account: Uuid) -> Self {
        self.transfer_account = Some(account);
        self
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    pub fn with_investment(mut self, detail: InvestmentDetail) -> Self {
        self.investment = Some(detail);
        self
    }

    /// Amount as seen by `account`, or `None` when the transaction does not
    /// touch it. The transfer side sees the amount negated.
    pub fn amount_for(&self, account: Uuid) -> Option<f64> {
        if self.account_id == account {
            Some(self.amount)
        } else if self.transfer_account == Some(account) {
            Some(-self.amount)
        } else {
            None
        }
    }

    pub fn touches(&self, account: Uuid) -> bool {
        self.amount_for(account).is_some()
    }
}

impl Identifiable for Transaction {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
/// Reconciliation state of a transaction.
pub enum ClearedState {
    #[default]
    Uncleared,
    Cleared,
    Reconciled,
}

impl fmt::Display for ClearedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ClearedState::Uncleared => "",
            ClearedState::Cleared => "c",
            ClearedState::Reconciled => "R",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Security side of an investment transaction.
pub struct InvestmentDetail {
    pub security_id: Uuid,
    pub action: InvestmentAction,
    #[serde(default)]
    pub shares: f64,
}

impl InvestmentDetail {
    pub fn new(security_id: Uuid, action: InvestmentAction, shares: f64) -> Self {
        Self {
            security_id,
            action,
            shares,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum InvestmentAction {
    Buy,
    Sell,
    Dividend,
}

impl fmt::Display for InvestmentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InvestmentAction::Buy => "Buy",
            InvestmentAction::Sell => "Sell",
            InvestmentAction::Dividend => "Dividend",
        };
        f.write_str(label)
    }
}

/// A transaction paired with the account balance after it posts.
///
/// Only built for display; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionBalance {
    pub transaction: Transaction,
    pub balance: f64,
}

impl TransactionBalance {
    pub fn new(transaction: Transaction, balance: f64) -> Self {
        Self {
            transaction,
            balance: round_cents(balance),
        }
    }
}
