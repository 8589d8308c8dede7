use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;

/// Represents a financial account that owns transactions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub kind: AccountKind,
    #[serde(default)]
    pub opening_balance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_account: Option<Uuid>,
    #[serde(default)]
    pub closed: bool,
}

impl Account {
    /// Creates a new open account with a zero opening balance.
    pub fn new(name: impl Into<String>, kind: AccountKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            opening_balance: 0.0,
            linked_account: None,
            closed: false,
        }
    }

    pub fn with_opening_balance(mut self, amount: f64) -> Self {
        self.opening_balance = round_cents(amount);
        self
    }

    pub fn is_investment(&self) -> bool {
        matches!(self.kind, AccountKind::Investment)
    }
}

impl Identifiable for Account {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Account {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
/// Categorises accounts for display and linking rules.
pub enum AccountKind {
    #[default]
    Bank,
    Cash,
    CreditCard,
    Investment,
    Asset,
    Liability,
}

impl AccountKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bank" | "checking" | "savings" => Some(AccountKind::Bank),
            "cash" => Some(AccountKind::Cash),
            "credit" | "creditcard" | "credit-card" => Some(AccountKind::CreditCard),
            "investment" | "brokerage" => Some(AccountKind::Investment),
            "asset" => Some(AccountKind::Asset),
            "liability" | "loan" => Some(AccountKind::Liability),
            _ => None,
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AccountKind::Bank => "Bank",
            AccountKind::Cash => "Cash",
            AccountKind::CreditCard => "Credit Card",
            AccountKind::Investment => "Investment",
            AccountKind::Asset => "Asset",
            AccountKind::Liability => "Liability",
        };
        f.write_str(label)
    }
}
