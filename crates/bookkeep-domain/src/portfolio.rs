//! Computed investment records: holdings and realized capital gains.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;

/// Position in one security at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Holding {
    pub security_id: Uuid,
    pub security_name: String,
    pub total_shares: f64,
    pub total_cost: f64,
    /// Trailing-year dividend income as a percentage of total cost.
    pub annual_yield: f64,
    pub latest_price: Option<f64>,
}

impl Holding {
    pub fn market_value(&self) -> Option<f64> {
        self.latest_price
            .map(|price| round_cents(price * self.total_shares))
    }

    pub fn unrealized_gain(&self) -> Option<f64> {
        self.market_value()
            .map(|value| round_cents(value - self.total_cost))
    }
}

/// Realized gain from selling shares bought on one date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "StoredCapitalGain")]
pub struct CapitalGain {
    pub security_id: Uuid,
    pub security_name: String,
    pub purchase_date: NaiveDate,
    pub sell_date: NaiveDate,
    pub shares: f64,
    cost_basis: f64,
    sell_amount: f64,
}

/// Wire shape of [`CapitalGain`]; loading goes through the constructor.
#[derive(Deserialize)]
struct StoredCapitalGain {
    security_id: Uuid,
    security_name: String,
    purchase_date: NaiveDate,
    sell_date: NaiveDate,
    shares: f64,
    cost_basis: f64,
    sell_amount: f64,
}

impl From<StoredCapitalGain> for CapitalGain {
    fn from(stored: StoredCapitalGain) -> Self {
        CapitalGain::new(
            stored.security_id,
            stored.security_name,
            stored.purchase_date,
            stored.sell_date,
            stored.shares,
            stored.cost_basis,
            stored.sell_amount,
        )
    }
}

impl CapitalGain {
    /// Both monetary fields are rounded to cents and snapped to zero below
    /// half a cent.
    pub fn new(
        security_id: Uuid,
        security_name: impl Into<String>,
        purchase_date: NaiveDate,
        sell_date: NaiveDate,
        shares: f64,
        cost_basis: f64,
        sell_amount: f64,
    ) -> Self {
        Self {
            security_id,
            security_name: security_name.into(),
            purchase_date,
            sell_date,
            shares,
            cost_basis: round_cents(cost_basis),
            sell_amount: round_cents(sell_amount),
        }
    }

    pub fn cost_basis(&self) -> f64 {
        self.cost_basis
    }

    pub fn sell_amount(&self) -> f64 {
        self.sell_amount
    }

    pub fn gain(&self) -> f64 {
        round_cents(self.sell_amount - self.cost_basis)
    }

    /// Held for more than one year.
    pub fn is_long_term(&self) -> bool {
        (self.sell_date - self.purchase_date).num_days() > 365
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capital_gain_rounds_and_snaps_money_fields() {
        let bought = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
        let sold = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        let gain = CapitalGain::new(Uuid::new_v4(), "Acme", bought, sold, 10.0, 100.004, 0.0031);

        assert_eq!(gain.cost_basis(), 100.0);
        assert_eq!(gain.sell_amount(), 0.0);
        assert_eq!(gain.gain(), -100.0);
        assert!(gain.is_long_term());
    }

    #[test]
    fn loaded_capital_gains_are_rounded_like_new_ones() {
        let json = r#"{
            "security_id": "7f1c9a52-3b1e-4c7d-9a51-2f0d6f2b8e11",
            "security_name": "Acme",
            "purchase_date": "2024-01-10",
            "sell_date": "2024-02-01",
            "shares": 5.0,
            "cost_basis": 500.004,
            "sell_amount": 750.0049
        }"#;
        let gain: CapitalGain = serde_json::from_str(json).unwrap();
        assert_eq!(gain.cost_basis(), 500.0);
        assert_eq!(gain.sell_amount(), 750.0);
        assert!(!gain.is_long_term());

        let again: CapitalGain =
            serde_json::from_str(&serde_json::to_string(&gain).unwrap()).unwrap();
        assert_eq!(again, gain);
    }

    #[test]
    fn holding_market_value_uses_latest_price() {
        let holding = Holding {
            security_id: Uuid::new_v4(),
            security_name: "Acme".into(),
            total_shares: 12.5,
            total_cost: 100.0,
            annual_yield: 0.0,
            latest_price: Some(10.0),
        };
        assert_eq!(holding.market_value(), Some(125.0));
        assert_eq!(holding.unrealized_gain(), Some(25.0));
    }
}
