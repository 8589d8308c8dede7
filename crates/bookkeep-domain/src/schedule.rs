use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{common::*, transaction::Transaction};

/// Template for a transaction that repeats on a fixed interval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduledTransaction {
    pub id: Uuid,
    pub name: String,
    pub account_id: Uuid,
    #[serde(default)]
    pub payee: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_account: Option<Uuid>,
    pub interval: TimeInterval,
    pub next_date: NaiveDate,
    /// Day of month monthly and yearly schedules return to, so a schedule
    /// started on the 31st lands on each month's last day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_day: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default = "ScheduledTransaction::default_enabled")]
    pub enabled: bool,
}

impl ScheduledTransaction {
    pub fn new(
        name: impl Into<String>,
        account_id: Uuid,
        amount: f64,
        interval: TimeInterval,
        next_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            account_id,
            payee: String::new(),
            amount: round_cents(amount),
            transfer_account: None,
            interval,
            next_date,
            anchor_day: Some(next_date.day()),
            end_date: None,
            enabled: true,
        }
    }

    pub fn default_enabled() -> bool {
        true
    }

    /// The occurrence after `date`.
    pub fn step(&self, date: NaiveDate) -> NaiveDate {
        let day = self.anchor_day.unwrap_or_else(|| date.day());
        self.interval.next_date_on_day(date, day)
    }

    /// Dates due on or before `through`, starting at `next_date`.
    pub fn occurrences_through(&self, through: NaiveDate) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        if !self.enabled {
            return dates;
        }
        let mut current = self.next_date;
        while current <= through {
            if let Some(end) = self.end_date {
                if current > end {
                    break;
                }
            }
            dates.push(current);
            let next = self.step(current);
            if next <= current {
                break;
            }
            current = next;
        }
        dates
    }

    /// Builds the concrete transaction for one occurrence.
    pub fn instantiate(&self, date: NaiveDate) -> Transaction {
        let payee = if self.payee.is_empty() {
            self.name.clone()
        } else {
            self.payee.clone()
        };
        let mut txn = Transaction::new(self.account_id, date, payee, self.amount);
        txn.transfer_account = self.transfer_account;
        txn
    }
}

impl Identifiable for ScheduledTransaction {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for ScheduledTransaction {
    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occurrences_stop_at_end_date() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let mut rent = ScheduledTransaction::new(
            "Rent",
            Uuid::new_v4(),
            -1200.0,
            TimeInterval::monthly(),
            start,
        );
        rent.end_date = NaiveDate::from_ymd_opt(2024, 3, 1);

        let through = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let dates = rent.occurrences_through(through);
        assert_eq!(
            dates,
            vec![start, NaiveDate::from_ymd_opt(2024, 2, 15).unwrap()]
        );

        rent.enabled = false;
        assert!(rent.occurrences_through(through).is_empty());
    }

    #[test]
    fn month_end_schedules_stay_at_month_end() {
        let jan31 = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let sched =
            ScheduledTransaction::new("Rent", Uuid::new_v4(), -900.0, TimeInterval::monthly(), jan31);
        let dates = sched.occurrences_through(NaiveDate::from_ymd_opt(2024, 5, 31).unwrap());
        let expected: Vec<_> = [(1, 31), (2, 29), (3, 31), (4, 30), (5, 31)]
            .iter()
            .map(|&(m, d)| NaiveDate::from_ymd_opt(2024, m, d).unwrap())
            .collect();
        assert_eq!(dates, expected);

        // Books saved before the anchor existed step from the stored date.
        let mut legacy = sched.clone();
        legacy.anchor_day = None;
        legacy.next_date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(legacy.step(legacy.next_date), NaiveDate::from_ymd_opt(2024, 3, 29).unwrap());
    }

    #[test]
    fn instantiate_falls_back_to_name_for_payee() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let sched =
            ScheduledTransaction::new("Gym", Uuid::new_v4(), -30.0, TimeInterval::monthly(), date);
        let txn = sched.instantiate(date);
        assert_eq!(txn.payee, "Gym");
        assert_eq!(txn.amount, -30.0);
        assert_eq!(txn.account_id, sched.account_id);
    }
}
