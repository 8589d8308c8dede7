//! Shared traits, money helpers, and time intervals for book records.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Magnitudes below this are treated as exactly zero.
pub const HALF_CENT: f64 = 0.005;

/// Exposes a stable identifier for records stored in the book.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Provides read-only access to a record's display name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Rounds a monetary value to the nearest cent.
///
/// Values whose magnitude is below half a cent collapse to `0.0`, which also
/// keeps `-0.0` out of displayed totals.
pub fn round_cents(value: f64) -> f64 {
    if !value.is_finite() || value.abs() < HALF_CENT {
        return 0.0;
    }
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
/// Enumerates time units used by `TimeInterval`.
pub enum TimeUnit {
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().trim_end_matches('s') {
            "day" | "d" => Some(TimeUnit::Day),
            "week" | "w" => Some(TimeUnit::Week),
            "month" | "m" => Some(TimeUnit::Month),
            "year" | "y" => Some(TimeUnit::Year),
            _ => None,
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TimeUnit::Day => "Day",
            TimeUnit::Week => "Week",
            TimeUnit::Month => "Month",
            TimeUnit::Year => "Year",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
/// Represents a time unit and multiplier for scheduled transactions.
pub struct TimeInterval {
    pub every: u32,
    pub unit: TimeUnit,
}

impl TimeInterval {
    pub fn new(every: u32, unit: TimeUnit) -> Self {
        Self {
            every: every.max(1),
            unit,
        }
    }

    pub fn monthly() -> Self {
        Self::new(1, TimeUnit::Month)
    }

    /// Calculates the next date after `from` according to the interval.
    pub fn next_date(&self, from: NaiveDate) -> NaiveDate {
        self.next_date_on_day(from, from.day())
    }

    /// Like [`next_date`](Self::next_date), but monthly and yearly steps land
    /// on `day` (clamped to the month's length) instead of `from`'s day.
    pub fn next_date_on_day(&self, from: NaiveDate, day: u32) -> NaiveDate {
        match self.unit {
            TimeUnit::Day => from + Duration::days(self.every as i64),
            TimeUnit::Week => from + Duration::weeks(self.every as i64),
            TimeUnit::Month => shift_month(from, self.every as i32, day),
            TimeUnit::Year => shift_month(from, self.every as i32 * 12, day),
        }
    }

    pub fn label(&self) -> String {
        match (self.every, &self.unit) {
            (1, TimeUnit::Day) => "Daily".into(),
            (1, TimeUnit::Week) => "Weekly".into(),
            (1, TimeUnit::Month) => "Monthly".into(),
            (1, TimeUnit::Year) => "Yearly".into(),
            (n, unit) => format!("Every {} {}{}", n, unit, if n > 1 { "s" } else { "" }),
        }
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

fn shift_month(date: NaiveDate, months: i32, day: u32) -> NaiveDate {
    let index = date.year() * 12 + date.month0() as i32 + months;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    let day = day.clamp(1, days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(date)
}

/// Number of days in the given month, accounting for leap years.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_cents_snaps_tiny_values_to_zero() {
        assert_eq!(round_cents(0.004), 0.0);
        assert_eq!(round_cents(-0.0049), 0.0);
        assert!(round_cents(-0.0049).is_sign_positive());
        assert_eq!(round_cents(0.005), 0.01);
        assert_eq!(round_cents(12.345_6), 12.35);
        assert_eq!(round_cents(-7.891), -7.89);
    }

    #[test]
    fn monthly_interval_clamps_to_month_end() {
        let interval = TimeInterval::monthly();
        let jan31 = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(
            interval.next_date(jan31),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        let dec = NaiveDate::from_ymd_opt(2023, 12, 15).unwrap();
        assert_eq!(
            interval.next_date(dec),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
    }

    #[test]
    fn anchored_steps_return_to_month_end() {
        let interval = TimeInterval::monthly();
        let feb29 = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(
            interval.next_date_on_day(feb29, 31),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
        );
        assert_eq!(
            TimeInterval::new(1, TimeUnit::Year).next_date_on_day(feb29, 29),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
        assert_eq!(
            TimeInterval::new(2, TimeUnit::Week).next_date_on_day(feb29, 31),
            NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
        );
    }

    #[test]
    fn interval_labels() {
        assert_eq!(TimeInterval::new(1, TimeUnit::Week).label(), "Weekly");
        assert_eq!(TimeInterval::new(3, TimeUnit::Month).label(), "Every 3 Months");
        assert_eq!(TimeUnit::parse("months"), Some(TimeUnit::Month));
        assert_eq!(TimeUnit::parse("fortnight"), None);
    }
}
