//! Securities and their price histories.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Security {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    price_history: Vec<PriceEntry>,
}

impl Security {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            symbol: symbol.into().to_uppercase(),
            price_history: Vec::new(),
        }
    }

    /// Price entries ordered by date, at most one per date.
    pub fn price_history(&self) -> &[PriceEntry] {
        &self.price_history
    }

    /// Inserts or replaces the entry for `entry.date`, keeping date order.
    /// Returns the replaced entry, if any.
    pub fn upsert_price(&mut self, entry: PriceEntry) -> Option<PriceEntry> {
        match self
            .price_history
            .binary_search_by_key(&entry.date, |existing| existing.date)
        {
            Ok(idx) => Some(std::mem::replace(&mut self.price_history[idx], entry)),
            Err(idx) => {
                self.price_history.insert(idx, entry);
                None
            }
        }
    }

    pub fn remove_price(&mut self, date: NaiveDate) -> Option<PriceEntry> {
        let idx = self
            .price_history
            .binary_search_by_key(&date, |existing| existing.date)
            .ok()?;
        Some(self.price_history.remove(idx))
    }

    /// Replaces the full history; input is sorted and deduplicated by date,
    /// the last entry for a date winning.
    pub fn set_price_history(&mut self, mut entries: Vec<PriceEntry>) {
        entries.sort_by_key(|entry| entry.date);
        let mut deduped: Vec<PriceEntry> = Vec::with_capacity(entries.len());
        for entry in entries {
            match deduped.last_mut() {
                Some(last) if last.date == entry.date => *last = entry,
                _ => deduped.push(entry),
            }
        }
        self.price_history = deduped;
    }

    pub fn latest_price(&self) -> Option<&PriceEntry> {
        self.price_history.last()
    }

    pub fn price_on_or_before(&self, date: NaiveDate) -> Option<&PriceEntry> {
        self.price_history.iter().rev().find(|entry| entry.date <= date)
    }

    /// Entries carrying a split, in date order.
    pub fn splits(&self) -> impl Iterator<Item = &PriceEntry> {
        self.price_history
            .iter()
            .filter(|entry| entry.split_ratio.is_split())
    }
}

impl Identifiable for Security {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Security {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PriceEntry {
    pub date: NaiveDate,
    pub price: f64,
    #[serde(default)]
    pub split_ratio: SplitRatio,
}

impl PriceEntry {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self {
            date,
            price,
            split_ratio: SplitRatio::NONE,
        }
    }

    pub fn with_split(mut self, ratio: SplitRatio) -> Self {
        self.split_ratio = ratio;
        self
    }
}

/// Share multiplier applied on a split date.
///
/// `0` means no split. Values above one are forward splits shown as `N:1`;
/// values below one are reverse splits shown as `1:N`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, PartialOrd, Default)]
#[serde(transparent)]
pub struct SplitRatio(pub f64);

impl SplitRatio {
    pub const NONE: SplitRatio = SplitRatio(0.0);

    pub fn is_split(self) -> bool {
        self.0 > 0.0
    }

    /// Multiplier to apply to share counts; `1.0` when there is no split.
    pub fn multiplier(self) -> f64 {
        if self.is_split() {
            self.0
        } else {
            1.0
        }
    }
}

impl fmt::Display for SplitRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ratio = self.0;
        if ratio <= 0.0 {
            return Ok(());
        }
        if ratio < 1.0 {
            write!(f, "1:{}", trim_decimal(1.0 / ratio, 4))
        } else {
            write!(f, "{}:1", trim_decimal(ratio, 4))
        }
    }
}

/// Prints `value` with at most `places` decimals, dropping trailing zeros.
pub fn trim_decimal(value: f64, places: usize) -> String {
    let text = format!("{:.*}", places, value);
    if !text.contains('.') {
        return text;
    }
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".into()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn split_ratio_display() {
        assert_eq!(SplitRatio(0.0).to_string(), "");
        assert_eq!(SplitRatio(2.0).to_string(), "2:1");
        assert_eq!(SplitRatio(1.5).to_string(), "1.5:1");
        assert_eq!(SplitRatio(0.5).to_string(), "1:2");
        assert_eq!(SplitRatio(0.1).to_string(), "1:10");
        assert_eq!(SplitRatio(1.0).to_string(), "1:1");
    }

    #[test]
    fn upsert_keeps_history_sorted_and_unique() {
        let mut security = Security::new("Acme Corp", "acme");
        assert_eq!(security.symbol, "ACME");
        security.upsert_price(PriceEntry::new(day(3), 10.0));
        security.upsert_price(PriceEntry::new(day(1), 9.0));
        let replaced = security.upsert_price(PriceEntry::new(day(3), 11.0));

        assert_eq!(replaced.map(|entry| entry.price), Some(10.0));
        let dates: Vec<_> = security.price_history().iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![day(1), day(3)]);
        assert_eq!(security.latest_price().map(|e| e.price), Some(11.0));
        assert_eq!(security.price_on_or_before(day(2)).map(|e| e.price), Some(9.0));
    }

    #[test]
    fn set_price_history_dedupes_by_date() {
        let mut security = Security::new("Acme Corp", "ACME");
        security.set_price_history(vec![
            PriceEntry::new(day(4), 4.0),
            PriceEntry::new(day(2), 2.0),
            PriceEntry::new(day(4), 5.0).with_split(SplitRatio(2.0)),
        ]);
        assert_eq!(security.price_history().len(), 2);
        assert_eq!(security.splits().count(), 1);
        assert_eq!(security.latest_price().map(|e| e.price), Some(5.0));
    }
}
