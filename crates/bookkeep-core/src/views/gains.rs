//! Realized capital gains, read-only.

use bookkeep_domain::{round_cents, CapitalGain};

use super::{CellValue, Column, ColumnKind, TableModel};

const COLUMNS: [Column; 7] = [
    Column::read_only("Security", ColumnKind::Text),
    Column::read_only("Purchased", ColumnKind::Date),
    Column::read_only("Sold", ColumnKind::Date),
    Column::read_only("Shares", ColumnKind::Shares),
    Column::read_only("Cost Basis", ColumnKind::Money),
    Column::read_only("Sell Amount", ColumnKind::Money),
    Column::read_only("Gain", ColumnKind::Money),
];

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GainTotals {
    pub cost_basis: f64,
    pub sell_amount: f64,
    pub gain: f64,
    pub short_term: f64,
    pub long_term: f64,
}

#[derive(Debug, Clone, Default)]
pub struct CapitalGainModel {
    gains: Vec<CapitalGain>,
}

impl CapitalGainModel {
    pub fn new(mut gains: Vec<CapitalGain>) -> Self {
        gains.sort_by(|a, b| {
            a.sell_date
                .cmp(&b.sell_date)
                .then_with(|| a.security_name.cmp(&b.security_name))
                .then_with(|| a.purchase_date.cmp(&b.purchase_date))
        });
        Self { gains }
    }

    pub fn gains(&self) -> &[CapitalGain] {
        &self.gains
    }

    pub fn totals(&self) -> GainTotals {
        let mut totals = self.gains.iter().fold(GainTotals::default(), |mut acc, g| {
            acc.cost_basis += g.cost_basis();
            acc.sell_amount += g.sell_amount();
            if g.is_long_term() {
                acc.long_term += g.gain();
            } else {
                acc.short_term += g.gain();
            }
            acc
        });
        totals.cost_basis = round_cents(totals.cost_basis);
        totals.sell_amount = round_cents(totals.sell_amount);
        totals.short_term = round_cents(totals.short_term);
        totals.long_term = round_cents(totals.long_term);
        totals.gain = round_cents(totals.sell_amount - totals.cost_basis);
        totals
    }
}

impl TableModel for CapitalGainModel {
    fn columns(&self) -> &[Column] {
        &COLUMNS
    }

    fn row_count(&self) -> usize {
        self.gains.len()
    }

    fn value_at(&self, row: usize, col: usize) -> CellValue {
        let Some(gain) = self.gains.get(row) else {
            return CellValue::Empty;
        };
        match col {
            0 => CellValue::text(gain.security_name.clone()),
            1 => CellValue::Date(gain.purchase_date),
            2 => CellValue::Date(gain.sell_date),
            3 => CellValue::Shares(gain.shares),
            4 => CellValue::Money(gain.cost_basis()),
            5 => CellValue::Money(gain.sell_amount()),
            6 => CellValue::Money(gain.gain()),
            _ => CellValue::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::*;
    use crate::{
        error::EditError,
        views::{edit_cell, EditContext},
    };

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn model() -> CapitalGainModel {
        let id = Uuid::new_v4();
        CapitalGainModel::new(vec![
            CapitalGain::new(id, "Beta", ymd(2024, 1, 5), ymd(2024, 9, 1), 5.0, 500.0, 450.0),
            CapitalGain::new(id, "Acme", ymd(2020, 2, 1), ymd(2024, 3, 1), 10.0, 100.0, 250.0),
        ])
    }

    #[test]
    fn rows_sorted_by_sell_date() {
        let model = model();
        assert_eq!(model.value_at(0, 0), CellValue::text("Acme"));
        assert_eq!(model.value_at(0, 6), CellValue::Money(150.0));
        assert_eq!(model.value_at(1, 6), CellValue::Money(-50.0));
    }

    #[test]
    fn totals_split_short_and_long_term() {
        let totals = model().totals();
        assert_eq!(totals.cost_basis, 600.0);
        assert_eq!(totals.sell_amount, 700.0);
        assert_eq!(totals.gain, 100.0);
        assert_eq!(totals.long_term, 150.0);
        assert_eq!(totals.short_term, -50.0);
    }

    #[test]
    fn cells_are_read_only() {
        let mut model = model();
        assert!(!model.is_cell_editable(0, 3));
        assert_eq!(
            edit_cell(&mut model, &EditContext::default(), 0, 3, "1"),
            Err(EditError::ReadOnly(3))
        );
    }
}
