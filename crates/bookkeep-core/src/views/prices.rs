//! Editable price history for one security.

use bookkeep_domain::{PriceEntry, Security, SplitRatio};
use uuid::Uuid;

use super::{CellValue, Column, ColumnKind, TableModel};
use crate::error::EditError;

pub const COL_DATE: usize = 0;
pub const COL_PRICE: usize = 1;
pub const COL_SPLIT: usize = 2;

const COLUMNS: [Column; 3] = [
    Column::editable("Date", ColumnKind::Date),
    Column::editable("Price", ColumnKind::Price),
    Column::editable("Split", ColumnKind::Ratio),
];

#[derive(Debug, Clone)]
pub struct PriceHistoryModel {
    security_id: Uuid,
    entries: Vec<PriceEntry>,
    modified: bool,
}

impl PriceHistoryModel {
    pub fn new(security: &Security) -> Self {
        Self {
            security_id: security.id,
            entries: security.price_history().to_vec(),
            modified: false,
        }
    }

    pub fn security_id(&self) -> Uuid {
        self.security_id
    }

    pub fn entries(&self) -> &[PriceEntry] {
        &self.entries
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn into_entries(self) -> Vec<PriceEntry> {
        self.entries
    }
}

impl TableModel for PriceHistoryModel {
    fn columns(&self) -> &[Column] {
        &COLUMNS
    }

    fn row_count(&self) -> usize {
        self.entries.len()
    }

    fn value_at(&self, row: usize, col: usize) -> CellValue {
        let Some(entry) = self.entries.get(row) else {
            return CellValue::Empty;
        };
        match col {
            COL_DATE => CellValue::Date(entry.date),
            COL_PRICE => CellValue::Price(entry.price),
            COL_SPLIT if entry.split_ratio.is_split() => CellValue::Ratio(entry.split_ratio),
            _ => CellValue::Empty,
        }
    }

    fn set_value_at(&mut self, row: usize, col: usize, value: CellValue) -> Result<(), EditError> {
        if row >= self.entries.len() {
            return Err(EditError::RowOutOfRange(row));
        }
        match (col, value) {
            (COL_DATE, CellValue::Date(date)) => {
                let clash = self
                    .entries
                    .iter()
                    .enumerate()
                    .any(|(idx, entry)| idx != row && entry.date == date);
                if clash {
                    return Err(EditError::Rejected(format!(
                        "a price already exists for {}",
                        crate::dates::format_date(date)
                    )));
                }
                self.entries[row].date = date;
                self.entries.sort_by_key(|entry| entry.date);
            }
            (COL_PRICE, CellValue::Price(price)) => {
                if price < 0.0 {
                    return Err(EditError::Rejected("price cannot be negative".into()));
                }
                self.entries[row].price = price;
            }
            (COL_PRICE, CellValue::Empty) => self.entries[row].price = 0.0,
            (COL_SPLIT, CellValue::Ratio(ratio)) => self.entries[row].split_ratio = ratio,
            (COL_SPLIT, CellValue::Empty) => self.entries[row].split_ratio = SplitRatio::NONE,
            (col, other) => {
                return Err(EditError::Rejected(format!(
                    "value {other:?} does not fit column {col}"
                )))
            }
        }
        self.modified = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::views::{edit_cell, CellRenderer, EditContext};

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn security() -> Security {
        let mut security = Security::new("Acme Corp", "acme");
        security.upsert_price(PriceEntry::new(date(1, 2), 10.0));
        security.upsert_price(PriceEntry::new(date(3, 1), 12.5).with_split(SplitRatio(2.0)));
        security.upsert_price(PriceEntry::new(date(6, 3), 7.25));
        security
    }

    #[test]
    fn split_column_renders_ratio_only_when_present() {
        let model = PriceHistoryModel::new(&security());
        let renderer = CellRenderer::default();
        assert_eq!(renderer.render(&model.value_at(1, COL_SPLIT)).text, "2:1");
        assert_eq!(renderer.render(&model.value_at(0, COL_SPLIT)).text, "");
        assert_eq!(renderer.render(&model.value_at(2, COL_PRICE)).text, "7.25");
    }

    #[test]
    fn date_edit_resorts_and_rejects_duplicates() {
        let mut model = PriceHistoryModel::new(&security());
        let ctx = EditContext::default();

        edit_cell(&mut model, &ctx, 0, COL_DATE, "12/31/2024").unwrap();
        let dates: Vec<_> = model.entries().iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![date(3, 1), date(6, 3), date(12, 31)]);

        let err = edit_cell(&mut model, &ctx, 0, COL_DATE, "06/03/2024").unwrap_err();
        assert!(matches!(err, EditError::Rejected(_)));
        assert!(model.is_modified());
    }

    #[test]
    fn price_edits_keep_four_decimals() {
        let mut model = PriceHistoryModel::new(&security());
        let ctx = EditContext::default();

        edit_cell(&mut model, &ctx, 0, COL_PRICE, "12.3456").unwrap();
        assert_eq!(model.entries()[0].price, 12.3456);
        let renderer = CellRenderer::default();
        assert_eq!(renderer.render(&model.value_at(0, COL_PRICE)).text, "12.3456");

        let err = edit_cell(&mut model, &ctx, 0, COL_PRICE, "-1").unwrap_err();
        assert!(matches!(err, EditError::Rejected(_)));
    }

    #[test]
    fn split_edits_accept_reverse_ratios_and_blank() {
        let mut model = PriceHistoryModel::new(&security());
        let ctx = EditContext::default();

        edit_cell(&mut model, &ctx, 2, COL_SPLIT, "1:4").unwrap();
        assert_eq!(model.entries()[2].split_ratio, SplitRatio(0.25));

        edit_cell(&mut model, &ctx, 1, COL_SPLIT, "").unwrap();
        assert!(!model.entries()[1].split_ratio.is_split());

        assert_eq!(
            edit_cell(&mut model, &ctx, 1, COL_SPLIT, "x:1"),
            Err(EditError::Ratio("x:1".into()))
        );
    }
}
