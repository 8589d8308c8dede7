use bookkeep_domain::{Book, ScheduledTransaction};

use super::{CellValue, Column, ColumnKind, TableModel};

const COLUMNS: [Column; 5] = [
    Column::read_only("Name", ColumnKind::Text),
    Column::read_only("Account", ColumnKind::Text),
    Column::read_only("Next", ColumnKind::Date),
    Column::read_only("Frequency", ColumnKind::Text),
    Column::read_only("Amount", ColumnKind::Money),
];

struct ScheduledRow {
    schedule: ScheduledTransaction,
    account_name: String,
}

/// Scheduled transactions ordered by next due date.
pub struct ScheduledModel {
    rows: Vec<ScheduledRow>,
}

impl ScheduledModel {
    pub fn new(book: &Book) -> Self {
        let mut rows: Vec<_> = book
            .scheduled
            .iter()
            .map(|schedule| ScheduledRow {
                account_name: book
                    .account_name(schedule.account_id)
                    .unwrap_or("<missing>")
                    .to_string(),
                schedule: schedule.clone(),
            })
            .collect();
        rows.sort_by(|a, b| {
            a.schedule
                .next_date
                .cmp(&b.schedule.next_date)
                .then_with(|| a.schedule.name.cmp(&b.schedule.name))
        });
        Self { rows }
    }

    pub fn schedule(&self, row: usize) -> Option<&ScheduledTransaction> {
        self.rows.get(row).map(|r| &r.schedule)
    }
}

impl TableModel for ScheduledModel {
    fn columns(&self) -> &[Column] {
        &COLUMNS
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn value_at(&self, row: usize, col: usize) -> CellValue {
        let Some(entry) = self.rows.get(row) else {
            return CellValue::Empty;
        };
        let schedule = &entry.schedule;
        match col {
            0 if schedule.enabled => CellValue::text(schedule.name.clone()),
            0 => CellValue::Text(format!("{} (disabled)", schedule.name)),
            1 => CellValue::text(entry.account_name.clone()),
            2 => CellValue::Date(schedule.next_date),
            3 => CellValue::Text(schedule.interval.label()),
            4 => CellValue::Money(schedule.amount),
            _ => CellValue::Empty,
        }
    }
}
