use bookkeep_domain::Holding;

use super::{CellValue, Column, ColumnKind, TableModel};

const COLUMNS: [Column; 6] = [
    Column::read_only("Security", ColumnKind::Text),
    Column::read_only("Shares", ColumnKind::Shares),
    Column::read_only("Cost", ColumnKind::Money),
    Column::read_only("Price", ColumnKind::Price),
    Column::read_only("Market Value", ColumnKind::Money),
    Column::read_only("Yield", ColumnKind::Percent),
];

/// Current positions, one row per security with open shares.
#[derive(Debug, Clone, Default)]
pub struct HoldingsModel {
    holdings: Vec<Holding>,
}

impl HoldingsModel {
    pub fn new(mut holdings: Vec<Holding>) -> Self {
        holdings.sort_by_key(|h| h.security_name.to_lowercase());
        Self { holdings }
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    pub fn total_market_value(&self) -> f64 {
        bookkeep_domain::round_cents(self.holdings.iter().filter_map(Holding::market_value).sum())
    }
}

impl TableModel for HoldingsModel {
    fn columns(&self) -> &[Column] {
        &COLUMNS
    }

    fn row_count(&self) -> usize {
        self.holdings.len()
    }

    fn value_at(&self, row: usize, col: usize) -> CellValue {
        let Some(holding) = self.holdings.get(row) else {
            return CellValue::Empty;
        };
        match col {
            0 => CellValue::text(holding.security_name.clone()),
            1 => CellValue::Shares(holding.total_shares),
            2 => CellValue::Money(holding.total_cost),
            3 => holding.latest_price.map_or(CellValue::Empty, CellValue::Price),
            4 => holding.market_value().map_or(CellValue::Empty, CellValue::Money),
            5 => CellValue::Percent(holding.annual_yield),
            _ => CellValue::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn holding(name: &str, shares: f64, cost: f64, price: Option<f64>) -> Holding {
        Holding {
            security_id: Uuid::new_v4(),
            security_name: name.into(),
            total_shares: shares,
            total_cost: cost,
            annual_yield: 2.5,
            latest_price: price,
        }
    }

    #[test]
    fn rows_sorted_by_name_with_market_value() {
        let model = HoldingsModel::new(vec![
            holding("zeta", 4.0, 40.0, None),
            holding("Acme", 10.0, 100.0, Some(12.5)),
        ]);
        assert_eq!(model.value_at(0, 0), CellValue::text("Acme"));
        assert_eq!(model.value_at(0, 4), CellValue::Money(125.0));
        assert_eq!(model.value_at(1, 3), CellValue::Empty);
        assert_eq!(model.value_at(1, 5), CellValue::Percent(2.5));
        assert_eq!(model.total_market_value(), 125.0);
    }
}
