//! Toolkit-neutral table models that project book records into grid rows.

pub mod accounts;
pub mod cells;
pub mod gains;
pub mod holdings;
pub mod prices;
pub mod register;
pub mod scheduled;

pub use accounts::AccountModel;
pub use cells::{
    CellEditor, CellRenderer, CellValue, Column, ColumnKind, EditContext, RenderedCell,
};
pub use gains::{CapitalGainModel, GainTotals};
pub use holdings::HoldingsModel;
pub use prices::PriceHistoryModel;
pub use register::RegisterModel;
pub use scheduled::ScheduledModel;

use crate::error::EditError;

/// Grid contract shared by every view.
pub trait TableModel {
    fn columns(&self) -> &[Column];

    fn row_count(&self) -> usize;

    fn value_at(&self, row: usize, col: usize) -> CellValue;

    fn column_count(&self) -> usize {
        self.columns().len()
    }

    fn column_name(&self, col: usize) -> &str {
        self.columns().get(col).map(|c| c.name).unwrap_or("")
    }

    fn is_cell_editable(&self, row: usize, col: usize) -> bool {
        row < self.row_count() && self.columns().get(col).is_some_and(|c| c.editable)
    }

    /// Stores an already-parsed value. Read-only models keep the default.
    fn set_value_at(&mut self, row: usize, col: usize, value: CellValue) -> Result<(), EditError> {
        let _ = (row, value);
        Err(EditError::ReadOnly(col))
    }
}

/// Parses `input` with the column's editor and stores it in the model.
pub fn edit_cell(
    model: &mut dyn TableModel,
    ctx: &EditContext,
    row: usize,
    col: usize,
    input: &str,
) -> Result<(), EditError> {
    if row >= model.row_count() {
        return Err(EditError::RowOutOfRange(row));
    }
    if !model.is_cell_editable(row, col) {
        return Err(EditError::ReadOnly(col));
    }
    let kind = model.columns()[col].kind;
    let value = ctx.editor_for(kind).parse(input)?;
    model.set_value_at(row, col, value)
}

/// Renders every row of `model`.
pub fn render_rows(model: &dyn TableModel, renderer: &CellRenderer) -> Vec<Vec<RenderedCell>> {
    (0..model.row_count())
        .map(|row| {
            (0..model.column_count())
                .map(|col| renderer.render(&model.value_at(row, col)))
                .collect()
        })
        .collect()
}

pub(crate) fn text_of(value: CellValue) -> Result<String, EditError> {
    match value {
        CellValue::Text(text) => Ok(text),
        CellValue::Empty => Ok(String::new()),
        other => Err(EditError::Rejected(format!("expected text, got {other:?}"))),
    }
}
