//! Cell values plus the renderers and editors that convert them to and from
//! display text.

use std::sync::Arc;

use bookkeep_domain::SplitRatio;
use chrono::NaiveDate;

use crate::{
    dates::{format_date, parse_date},
    error::EditError,
    money::{
        format_percent, format_shares, format_split_ratio, parse_percent, parse_shares,
        parse_split_ratio, MoneyFormatter,
    },
    time::{Clock, SystemClock},
};

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Date(NaiveDate),
    Money(f64),
    /// A per-share quote; unlike money it is not rounded to cents.
    Price(f64),
    Shares(f64),
    Percent(f64),
    Ratio(SplitRatio),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_money(&self) -> Option<f64> {
        match self {
            CellValue::Money(value) => Some(*value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Date,
    Money,
    Price,
    Shares,
    Percent,
    Ratio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub editable: bool,
}

impl Column {
    pub const fn read_only(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            editable: false,
        }
    }

    pub const fn editable(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            editable: true,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self.kind,
            ColumnKind::Money
                | ColumnKind::Price
                | ColumnKind::Shares
                | ColumnKind::Percent
                | ColumnKind::Ratio
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCell {
    pub text: String,
    /// Set for negative money so front ends can colour it.
    pub negative: bool,
    pub numeric: bool,
}

/// Turns cell values into display text.
#[derive(Debug, Clone, Default)]
pub struct CellRenderer {
    money: MoneyFormatter,
}

impl CellRenderer {
    pub fn new(money: MoneyFormatter) -> Self {
        Self { money }
    }

    pub fn render(&self, value: &CellValue) -> RenderedCell {
        let (text, negative, numeric) = match value {
            CellValue::Empty => (String::new(), false, false),
            CellValue::Text(text) => (text.clone(), false, false),
            CellValue::Date(date) => (format_date(*date), false, false),
            CellValue::Money(amount) => {
                let text = self.money.format(*amount);
                (text, crate::money::round_cents(*amount) < 0.0, true)
            }
            CellValue::Price(price) => (self.money.format_price(*price), false, true),
            CellValue::Shares(shares) => (format_shares(*shares), false, true),
            CellValue::Percent(percent) => (format_percent(*percent), false, true),
            CellValue::Ratio(ratio) => (format_split_ratio(*ratio), false, true),
        };
        RenderedCell {
            text,
            negative,
            numeric,
        }
    }
}

/// Converts typed text into a cell value for one column kind.
pub trait CellEditor {
    fn parse(&self, input: &str) -> Result<CellValue, EditError>;

    /// Text placed in the editor when editing starts.
    fn edit_text(&self, value: &CellValue) -> String;
}

pub struct TextEditor;

impl CellEditor for TextEditor {
    fn parse(&self, input: &str) -> Result<CellValue, EditError> {
        Ok(CellValue::Text(input.trim().to_string()))
    }

    fn edit_text(&self, value: &CellValue) -> String {
        value.as_text().unwrap_or_default().to_string()
    }
}

pub struct DateEditor {
    clock: Arc<dyn Clock>,
}

impl DateEditor {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl CellEditor for DateEditor {
    fn parse(&self, input: &str) -> Result<CellValue, EditError> {
        Ok(CellValue::Date(parse_date(input.trim(), self.clock.as_ref())?))
    }

    fn edit_text(&self, value: &CellValue) -> String {
        match value {
            CellValue::Date(date) => format_date(*date),
            _ => String::new(),
        }
    }
}

pub struct MoneyEditor {
    formatter: MoneyFormatter,
}

impl MoneyEditor {
    pub fn new(formatter: MoneyFormatter) -> Self {
        Self { formatter }
    }
}

impl CellEditor for MoneyEditor {
    fn parse(&self, input: &str) -> Result<CellValue, EditError> {
        if input.trim().is_empty() {
            return Ok(CellValue::Empty);
        }
        Ok(CellValue::Money(self.formatter.parse(input)?))
    }

    fn edit_text(&self, value: &CellValue) -> String {
        match value {
            CellValue::Money(amount) => self.formatter.edit_text(*amount),
            _ => String::new(),
        }
    }
}

pub struct PriceEditor {
    formatter: MoneyFormatter,
}

impl PriceEditor {
    pub fn new(formatter: MoneyFormatter) -> Self {
        Self { formatter }
    }
}

impl CellEditor for PriceEditor {
    fn parse(&self, input: &str) -> Result<CellValue, EditError> {
        if input.trim().is_empty() {
            return Ok(CellValue::Empty);
        }
        Ok(CellValue::Price(self.formatter.parse_price(input)?))
    }

    fn edit_text(&self, value: &CellValue) -> String {
        match value {
            CellValue::Price(price) => self.formatter.format_price(*price),
            _ => String::new(),
        }
    }
}

pub struct SharesEditor;

impl CellEditor for SharesEditor {
    fn parse(&self, input: &str) -> Result<CellValue, EditError> {
        Ok(CellValue::Shares(parse_shares(input)?))
    }

    fn edit_text(&self, value: &CellValue) -> String {
        match value {
            CellValue::Shares(shares) => format_shares(*shares),
            _ => String::new(),
        }
    }
}

pub struct PercentEditor;

impl CellEditor for PercentEditor {
    fn parse(&self, input: &str) -> Result<CellValue, EditError> {
        Ok(CellValue::Percent(parse_percent(input)?))
    }

    fn edit_text(&self, value: &CellValue) -> String {
        match value {
            CellValue::Percent(percent) => format!("{:.2}", percent),
            _ => String::new(),
        }
    }
}

pub struct SplitRatioEditor;

impl CellEditor for SplitRatioEditor {
    fn parse(&self, input: &str) -> Result<CellValue, EditError> {
        Ok(CellValue::Ratio(parse_split_ratio(input)?))
    }

    fn edit_text(&self, value: &CellValue) -> String {
        match value {
            CellValue::Ratio(ratio) => format_split_ratio(*ratio),
            _ => String::new(),
        }
    }
}

/// Shared inputs for building editors.
#[derive(Clone)]
pub struct EditContext {
    pub clock: Arc<dyn Clock>,
    pub money: MoneyFormatter,
}

impl Default for EditContext {
    fn default() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            money: MoneyFormatter::default(),
        }
    }
}

impl EditContext {
    pub fn new(clock: Arc<dyn Clock>, money: MoneyFormatter) -> Self {
        Self { clock, money }
    }

    pub fn editor_for(&self, kind: ColumnKind) -> Box<dyn CellEditor> {
        match kind {
            ColumnKind::Text => Box::new(TextEditor),
            ColumnKind::Date => Box::new(DateEditor::new(Arc::clone(&self.clock))),
            ColumnKind::Money => Box::new(MoneyEditor::new(self.money.clone())),
            ColumnKind::Price => Box::new(PriceEditor::new(self.money.clone())),
            ColumnKind::Shares => Box::new(SharesEditor),
            ColumnKind::Percent => Box::new(PercentEditor),
            ColumnKind::Ratio => Box::new(SplitRatioEditor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dates::DateErrorReason, time::FixedClock};

    fn ctx() -> EditContext {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        EditContext::new(Arc::new(FixedClock::on(today)), MoneyFormatter::default())
    }

    #[test]
    fn renderer_flags_negative_money() {
        let renderer = CellRenderer::default();
        let cell = renderer.render(&CellValue::Money(-5.0));
        assert_eq!(cell.text, "-5.00");
        assert!(cell.negative);
        assert!(cell.numeric);

        let zeroish = renderer.render(&CellValue::Money(-0.001));
        assert_eq!(zeroish.text, "0.00");
        assert!(!zeroish.negative);

        let ratio = renderer.render(&CellValue::Ratio(SplitRatio(3.0)));
        assert_eq!(ratio.text, "3:1");
    }

    #[test]
    fn date_editor_uses_clock_year_and_reports_offset() {
        let editor = ctx().editor_for(ColumnKind::Date);
        assert_eq!(
            editor.parse("02/03"),
            Ok(CellValue::Date(NaiveDate::from_ymd_opt(2025, 2, 3).unwrap()))
        );
        match editor.parse("02/03/2025/") {
            Err(EditError::Date(err)) => {
                assert_eq!(err.offset, 10);
                assert_eq!(err.reason, DateErrorReason::UnexpectedCharacter('/'));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn money_editor_blank_clears_cell() {
        let editor = ctx().editor_for(ColumnKind::Money);
        assert_eq!(editor.parse("  "), Ok(CellValue::Empty));
        assert_eq!(editor.parse("12.346"), Ok(CellValue::Money(12.35)));
        assert_eq!(editor.edit_text(&CellValue::Money(7.5)), "7.50");
    }

    #[test]
    fn price_editor_keeps_sub_cent_quotes() {
        let editor = ctx().editor_for(ColumnKind::Price);
        assert_eq!(editor.parse("12.3456"), Ok(CellValue::Price(12.3456)));
        assert_eq!(editor.parse(""), Ok(CellValue::Empty));
        assert_eq!(editor.edit_text(&CellValue::Price(0.0042)), "0.0042");

        let cell = CellRenderer::default().render(&CellValue::Price(1250.5));
        assert_eq!(cell.text, "1,250.50");
        assert!(cell.numeric);
    }
}
