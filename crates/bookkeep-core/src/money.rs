//! Money, share, percent, and split-ratio formatting and parsing.

use bookkeep_domain::{trim_decimal, SplitRatio};
use serde::{Deserialize, Serialize};

use crate::{error::EditError, format::CurrencyFormatter};

pub use bookkeep_domain::{round_cents, HALF_CENT};

const SHARE_PLACES: usize = 4;
const PRICE_PLACES: usize = 4;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NegativeStyle {
    #[default]
    Sign,
    Parentheses,
}

/// Presentation rules for monetary amounts.
#[derive(Debug, Clone, PartialEq)]
pub struct MoneyFormatter {
    pub symbol: Option<String>,
    pub negative_style: NegativeStyle,
    pub grouping_separator: char,
    pub decimal_separator: char,
}

impl Default for MoneyFormatter {
    fn default() -> Self {
        Self {
            symbol: None,
            negative_style: NegativeStyle::Sign,
            grouping_separator: ',',
            decimal_separator: '.',
        }
    }
}

impl MoneyFormatter {
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn with_negative_style(mut self, style: NegativeStyle) -> Self {
        self.negative_style = style;
        self
    }

    /// Digit separators, e.g. `(' ', ',')` for `1 234,50`.
    pub fn with_separators(mut self, grouping: char, decimal: char) -> Self {
        self.grouping_separator = grouping;
        self.decimal_separator = decimal;
        self
    }

    pub fn format(&self, amount: f64) -> String {
        let amount = round_cents(amount);
        self.decorate(format!("{:.2}", amount.abs()), amount < 0.0)
    }

    /// Per-share quotes keep up to four decimals, never fewer than two.
    pub fn format_price(&self, price: f64) -> String {
        let mut body = trim_decimal(price.abs(), PRICE_PLACES);
        match body.find('.') {
            None => body.push_str(".00"),
            Some(pos) if body.len() - pos < 3 => body.push('0'),
            Some(_) => {}
        }
        let negative = price < 0.0 && body.chars().any(|c| matches!(c, '1'..='9'));
        self.decorate(body, negative)
    }

    /// Edit text: plain digits with the locale's decimal separator.
    pub fn edit_text(&self, amount: f64) -> String {
        format!("{:.2}", amount).replace('.', &self.decimal_separator.to_string())
    }

    fn decorate(&self, mut body: String, negative: bool) -> String {
        if self.decimal_separator != '.' {
            body = body.replace('.', &self.decimal_separator.to_string());
        }
        if let Some(pos) = body.find(self.decimal_separator) {
            let grouped = group_digits(&body[..pos], self.grouping_separator);
            body = format!("{}{}", grouped, &body[pos..]);
        }
        if let Some(symbol) = &self.symbol {
            body = format!("{symbol}{body}");
        }
        if negative {
            match self.negative_style {
                NegativeStyle::Sign => format!("-{body}"),
                NegativeStyle::Parentheses => format!("({body})"),
            }
        } else {
            body
        }
    }

    /// Reads amounts such as `1,234.50`, `-$12`, or `(45.10)`; the result is
    /// rounded to cents.
    pub fn parse(&self, input: &str) -> Result<f64, EditError> {
        self.parse_exact(input).map(round_cents)
    }

    /// Same accepted forms as [`parse`](Self::parse) without cent rounding.
    pub fn parse_price(&self, input: &str) -> Result<f64, EditError> {
        self.parse_exact(input)
    }

    fn parse_exact(&self, input: &str) -> Result<f64, EditError> {
        let trimmed = input.trim();
        let mut negative = false;
        let mut digits = String::new();
        let leading = input.len() - input.trim_start().len();
        let mut chars = trimmed.char_indices().peekable();
        if let Some(&(_, '(')) = chars.peek() {
            if !trimmed.ends_with(')') {
                return Err(number_error(input, leading + trimmed.len()));
            }
            negative = true;
            chars.next();
        }
        let body_end = if negative {
            trimmed.len() - 1
        } else {
            trimmed.len()
        };
        let mut seen_decimal = false;
        for (idx, ch) in chars {
            if idx >= body_end {
                break;
            }
            match ch {
                '-' if digits.is_empty() && !negative => negative = true,
                '+' if digits.is_empty() => {}
                c if c.is_ascii_digit() => digits.push(c),
                c if c == self.decimal_separator && !seen_decimal => {
                    seen_decimal = true;
                    digits.push('.');
                }
                c if c == self.grouping_separator && !seen_decimal => {}
                c if self.symbol.as_deref().map_or(c == '$', |s| s.contains(c))
                    && digits.is_empty() => {}
                _ => return Err(number_error(input, leading + trimmed[..idx].chars().count())),
            }
        }
        if !digits.chars().any(|c| c.is_ascii_digit()) {
            return Err(number_error(input, leading + trimmed.chars().count()));
        }
        let value: f64 = digits
            .parse()
            .map_err(|_| number_error(input, leading))?;
        Ok(if negative { -value } else { value })
    }
}

impl CurrencyFormatter for MoneyFormatter {
    fn format_amount(&self, amount: f64) -> String {
        self.format(amount)
    }
}

fn number_error(input: &str, offset: usize) -> EditError {
    EditError::Number {
        input: input.to_string(),
        offset,
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    let mut count = 0;
    for ch in digits.chars().rev() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
        count += 1;
    }
    grouped
}

/// True when `value` would display as zero cents.
pub fn is_zero(value: f64) -> bool {
    value.abs() < HALF_CENT
}

pub fn format_percent(value: f64) -> String {
    let value = if value.abs() < 0.005 { 0.0 } else { value };
    format!("{:.2}%", value)
}

pub fn parse_percent(input: &str) -> Result<f64, EditError> {
    let trimmed = input.trim().trim_end_matches('%').trim_end();
    parse_decimal(trimmed).map_err(|offset| number_error(input, offset))
}

pub fn format_shares(shares: f64) -> String {
    trim_decimal(shares, SHARE_PLACES)
}

pub fn parse_shares(input: &str) -> Result<f64, EditError> {
    let cleaned: String = input.trim().chars().filter(|c| *c != ',').collect();
    parse_decimal(&cleaned).map_err(|offset| number_error(input, offset))
}

pub fn format_split_ratio(ratio: SplitRatio) -> String {
    ratio.to_string()
}

/// Accepts `N:1`, `1:N`, any `A:B`, a bare multiplier, or an empty string
/// for "no split".
pub fn parse_split_ratio(input: &str) -> Result<SplitRatio, EditError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(SplitRatio::NONE);
    }
    let invalid = || EditError::Ratio(input.to_string());
    let ratio = match trimmed.split_once(':') {
        Some((left, right)) => {
            let new_shares = parse_decimal(left.trim()).map_err(|_| invalid())?;
            let old_shares = parse_decimal(right.trim()).map_err(|_| invalid())?;
            if old_shares <= 0.0 || new_shares <= 0.0 {
                return Err(invalid());
            }
            new_shares / old_shares
        }
        None => parse_decimal(trimmed).map_err(|_| invalid())?,
    };
    if ratio < 0.0 || !ratio.is_finite() {
        return Err(invalid());
    }
    Ok(SplitRatio(ratio))
}

/// Plain decimal parse; the error carries the offset of the first bad char.
fn parse_decimal(input: &str) -> Result<f64, usize> {
    let mut seen_digit = false;
    let mut seen_point = false;
    for (idx, ch) in input.chars().enumerate() {
        match ch {
            '-' | '+' if idx == 0 => {}
            '.' if !seen_point => seen_point = true,
            c if c.is_ascii_digit() => seen_digit = true,
            _ => return Err(idx),
        }
    }
    if !seen_digit {
        return Err(input.chars().count());
    }
    input.parse().map_err(|_| 0usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_formatting_groups_and_signs() {
        let fmt = MoneyFormatter::default();
        assert_eq!(fmt.format(1234567.891), "1,234,567.89");
        assert_eq!(fmt.format(-12.5), "-12.50");
        assert_eq!(fmt.format(-0.004), "0.00");
        assert_eq!(fmt.format(999.999), "1,000.00");

        let accounting = MoneyFormatter::default()
            .with_symbol("$")
            .with_negative_style(NegativeStyle::Parentheses);
        assert_eq!(accounting.format(-1500.0), "($1,500.00)");
        assert_eq!(accounting.format(20.0), "$20.00");
    }

    #[test]
    fn money_parsing_accepts_common_forms() {
        let fmt = MoneyFormatter::default();
        assert_eq!(fmt.parse("1,234.506"), Ok(1234.51));
        assert_eq!(fmt.parse("-$12"), Ok(-12.0));
        assert_eq!(fmt.parse("(45.10)"), Ok(-45.1));
        assert_eq!(fmt.parse(" 0.001 "), Ok(0.0));
    }

    #[test]
    fn money_parsing_reports_offset() {
        let fmt = MoneyFormatter::default();
        assert_eq!(fmt.parse("12a4").unwrap_err().offset(), Some(2));
        assert_eq!(fmt.parse("").unwrap_err().offset(), Some(0));
        assert!(fmt.parse("(12.00").is_err());
    }

    #[test]
    fn prices_keep_four_places() {
        let fmt = MoneyFormatter::default();
        assert_eq!(fmt.parse_price("12.3456"), Ok(12.3456));
        assert_eq!(fmt.parse_price("0.0042"), Ok(0.0042));
        assert_eq!(fmt.parse("0.0042"), Ok(0.0));
        assert_eq!(fmt.format_price(12.3456), "12.3456");
        assert_eq!(fmt.format_price(1250.5), "1,250.50");
        assert_eq!(fmt.format_price(7.0), "7.00");
        assert_eq!(fmt.format_price(0.123), "0.123");
    }

    #[test]
    fn separators_follow_locale_style() {
        let fr = MoneyFormatter::default().with_separators(' ', ',');
        assert_eq!(fr.format(1234.5), "1 234,50");
        assert_eq!(fr.format(-0.5), "-0,50");
        assert_eq!(fr.format_price(12.3456), "12,3456");
        assert_eq!(fr.edit_text(7.5), "7,50");

        let de = MoneyFormatter::default().with_separators('.', ',');
        assert_eq!(de.format(1234567.0), "1.234.567,00");
        assert_eq!(de.parse("1.234,50"), Ok(1234.5));
    }

    #[test]
    fn split_ratio_parsing() {
        assert_eq!(parse_split_ratio(""), Ok(SplitRatio::NONE));
        assert_eq!(parse_split_ratio("2:1"), Ok(SplitRatio(2.0)));
        assert_eq!(parse_split_ratio("1:4"), Ok(SplitRatio(0.25)));
        assert_eq!(parse_split_ratio("3:2"), Ok(SplitRatio(1.5)));
        assert_eq!(parse_split_ratio("1.5"), Ok(SplitRatio(1.5)));
        assert!(parse_split_ratio("0:1").is_err());
        assert!(parse_split_ratio("two:one").is_err());
        assert_eq!(format_split_ratio(SplitRatio(0.25)), "1:4");
    }

    #[test]
    fn percent_and_shares() {
        assert_eq!(format_percent(3.456), "3.46%");
        assert_eq!(format_percent(-0.001), "0.00%");
        assert_eq!(parse_percent("4.5%"), Ok(4.5));
        assert_eq!(format_shares(10.5), "10.5");
        assert_eq!(format_shares(3.0), "3");
        assert_eq!(parse_shares("1,000.25"), Ok(1000.25));
        assert_eq!(parse_shares("1x").unwrap_err().offset(), Some(1));
    }
}
