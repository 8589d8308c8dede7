//! Parsing and formatting of `mm/dd/yyyy` dates typed into cells.

use std::fmt;

use bookkeep_domain::days_in_month;
use chrono::{Datelike, NaiveDate};
use thiserror::Error;

use crate::{format::DateFormatter, time::Clock};

pub const DATE_PATTERN: &str = "%m/%d/%Y";
const SEPARATOR: char = '/';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateErrorReason {
    Empty,
    MissingMonth,
    MissingDay,
    MissingYear,
    ShortYear,
    UnexpectedCharacter(char),
    MonthOutOfRange,
    DayOutOfRange,
}

impl fmt::Display for DateErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateErrorReason::Empty => f.write_str("empty date"),
            DateErrorReason::MissingMonth => f.write_str("missing month"),
            DateErrorReason::MissingDay => f.write_str("missing day"),
            DateErrorReason::MissingYear => f.write_str("missing year"),
            DateErrorReason::ShortYear => f.write_str("year must have four digits"),
            DateErrorReason::UnexpectedCharacter(ch) => write!(f, "unexpected character `{ch}`"),
            DateErrorReason::MonthOutOfRange => f.write_str("month out of range"),
            DateErrorReason::DayOutOfRange => f.write_str("day out of range"),
        }
    }
}

/// A date string that could not be parsed; `offset` is the character index
/// of the first invalid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid date at offset {offset}: {reason}")]
pub struct DateParseError {
    pub offset: usize,
    pub reason: DateErrorReason,
}

impl DateParseError {
    fn at(offset: usize, reason: DateErrorReason) -> Self {
        Self { offset, reason }
    }
}

/// Parses `mm/dd/yyyy` or `mm/dd`, taking the year from `clock` when omitted.
pub fn parse_date(input: &str, clock: &dyn Clock) -> Result<NaiveDate, DateParseError> {
    parse_date_with_year(input, clock.today().year())
}

pub fn parse_date_with_year(input: &str, default_year: i32) -> Result<NaiveDate, DateParseError> {
    let chars: Vec<char> = input.chars().collect();
    if chars.is_empty() {
        return Err(DateParseError::at(0, DateErrorReason::Empty));
    }
    let mut pos = 0;

    let month = read_number(&chars, &mut pos, 2)
        .ok_or(DateParseError::at(pos, DateErrorReason::MissingMonth))?;
    expect_separator(&chars, &mut pos, DateErrorReason::MissingDay)?;

    let day_start = pos;
    let day = read_number(&chars, &mut pos, 2)
        .ok_or(DateParseError::at(pos, DateErrorReason::MissingDay))?;

    let year = if pos == chars.len() {
        default_year
    } else {
        expect_separator(&chars, &mut pos, DateErrorReason::MissingYear)?;
        let year_start = pos;
        let year = read_number(&chars, &mut pos, 4)
            .ok_or(DateParseError::at(pos, DateErrorReason::MissingYear))?;
        if pos - year_start < 4 {
            return Err(DateParseError::at(year_start, DateErrorReason::ShortYear));
        }
        year as i32
    };

    if let Some(&extra) = chars.get(pos) {
        return Err(DateParseError::at(
            pos,
            DateErrorReason::UnexpectedCharacter(extra),
        ));
    }
    if !(1..=12).contains(&month) {
        return Err(DateParseError::at(0, DateErrorReason::MonthOutOfRange));
    }
    if day == 0 || day > days_in_month(year, month) {
        return Err(DateParseError::at(day_start, DateErrorReason::DayOutOfRange));
    }
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or(DateParseError::at(day_start, DateErrorReason::DayOutOfRange))
}

/// Zero-padded `mm/dd/yyyy`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_PATTERN).to_string()
}

fn read_number(chars: &[char], pos: &mut usize, max_digits: usize) -> Option<u32> {
    let start = *pos;
    let mut value = 0u32;
    while *pos < chars.len() && *pos - start < max_digits {
        match chars[*pos].to_digit(10) {
            Some(digit) => {
                value = value * 10 + digit;
                *pos += 1;
            }
            None => break,
        }
    }
    (*pos > start).then_some(value)
}

fn expect_separator(
    chars: &[char],
    pos: &mut usize,
    missing: DateErrorReason,
) -> Result<(), DateParseError> {
    match chars.get(*pos) {
        None => Err(DateParseError::at(*pos, missing)),
        Some(&SEPARATOR) => {
            *pos += 1;
            Ok(())
        }
        Some(&other) => Err(DateParseError::at(
            *pos,
            DateErrorReason::UnexpectedCharacter(other),
        )),
    }
}

/// `DateFormatter` that renders the same `mm/dd/yyyy` form the parser reads.
#[derive(Debug, Default, Clone, Copy)]
pub struct SlashDateFormatter;

impl DateFormatter for SlashDateFormatter {
    fn format_date(&self, date: NaiveDate) -> String {
        format_date(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FixedClock;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn full_dates_round_trip() {
        for text in ["01/01/2024", "02/29/2024", "12/31/1999", "07/04/1776"] {
            let date = parse_date_with_year(text, 2000).unwrap();
            assert_eq!(format_date(date), text);
        }
    }

    #[test]
    fn single_digit_fields_are_accepted() {
        assert_eq!(parse_date_with_year("1/2/2023", 2000), Ok(ymd(2023, 1, 2)));
    }

    #[test]
    fn year_defaults_to_clock_year() {
        let clock = FixedClock::on(ymd(2026, 10, 19));
        assert_eq!(parse_date("03/15", &clock), Ok(ymd(2026, 3, 15)));
    }

    #[test]
    fn malformed_dates_report_offsets() {
        let cases = [
            ("", 0, DateErrorReason::Empty),
            ("/05/2024", 0, DateErrorReason::MissingMonth),
            ("05", 2, DateErrorReason::MissingDay),
            ("05/", 3, DateErrorReason::MissingDay),
            ("05//2024", 3, DateErrorReason::MissingDay),
            ("05/06/", 6, DateErrorReason::MissingYear),
            ("05/06/24", 6, DateErrorReason::ShortYear),
            ("05/06/2024/", 10, DateErrorReason::UnexpectedCharacter('/')),
            ("05/06/20245", 10, DateErrorReason::UnexpectedCharacter('5')),
            ("05-06-2024", 2, DateErrorReason::UnexpectedCharacter('-')),
            ("123/01/2024", 2, DateErrorReason::UnexpectedCharacter('3')),
            ("13/01/2024", 0, DateErrorReason::MonthOutOfRange),
            ("02/30/2024", 3, DateErrorReason::DayOutOfRange),
            ("02/00/2024", 3, DateErrorReason::DayOutOfRange),
        ];
        for (input, offset, reason) in cases {
            let err = parse_date_with_year(input, 2024).unwrap_err();
            assert_eq!((err.offset, err.reason), (offset, reason), "input {input:?}");
        }
    }
}
